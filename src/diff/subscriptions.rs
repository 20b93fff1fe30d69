use crate::catalog::subscription::Subscription;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, SubscriptionIdentifier, SubscriptionOperation};

pub fn diff(old: Option<&Subscription>, new: Option<&Subscription>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(sub)) => vec![MigrationStep::Subscription(SubscriptionOperation::Create {
            subscription: sub.clone(),
        })],

        (Some(sub), None) => vec![MigrationStep::Subscription(SubscriptionOperation::Drop {
            name: sub.name.clone(),
        })],

        (Some(old_sub), Some(new_sub)) => {
            let mut steps = Vec::new();

            if old_sub.publications != new_sub.publications || old_sub.enabled != new_sub.enabled {
                steps.push(MigrationStep::Subscription(SubscriptionOperation::Alter {
                    name: new_sub.name.clone(),
                    publications: new_sub.publications.clone(),
                    enabled: new_sub.enabled,
                }));
            }

            steps.extend(
                comment_utils::handle_comment_diff(Some(old_sub), Some(new_sub), || {
                    SubscriptionIdentifier {
                        name: new_sub.name.clone(),
                    }
                })
                .into_iter()
                .map(|op| MigrationStep::Subscription(SubscriptionOperation::Comment(op))),
            );

            steps
        }

        (None, None) => vec![],
    }
}
