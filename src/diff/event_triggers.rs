use crate::catalog::event_trigger::EventTrigger;
use crate::diff::comment_utils;
use crate::diff::operations::{EventTriggerIdentifier, EventTriggerOperation, MigrationStep};

pub fn diff(old: Option<&EventTrigger>, new: Option<&EventTrigger>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(trigger)) => vec![MigrationStep::EventTrigger(EventTriggerOperation::Create {
            trigger: trigger.clone(),
        })],

        (Some(trigger), None) => vec![MigrationStep::EventTrigger(EventTriggerOperation::Drop {
            name: trigger.name.clone(),
        })],

        (Some(old_trigger), Some(new_trigger)) => {
            let fixed_surface_changed = old_trigger.event != new_trigger.event
                || old_trigger.tags != new_trigger.tags
                || old_trigger.function_schema != new_trigger.function_schema
                || old_trigger.function_name != new_trigger.function_name;

            if fixed_surface_changed {
                return vec![
                    MigrationStep::EventTrigger(EventTriggerOperation::Drop {
                        name: old_trigger.name.clone(),
                    }),
                    MigrationStep::EventTrigger(EventTriggerOperation::Create {
                        trigger: new_trigger.clone(),
                    }),
                ];
            }

            let mut steps = Vec::new();

            if old_trigger.enabled != new_trigger.enabled {
                steps.push(MigrationStep::EventTrigger(EventTriggerOperation::AlterEnabled {
                    name: new_trigger.name.clone(),
                    enabled: new_trigger.enabled.clone(),
                }));
            }

            steps.extend(
                comment_utils::handle_comment_diff(Some(old_trigger), Some(new_trigger), || {
                    EventTriggerIdentifier {
                        name: new_trigger.name.clone(),
                    }
                })
                .into_iter()
                .map(|op| MigrationStep::EventTrigger(EventTriggerOperation::Comment(op))),
            );

            steps
        }

        (None, None) => vec![],
    }
}
