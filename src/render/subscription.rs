//! SQL rendering for subscription operations

use crate::catalog::id::DbObjectId;
use crate::catalog::subscription::Subscription;
use crate::diff::operations::{CommentOperation, SubscriptionOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

fn publications_list(publications: &[String]) -> String {
    publications
        .iter()
        .map(|p| quote_ident(p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_create(subscription: &Subscription) -> RenderedSql {
    RenderedSql::new(format!(
        "CREATE SUBSCRIPTION {} CONNECTION '{}' PUBLICATION {} WITH (enabled = {});",
        quote_ident(&subscription.name),
        subscription.conninfo.replace('\'', "''"),
        publications_list(&subscription.publications),
        subscription.enabled
    ))
}

impl SqlRenderer for SubscriptionOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            SubscriptionOperation::Create { subscription } => vec![render_create(subscription)],
            SubscriptionOperation::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP SUBSCRIPTION {};",
                quote_ident(name)
            ))],
            SubscriptionOperation::Alter {
                name,
                publications,
                enabled,
            } => vec![
                RenderedSql::new(format!(
                    "ALTER SUBSCRIPTION {} SET PUBLICATION {};",
                    quote_ident(name),
                    publications_list(publications)
                )),
                RenderedSql::new(format!(
                    "ALTER SUBSCRIPTION {} {};",
                    quote_ident(name),
                    if *enabled { "ENABLE" } else { "DISABLE" }
                )),
            ],
            SubscriptionOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            SubscriptionOperation::Create { subscription } => DbObjectId::Subscription {
                name: subscription.name.clone(),
            },
            SubscriptionOperation::Drop { name } | SubscriptionOperation::Alter { name, .. } => {
                DbObjectId::Subscription { name: name.clone() }
            }
            SubscriptionOperation::Comment(op) => match op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Subscription {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, SubscriptionOperation::Drop { .. })
    }
}
