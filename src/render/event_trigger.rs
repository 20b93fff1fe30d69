//! SQL rendering for event trigger operations

use crate::catalog::event_trigger::EventTrigger;
use crate::catalog::id::DbObjectId;
use crate::diff::operations::{CommentOperation, EventTriggerOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

fn enabled_clause(enabled: &str) -> &'static str {
    match enabled {
        "D" => "DISABLE",
        "R" => "ENABLE REPLICA",
        "A" => "ENABLE ALWAYS",
        _ => "ENABLE",
    }
}

fn render_create(trigger: &EventTrigger) -> RenderedSql {
    let mut sql = format!(
        "CREATE EVENT TRIGGER {} ON {}",
        quote_ident(&trigger.name),
        trigger.event
    );
    if !trigger.tags.is_empty() {
        let tags = trigger
            .tags
            .iter()
            .map(|t| format!("'{}'", t.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" WHEN TAG IN ({})", tags));
    }
    sql.push_str(&format!(
        " EXECUTE FUNCTION {}.{}();",
        quote_ident(&trigger.function_schema),
        quote_ident(&trigger.function_name)
    ));
    RenderedSql::new(sql)
}

impl SqlRenderer for EventTriggerOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            EventTriggerOperation::Create { trigger } => vec![render_create(trigger)],
            EventTriggerOperation::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP EVENT TRIGGER {};",
                quote_ident(name)
            ))],
            EventTriggerOperation::AlterEnabled { name, enabled } => {
                vec![RenderedSql::new(format!(
                    "ALTER EVENT TRIGGER {} {};",
                    quote_ident(name),
                    enabled_clause(enabled)
                ))]
            }
            EventTriggerOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            EventTriggerOperation::Create { trigger } => DbObjectId::EventTrigger {
                name: trigger.name.clone(),
            },
            EventTriggerOperation::Drop { name }
            | EventTriggerOperation::AlterEnabled { name, .. } => {
                DbObjectId::EventTrigger { name: name.clone() }
            }
            EventTriggerOperation::Comment(op) => match op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::EventTrigger {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, EventTriggerOperation::Drop { .. })
    }
}
