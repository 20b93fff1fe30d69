use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A `CREATE EVENT TRIGGER`, fired on DDL commands rather than on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTrigger {
    pub name: String,
    pub event: String,
    pub tags: Vec<String>,
    pub function_schema: String,
    pub function_name: String,
    pub enabled: String, // 'O', 'D', 'R', 'A' — pg_event_trigger.evtenabled
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for EventTrigger {
    fn id(&self) -> DbObjectId {
        DbObjectId::EventTrigger {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for EventTrigger {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<EventTrigger>> {
    info!("Fetching event triggers...");

    let rows = sqlx::query!(
        r#"
        SELECT
            t.evtname AS "name!",
            t.evtevent AS "event!",
            t.evttags AS "tags?: Vec<String>",
            t.evtenabled::text AS "enabled!",
            n.nspname AS "function_schema!",
            p.proname AS "function_name!"
        FROM pg_event_trigger t
        JOIN pg_proc p ON p.oid = t.evtfoid
        JOIN pg_namespace n ON n.oid = p.pronamespace
        ORDER BY t.evtname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| EventTrigger {
            depends_on: vec![DbObjectId::Function {
                schema: row.function_schema.clone(),
                name: row.function_name.clone(),
                arguments: String::new(),
            }],
            name: row.name,
            event: row.event,
            tags: row.tags.unwrap_or_default(),
            function_schema: row.function_schema,
            function_name: row.function_name,
            enabled: row.enabled,
            comment: None,
        })
        .collect())
}
