use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A `CREATE RULE` on a table or view.
///
/// The implicit `_RETURN` rule PostgreSQL creates for every view is
/// excluded — it's an implementation detail of the view, not a
/// user-authored rule, and is already represented by the view's own
/// `CREATE VIEW` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub definition: String,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Rule {
    fn id(&self) -> DbObjectId {
        DbObjectId::Rule {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Rule {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Rule>> {
    info!("Fetching rules...");

    let rows = sqlx::query!(
        r#"
        SELECT
            n.nspname AS "schema!",
            c.relname AS "table!",
            r.rulename AS "name!",
            pg_get_ruledef(r.oid) AS "definition!",
            d.description AS "comment?"
        FROM pg_rewrite r
        JOIN pg_class c ON c.oid = r.ev_class
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_description d ON d.objoid = r.oid
        WHERE r.rulename != '_RETURN'
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
        ORDER BY n.nspname, c.relname, r.rulename
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Rule {
            depends_on: vec![DbObjectId::Table {
                schema: row.schema.clone(),
                name: row.table.clone(),
            }],
            schema: row.schema,
            table: row.table,
            name: row.name,
            definition: row.definition,
            comment: row.comment,
        })
        .collect())
}
