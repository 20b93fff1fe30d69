use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A logical-replication `CREATE PUBLICATION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub name: String,
    pub all_tables: bool,
    pub tables: Vec<(String, String)>, // (schema, table)
    pub publish_insert: bool,
    pub publish_update: bool,
    pub publish_delete: bool,
    pub publish_truncate: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Publication {
    fn id(&self) -> DbObjectId {
        DbObjectId::Publication {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Publication {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Publication>> {
    info!("Fetching publications...");

    let rows = sqlx::query!(
        r#"
        SELECT
            p.pubname AS "name!",
            p.puballtables AS "all_tables!",
            p.pubinsert AS "publish_insert!",
            p.pubupdate AS "publish_update!",
            p.pubdelete AS "publish_delete!",
            p.pubtruncate AS "publish_truncate!",
            d.description AS "comment?"
        FROM pg_publication p
        LEFT JOIN pg_description d ON d.objoid = p.oid
        ORDER BY p.pubname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result = Vec::new();
    for row in rows {
        let tables = sqlx::query!(
            r#"
            SELECT n.nspname AS "schema!", c.relname AS "name!"
            FROM pg_publication_tables pt
            JOIN pg_class c ON c.relname = pt.tablename
            JOIN pg_namespace n ON n.oid = c.relnamespace AND n.nspname = pt.schemaname
            WHERE pt.pubname = $1
            ORDER BY n.nspname, c.relname
            "#,
            row.name
        )
        .fetch_all(&mut *conn)
        .await?;

        let depends_on = tables
            .iter()
            .map(|t| DbObjectId::Table {
                schema: t.schema.clone(),
                name: t.name.clone(),
            })
            .collect();

        result.push(Publication {
            name: row.name,
            all_tables: row.all_tables,
            tables: tables.into_iter().map(|t| (t.schema, t.name)).collect(),
            publish_insert: row.publish_insert,
            publish_update: row.publish_update,
            publish_delete: row.publish_delete,
            publish_truncate: row.publish_truncate,
            comment: row.comment,
            depends_on,
        });
    }

    Ok(result)
}
