use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A procedural language registered with `CREATE LANGUAGE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub name: String,
    pub trusted: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Language {
    fn id(&self) -> DbObjectId {
        DbObjectId::Language {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Language {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch user-registered procedural languages.
///
/// Built-in languages (`internal`, `c`, `sql`, `plpgsql`) and languages
/// installed by an extension (`pg_depend.deptype = 'e'`) are excluded —
/// both are outside anything a schema migration should be creating or
/// dropping directly.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Language>> {
    info!("Fetching languages...");

    let rows = sqlx::query!(
        r#"
        SELECT
            l.lanname AS "name!",
            l.lanpltrusted AS "trusted!",
            d.description AS "comment?"
        FROM pg_language l
        LEFT JOIN pg_description d ON d.objoid = l.oid
        WHERE l.lanname NOT IN ('internal', 'c', 'sql', 'plpgsql')
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = l.oid
              AND dep.deptype = 'e'
          )
        ORDER BY l.lanname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Language {
            name: row.name,
            trusted: row.trusted,
            comment: row.comment,
            depends_on: Vec::new(),
        })
        .collect())
}
