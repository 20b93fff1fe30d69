use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

pub const MASKED_CONNINFO: &str = "<masked>";

/// A logical-replication `CREATE SUBSCRIPTION`.
///
/// `conninfo` names a remote host and almost always carries a password.
/// `catalog::mask` replaces it with [`MASKED_CONNINFO`] before the catalog
/// is returned; diffing never compares the real value and no dependency
/// edge is derived from the remote publication it names (§9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,
    pub conninfo: String,
    pub publications: Vec<String>,
    pub enabled: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Subscription {
    fn id(&self) -> DbObjectId {
        DbObjectId::Subscription {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Subscription {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Subscription>> {
    info!("Fetching subscriptions...");

    let rows = sqlx::query!(
        r#"
        SELECT
            s.subname AS "name!",
            s.subconninfo AS "conninfo!",
            s.subpublications AS "publications!: Vec<String>",
            s.subenabled AS "enabled!",
            d.description AS "comment?"
        FROM pg_subscription s
        LEFT JOIN pg_description d ON d.objoid = s.oid
        ORDER BY s.subname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Subscription {
            name: row.name,
            conninfo: row.conninfo,
            publications: row.publications,
            enabled: row.enabled,
            comment: row.comment,
            depends_on: Vec::new(),
        })
        .collect())
}
