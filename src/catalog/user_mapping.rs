use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, id::DbObjectId};

/// A `CREATE USER MAPPING` entry binding a local role to a foreign server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMapping {
    pub server: String,
    pub user_name: String,
    /// `(key, value)` pairs from `umoptions`, almost always including a
    /// credential (`password`, `user`). Masked by `catalog::mask` before the
    /// catalog is returned, since these routinely hold real secrets.
    pub options: Vec<(String, String)>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for UserMapping {
    fn id(&self) -> DbObjectId {
        DbObjectId::UserMapping {
            server: self.server.clone(),
            user_name: self.user_name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

fn parse_options(raw: Option<Vec<String>>) -> Vec<(String, String)> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.split_once('=').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect()
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<UserMapping>> {
    info!("Fetching user mappings...");

    let rows = sqlx::query!(
        r#"
        SELECT
            s.srvname AS "server!",
            CASE WHEN um.umuser = 0 THEN 'PUBLIC' ELSE r.rolname END AS "user_name!",
            um.umoptions AS "options?: Vec<String>"
        FROM pg_user_mapping um
        JOIN pg_foreign_server s ON s.oid = um.umserver
        LEFT JOIN pg_roles r ON r.oid = um.umuser
        ORDER BY s.srvname, "user_name!"
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| UserMapping {
            server: row.server.clone(),
            user_name: row.user_name,
            options: parse_options(row.options),
            depends_on: vec![DbObjectId::ForeignServer { name: row.server }],
        })
        .collect())
}
