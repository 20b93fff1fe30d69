use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

pub const MASKED_OPTION_VALUE: &str = "********";

/// A `CREATE SERVER` foreign-data-wrapper server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignServer {
    pub name: String,
    pub fdw_name: String,
    pub server_type: Option<String>,
    pub server_version: Option<String>,
    /// `(key, value)` pairs from `srvoptions`. Values are replaced with
    /// [`MASKED_OPTION_VALUE`] by the catalog's masking pass before the
    /// catalog is returned to callers — see `catalog::mask`.
    pub options: Vec<(String, String)>,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for ForeignServer {
    fn id(&self) -> DbObjectId {
        DbObjectId::ForeignServer {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for ForeignServer {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

fn parse_options(raw: Option<Vec<String>>) -> Vec<(String, String)> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.split_once('=').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect()
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<ForeignServer>> {
    info!("Fetching foreign servers...");

    let rows = sqlx::query!(
        r#"
        SELECT
            s.srvname AS "name!",
            w.fdwname AS "fdw_name!",
            s.srvtype AS "server_type?",
            s.srvversion AS "server_version?",
            s.srvoptions AS "options?: Vec<String>",
            d.description AS "comment?"
        FROM pg_foreign_server s
        JOIN pg_foreign_data_wrapper w ON w.oid = s.srvfdw
        LEFT JOIN pg_description d ON d.objoid = s.oid
        ORDER BY s.srvname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ForeignServer {
            name: row.name,
            fdw_name: row.fdw_name,
            server_type: row.server_type,
            server_version: row.server_version,
            options: parse_options(row.options),
            comment: row.comment,
            depends_on: Vec::new(),
        })
        .collect())
}
