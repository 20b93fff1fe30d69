use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A cluster-level login/group role.
///
/// Roles live outside any schema and outside the current database, but
/// `pgmt` diffs them anyway (promoted from the side-channel "roles file"
/// the tool used to apply separately) so that role grants and ownership
/// can be ordered against the objects that need them to exist first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub can_login: bool,
    pub is_superuser: bool,
    pub can_createdb: bool,
    pub can_createrole: bool,
    pub can_replicate: bool,
    pub connection_limit: i32,
    pub member_of: Vec<String>,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Role {
    fn id(&self) -> DbObjectId {
        DbObjectId::Role {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Role {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all non-system roles from the database.
///
/// Passwords are never read: `pg_authid.rolpassword` is excluded entirely,
/// not merely masked, since there is no placeholder that would let a diff
/// distinguish "unchanged" from "changed" without comparing secrets.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Role>> {
    info!("Fetching roles...");

    let rows = sqlx::query!(
        r#"
        SELECT
            r.rolname AS "name!",
            r.rolcanlogin AS "can_login!",
            r.rolsuper AS "is_superuser!",
            r.rolcreatedb AS "can_createdb!",
            r.rolcreaterole AS "can_createrole!",
            r.rolreplication AS "can_replicate!",
            r.rolconnlimit AS "connection_limit!",
            d.description AS "comment?"
        FROM pg_roles r
        LEFT JOIN pg_shdescription d ON d.objoid = r.oid
        WHERE r.rolname NOT LIKE 'pg\_%'
          AND r.rolname != current_user
        ORDER BY r.rolname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result = Vec::new();
    for row in rows {
        let member_of = sqlx::query_scalar!(
            r#"
            SELECT g.rolname AS "rolname!"
            FROM pg_auth_members m
            JOIN pg_roles g ON g.oid = m.roleid
            JOIN pg_roles member ON member.oid = m.member
            WHERE member.rolname = $1
            ORDER BY g.rolname
            "#,
            row.name
        )
        .fetch_all(&mut *conn)
        .await?;

        let depends_on = member_of
            .iter()
            .map(|name| DbObjectId::Role { name: name.clone() })
            .collect();

        result.push(Role {
            name: row.name,
            can_login: row.can_login,
            is_superuser: row.is_superuser,
            can_createdb: row.can_createdb,
            can_createrole: row.can_createrole,
            can_replicate: row.can_replicate,
            connection_limit: row.connection_limit,
            member_of,
            comment: row.comment,
            depends_on,
        });
    }

    Ok(result)
}
