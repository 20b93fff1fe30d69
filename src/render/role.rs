//! SQL rendering for role operations

use crate::catalog::id::DbObjectId;
use crate::catalog::role::Role;
use crate::diff::operations::{CommentOperation, RoleOperation};
use crate::render::{RenderedSql, Safety, SqlRenderer, quote_ident};

fn flags_clause(
    can_login: bool,
    is_superuser: bool,
    can_createdb: bool,
    can_createrole: bool,
    can_replicate: bool,
    connection_limit: i32,
) -> String {
    format!(
        "{} {} {} {} {} CONNECTION LIMIT {}",
        if can_login { "LOGIN" } else { "NOLOGIN" },
        if is_superuser {
            "SUPERUSER"
        } else {
            "NOSUPERUSER"
        },
        if can_createdb {
            "CREATEDB"
        } else {
            "NOCREATEDB"
        },
        if can_createrole {
            "CREATEROLE"
        } else {
            "NOCREATEROLE"
        },
        if can_replicate {
            "REPLICATION"
        } else {
            "NOREPLICATION"
        },
        connection_limit
    )
}

fn render_create(role: &Role) -> RenderedSql {
    let sql = format!(
        "CREATE ROLE {} WITH {};",
        quote_ident(&role.name),
        flags_clause(
            role.can_login,
            role.is_superuser,
            role.can_createdb,
            role.can_createrole,
            role.can_replicate,
            role.connection_limit,
        )
    );
    RenderedSql::new(sql)
}

impl SqlRenderer for RoleOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            RoleOperation::Create { role } => {
                let mut out = vec![render_create(role)];
                for group in &role.member_of {
                    out.push(RenderedSql::new(format!(
                        "GRANT {} TO {};",
                        quote_ident(group),
                        quote_ident(&role.name)
                    )));
                }
                out
            }
            RoleOperation::Drop { name } => {
                vec![RenderedSql::destructive(format!(
                    "DROP ROLE {};",
                    quote_ident(name)
                ))]
            }
            RoleOperation::AlterFlags {
                name,
                can_login,
                is_superuser,
                can_createdb,
                can_createrole,
                can_replicate,
                connection_limit,
            } => {
                vec![RenderedSql::new(format!(
                    "ALTER ROLE {} WITH {};",
                    quote_ident(name),
                    flags_clause(
                        *can_login,
                        *is_superuser,
                        *can_createdb,
                        *can_createrole,
                        *can_replicate,
                        *connection_limit,
                    )
                ))]
            }
            RoleOperation::GrantMembership { role, group } => {
                vec![RenderedSql::new(format!(
                    "GRANT {} TO {};",
                    quote_ident(group),
                    quote_ident(role)
                ))]
            }
            RoleOperation::RevokeMembership { role, group } => {
                vec![RenderedSql::new(format!(
                    "REVOKE {} FROM {};",
                    quote_ident(group),
                    quote_ident(role)
                ))]
            }
            RoleOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            RoleOperation::Create { role } => DbObjectId::Role {
                name: role.name.clone(),
            },
            RoleOperation::Drop { name }
            | RoleOperation::AlterFlags { name, .. } => DbObjectId::Role { name: name.clone() },
            RoleOperation::GrantMembership { role, .. }
            | RoleOperation::RevokeMembership { role, .. } => DbObjectId::Role {
                name: role.clone(),
            },
            RoleOperation::Comment(op) => match op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Role {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, RoleOperation::Drop { .. })
    }
}
