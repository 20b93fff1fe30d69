//! Role operations (`CREATE ROLE` / `ALTER ROLE` / role membership grants)

use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::id::DbObjectId;
use crate::catalog::role::Role;
use crate::render::quote_ident;

#[derive(Debug, Clone)]
pub enum RoleOperation {
    Create {
        role: Role,
    },
    Drop {
        name: String,
    },
    /// Reconciles every alterable login/capability flag in one `ALTER ROLE`.
    /// Roles have no non-alterable fields, so altered roles never replace.
    AlterFlags {
        name: String,
        can_login: bool,
        is_superuser: bool,
        can_createdb: bool,
        can_createrole: bool,
        can_replicate: bool,
        connection_limit: i32,
    },
    /// `GRANT <group> TO <role>` — ordered (custom rule) to follow both
    /// roles' own `CREATE ROLE` steps.
    GrantMembership {
        role: String,
        group: String,
    },
    RevokeMembership {
        role: String,
        group: String,
    },
    Comment(CommentOperation<RoleIdentifier>),
}

impl RoleOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::AlterFlags { .. }
            | Self::GrantMembership { .. }
            | Self::RevokeMembership { .. }
            | Self::Comment(_) => OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoleIdentifier {
    pub name: String,
}

impl CommentTarget for RoleIdentifier {
    const OBJECT_TYPE: &'static str = "ROLE";

    fn identifier(&self) -> String {
        quote_ident(&self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Role {
            name: self.name.clone(),
        }
    }
}
