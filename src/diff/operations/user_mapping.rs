//! User mapping operations. No comment support — `pg_user_mapping` carries
//! no describable object in PostgreSQL's comment catalog.

use super::OperationKind;
use crate::catalog::user_mapping::UserMapping;

#[derive(Debug, Clone)]
pub enum UserMappingOperation {
    Create {
        mapping: UserMapping,
    },
    Drop {
        server: String,
        user_name: String,
    },
}

impl UserMappingOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
        }
    }
}
