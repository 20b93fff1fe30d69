//! Grant operations

use crate::catalog::grant::Grant;

#[derive(Debug, Clone)]
pub enum GrantOperation {
    Grant { grant: Grant },
    Revoke { grant: Grant },
}

impl GrantOperation {
    /// Grants are privilege-scope changes: the underlying object is neither
    /// created nor dropped by granting/revoking, so both variants are `Alter`.
    pub fn operation_kind(&self) -> super::OperationKind {
        super::OperationKind::Alter
    }
}
