//! Foreign server operations. Every data field (type, version, masked
//! options) is treated as non-alterable here — `options` in particular are
//! replaced with opaque placeholders by the masking pass, so there is
//! nothing meaningful left to reconcile with `ALTER SERVER`. Any diff
//! replaces (drop + create).

use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::foreign_server::ForeignServer;
use crate::catalog::id::DbObjectId;
use crate::render::quote_ident;

#[derive(Debug, Clone)]
pub enum ForeignServerOperation {
    Create { server: ForeignServer },
    Drop { name: String },
    Comment(CommentOperation<ForeignServerIdentifier>),
}

impl ForeignServerOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::Comment(_) => OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForeignServerIdentifier {
    pub name: String,
}

impl CommentTarget for ForeignServerIdentifier {
    const OBJECT_TYPE: &'static str = "SERVER";

    fn identifier(&self) -> String {
        quote_ident(&self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::ForeignServer {
            name: self.name.clone(),
        }
    }
}
