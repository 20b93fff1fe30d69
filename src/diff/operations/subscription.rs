//! Subscription operations. `conninfo` is masked before diffing (§9) and
//! never drives a replace; `enabled` and `publications` are reconciled via
//! `ALTER SUBSCRIPTION`.

use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::id::DbObjectId;
use crate::catalog::subscription::Subscription;
use crate::render::quote_ident;

#[derive(Debug, Clone)]
pub enum SubscriptionOperation {
    Create {
        subscription: Subscription,
    },
    Alter {
        name: String,
        publications: Vec<String>,
        enabled: bool,
    },
    Drop {
        name: String,
    },
    Comment(CommentOperation<SubscriptionIdentifier>),
}

impl SubscriptionOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Alter { .. } => OperationKind::Alter,
            Self::Drop { .. } => OperationKind::Drop,
            Self::Comment(_) => OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubscriptionIdentifier {
    pub name: String,
}

impl CommentTarget for SubscriptionIdentifier {
    const OBJECT_TYPE: &'static str = "SUBSCRIPTION";

    fn identifier(&self) -> String {
        quote_ident(&self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Subscription {
            name: self.name.clone(),
        }
    }
}
