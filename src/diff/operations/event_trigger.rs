//! Event trigger operations. `event`, `tags`, and the bound function are
//! fixed at creation time and replace on change; `enabled` state is
//! reconciled via `ALTER EVENT TRIGGER`.

use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::event_trigger::EventTrigger;
use crate::catalog::id::DbObjectId;
use crate::render::quote_ident;

#[derive(Debug, Clone)]
pub enum EventTriggerOperation {
    Create {
        trigger: EventTrigger,
    },
    AlterEnabled {
        name: String,
        enabled: String,
    },
    Drop {
        name: String,
    },
    Comment(CommentOperation<EventTriggerIdentifier>),
}

impl EventTriggerOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::AlterEnabled { .. } => OperationKind::Alter,
            Self::Drop { .. } => OperationKind::Drop,
            Self::Comment(_) => OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventTriggerIdentifier {
    pub name: String,
}

impl CommentTarget for EventTriggerIdentifier {
    const OBJECT_TYPE: &'static str = "EVENT TRIGGER";

    fn identifier(&self) -> String {
        quote_ident(&self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::EventTrigger {
            name: self.name.clone(),
        }
    }
}
