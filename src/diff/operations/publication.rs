//! Publication operations. The table list and `WITH` options are the
//! publication's alterable surface — `ALTER PUBLICATION ... SET TABLE`/
//! `SET (...)` reconciles them without a drop+create.

use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::id::DbObjectId;
use crate::catalog::publication::Publication;
use crate::render::quote_ident;

#[derive(Debug, Clone)]
pub enum PublicationOperation {
    Create {
        publication: Publication,
    },
    Alter {
        name: String,
        all_tables: bool,
        tables: Vec<(String, String)>,
        publish_insert: bool,
        publish_update: bool,
        publish_delete: bool,
        publish_truncate: bool,
    },
    Drop {
        name: String,
    },
    Comment(CommentOperation<PublicationIdentifier>),
}

impl PublicationOperation {
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
pub struct PublicationIdentifier {
    pub name: String,
}

impl CommentTarget for PublicationIdentifier {
    const OBJECT_TYPE: &'static str = "PUBLICATION";

    fn identifier(&self) -> String {
        quote_ident(&self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Publication {
            name: self.name.clone(),
        }
    }
}
