//! Procedural language operations. Languages have no `ALTER LANGUAGE` form
//! for their one data field (`trusted`), so an altered language always
//! replaces (drop + create) per the diff engine's non-alterable-field rule.

use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::id::DbObjectId;
use crate::catalog::language::Language;
use crate::render::quote_ident;

#[derive(Debug, Clone)]
pub enum LanguageOperation {
    Create { language: Language },
    Drop { name: String },
    Comment(CommentOperation<LanguageIdentifier>),
}

impl LanguageOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Drop { .. } => OperationKind::Drop,
            Self::Comment(_) => OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LanguageIdentifier {
    pub name: String,
}

impl CommentTarget for LanguageIdentifier {
    const OBJECT_TYPE: &'static str = "LANGUAGE";

    fn identifier(&self) -> String {
        quote_ident(&self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Language {
            name: self.name.clone(),
        }
    }
}
