//! SQL rendering for procedural language operations

use crate::catalog::id::DbObjectId;
use crate::diff::operations::{CommentOperation, LanguageOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for LanguageOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            LanguageOperation::Create { language } => {
                let trusted = if language.trusted { "TRUSTED " } else { "" };
                vec![RenderedSql::new(format!(
                    "CREATE {trusted}LANGUAGE {};",
                    quote_ident(&language.name)
                ))]
            }
            LanguageOperation::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP LANGUAGE {};",
                quote_ident(name)
            ))],
            LanguageOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            LanguageOperation::Create { language } => DbObjectId::Language {
                name: language.name.clone(),
            },
            LanguageOperation::Drop { name } => DbObjectId::Language { name: name.clone() },
            LanguageOperation::Comment(op) => match op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Language {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, LanguageOperation::Drop { .. })
    }
}
