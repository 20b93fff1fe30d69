//! Rule operations. `pg_get_ruledef` yields a full `CREATE RULE` statement
//! that PostgreSQL accepts back via `CREATE OR REPLACE RULE`, so a changed
//! definition alters in place rather than replacing.

use super::{CommentOperation, CommentTarget, OperationKind};
use crate::catalog::id::DbObjectId;
use crate::catalog::rule::Rule;
use crate::render::quote_ident;

#[derive(Debug, Clone)]
pub enum RuleOperation {
    Create {
        rule: Rule,
    },
    Replace {
        rule: Rule,
    },
    Drop {
        schema: String,
        table: String,
        name: String,
    },
    Comment(CommentOperation<RuleIdentifier>),
}

impl RuleOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Replace { .. } | Self::Comment(_) => OperationKind::Alter,
            Self::Drop { .. } => OperationKind::Drop,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleIdentifier {
    pub schema: String,
    pub table: String,
    pub name: String,
}

impl CommentTarget for RuleIdentifier {
    const OBJECT_TYPE: &'static str = "RULE";

    fn identifier(&self) -> String {
        format!(
            "{} ON {}.{}",
            quote_ident(&self.name),
            quote_ident(&self.schema),
            quote_ident(&self.table)
        )
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Rule {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}
