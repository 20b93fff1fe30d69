//! SQL rendering for rule operations

use crate::catalog::id::DbObjectId;
use crate::catalog::rule::Rule;
use crate::diff::operations::{CommentOperation, RuleOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for RuleOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            RuleOperation::Create { rule } => {
                vec![RenderedSql::new(format!("{};", rule.definition.trim_end_matches(';')))]
            }
            RuleOperation::Replace { rule } => {
                let definition = rule.definition.trim_end_matches(';');
                let replaced = definition.replacen("CREATE RULE", "CREATE OR REPLACE RULE", 1);
                vec![RenderedSql::new(format!("{};", replaced))]
            }
            RuleOperation::Drop { schema, table, name } => vec![RenderedSql::destructive(format!(
                "DROP RULE {} ON {}.{};",
                quote_ident(name),
                quote_ident(schema),
                quote_ident(table)
            ))],
            RuleOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            RuleOperation::Create { rule } | RuleOperation::Replace { rule } => DbObjectId::Rule {
                schema: rule.schema.clone(),
                table: rule.table.clone(),
                name: rule.name.clone(),
            },
            RuleOperation::Drop { schema, table, name } => DbObjectId::Rule {
                schema: schema.clone(),
                table: table.clone(),
                name: name.clone(),
            },
            RuleOperation::Comment(op) => match op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Rule {
                        schema: target.schema.clone(),
                        table: target.table.clone(),
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, RuleOperation::Drop { .. })
    }
}
