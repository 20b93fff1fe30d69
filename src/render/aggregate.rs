//! SQL rendering for aggregate operations

use crate::catalog::aggregate::Aggregate;
use crate::catalog::id::DbObjectId;
use crate::diff::operations::{AggregateIdentifier, AggregateOperation, CommentOperation};
use crate::render::{RenderedSql, SqlRenderer};

impl SqlRenderer for AggregateOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            AggregateOperation::Create { aggregate } => {
                vec![render_create_aggregate(aggregate)]
            }
            AggregateOperation::Drop { identifier } => {
                vec![render_drop_aggregate(identifier)]
            }
            AggregateOperation::Replace { new_aggregate, .. } => {
                // For replace, we drop and recreate
                vec![
                    render_drop_aggregate(&AggregateIdentifier::from_aggregate(new_aggregate)),
                    render_create_aggregate(new_aggregate),
                ]
            }
            AggregateOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            AggregateOperation::Create { aggregate } => DbObjectId::Aggregate {
                schema: aggregate.schema.clone(),
                name: aggregate.name.clone(),
                arguments: aggregate.arguments.clone(),
            },
            AggregateOperation::Drop { identifier } => DbObjectId::Aggregate {
                schema: identifier.schema.clone(),
                name: identifier.name.clone(),
                arguments: identifier.arguments.clone(),
            },
            AggregateOperation::Replace { new_aggregate, .. } => DbObjectId::Aggregate {
                schema: new_aggregate.schema.clone(),
                name: new_aggregate.name.clone(),
                arguments: new_aggregate.arguments.clone(),
            },
            AggregateOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Aggregate {
                        schema: target.schema.clone(),
                        name: target.name.clone(),
                        arguments: target.arguments.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, AggregateOperation::Drop { .. })
    }
}

fn render_create_aggregate(aggregate: &Aggregate) -> RenderedSql {
    // Use the reconstructed definition
    let sql = format!("{};", aggregate.definition);
    RenderedSql::new(sql)
}

fn render_drop_aggregate(identifier: &AggregateIdentifier) -> RenderedSql {
    let sql = format!(
        "DROP AGGREGATE \"{}\".\"{}\"({})",
        identifier.schema, identifier.name, identifier.arguments
    );
    RenderedSql::destructive(sql)
}
