use crate::catalog::id::DbObjectId;
use crate::catalog::index::Index;
use crate::diff::operations::{CommentOperation, CommentTarget, SqlRenderer};
use crate::render::{RenderedSql, Safety, quote_ident};

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum IndexOperation {
    Create(Index),
    Drop {
        schema: String,
        name: String,
    },
    Comment(CommentOperation<IndexTarget>),
    /// Set a table to use an index for clustering (CLUSTER table USING index)
    Cluster {
        table_schema: String,
        table_name: String,
        index_schema: String,
        index_name: String,
    },
    /// Remove clustering from a table (ALTER TABLE SET WITHOUT CLUSTER)
    SetWithoutCluster {
        schema: String,
        name: String,
    },
    /// Rebuild an invalid index (REINDEX INDEX)
    Reindex {
        schema: String,
        name: String,
        concurrently: bool,
    },
}

impl IndexOperation {
    pub fn operation_kind(&self) -> super::OperationKind {
        match self {
            Self::Create(_) => super::OperationKind::Create,
            Self::Drop { .. } => super::OperationKind::Drop,
            Self::Comment(_)
            | Self::Cluster { .. }
            | Self::SetWithoutCluster { .. }
            | Self::Reindex { .. } => super::OperationKind::Alter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexTarget {
    pub schema: String,
    pub name: String,
}

impl CommentTarget for IndexTarget {
    const OBJECT_TYPE: &'static str = "INDEX";

    fn identifier(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Index {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

impl SqlRenderer for IndexOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            IndexOperation::Create(index) => vec![render_create_index(index)],
            IndexOperation::Drop { schema, name } => vec![RenderedSql {
                sql: format!("DROP INDEX {}.{};", quote_ident(schema), quote_ident(name)),
                safety: Safety::Destructive,
            }],
            IndexOperation::Comment(comment_op) => comment_op.to_sql(),
            IndexOperation::Cluster {
                table_schema,
                table_name,
                index_schema,
                index_name,
            } => vec![RenderedSql {
                sql: format!(
                    "CLUSTER {}.{} USING {}.{};",
                    quote_ident(table_schema),
                    quote_ident(table_name),
                    quote_ident(index_schema),
                    quote_ident(index_name)
                ),
                safety: Safety::Safe,
            }],
            IndexOperation::SetWithoutCluster { schema, name } => vec![RenderedSql {
                sql: format!(
                    "ALTER TABLE {}.{} SET WITHOUT CLUSTER;",
                    quote_ident(schema),
                    quote_ident(name)
                ),
                safety: Safety::Safe,
            }],
            IndexOperation::Reindex {
                schema,
                name,
                concurrently,
            } => vec![RenderedSql {
                sql: format!(
                    "REINDEX INDEX{} {}.{};",
                    if *concurrently { " CONCURRENTLY" } else { "" },
                    quote_ident(schema),
                    quote_ident(name)
                ),
                safety: Safety::Safe,
            }],
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            IndexOperation::Create(index) => index.id(),
            IndexOperation::Drop { schema, name } => DbObjectId::Index {
                schema: schema.clone(),
                name: name.clone(),
            },
            IndexOperation::Comment(comment_op) => comment_op.db_object_id(),
            IndexOperation::Cluster {
                index_schema,
                index_name,
                ..
            } => DbObjectId::Index {
                schema: index_schema.clone(),
                name: index_name.clone(),
            },
            IndexOperation::SetWithoutCluster { schema, name } => DbObjectId::Table {
                schema: schema.clone(),
                name: name.clone(),
            },
            IndexOperation::Reindex { schema, name, .. } => DbObjectId::Index {
                schema: schema.clone(),
                name: name.clone(),
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, IndexOperation::Drop { .. })
    }
}

fn render_create_index(index: &Index) -> RenderedSql {
    // Use the shared rendering function to ensure consistency with schema generation
    RenderedSql::new(crate::render::sql::render_create_index(index))
}
