//! SQL rendering for publication operations

use crate::catalog::id::DbObjectId;
use crate::catalog::publication::Publication;
use crate::diff::operations::{CommentOperation, PublicationOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

fn publish_clause(insert: bool, update: bool, delete: bool, truncate: bool) -> String {
    let mut actions = Vec::new();
    if insert {
        actions.push("insert");
    }
    if update {
        actions.push("update");
    }
    if delete {
        actions.push("delete");
    }
    if truncate {
        actions.push("truncate");
    }
    format!("publish = '{}'", actions.join(", "))
}

fn table_list(tables: &[(String, String)]) -> String {
    tables
        .iter()
        .map(|(schema, name)| format!("{}.{}", quote_ident(schema), quote_ident(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_create(publication: &Publication) -> RenderedSql {
    let mut sql = format!("CREATE PUBLICATION {}", quote_ident(&publication.name));
    if publication.all_tables {
        sql.push_str(" FOR ALL TABLES");
    } else if !publication.tables.is_empty() {
        sql.push_str(&format!(" FOR TABLE {}", table_list(&publication.tables)));
    }
    sql.push_str(&format!(
        " WITH ({});",
        publish_clause(
            publication.publish_insert,
            publication.publish_update,
            publication.publish_delete,
            publication.publish_truncate,
        )
    ));
    RenderedSql::new(sql)
}

impl SqlRenderer for PublicationOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            PublicationOperation::Create { publication } => vec![render_create(publication)],
            PublicationOperation::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP PUBLICATION {};",
                quote_ident(name)
            ))],
            PublicationOperation::Alter {
                name,
                all_tables,
                tables,
                publish_insert,
                publish_update,
                publish_delete,
                publish_truncate,
            } => {
                let mut out = Vec::new();
                if !all_tables {
                    out.push(RenderedSql::new(format!(
                        "ALTER PUBLICATION {} SET TABLE {};",
                        quote_ident(name),
                        table_list(tables)
                    )));
                }
                out.push(RenderedSql::new(format!(
                    "ALTER PUBLICATION {} SET ({});",
                    quote_ident(name),
                    publish_clause(*publish_insert, *publish_update, *publish_delete, *publish_truncate)
                )));
                out
            }
            PublicationOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            PublicationOperation::Create { publication } => DbObjectId::Publication {
                name: publication.name.clone(),
            },
            PublicationOperation::Drop { name } | PublicationOperation::Alter { name, .. } => {
                DbObjectId::Publication { name: name.clone() }
            }
            PublicationOperation::Comment(op) => match op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Publication {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, PublicationOperation::Drop { .. })
    }
}
