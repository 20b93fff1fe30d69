//! SQL rendering for foreign server operations

use crate::catalog::id::DbObjectId;
use crate::diff::operations::{CommentOperation, ForeignServerOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

fn options_clause(options: &[(String, String)]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = options
        .iter()
        .map(|(k, v)| format!("{} '{}'", k, v.replace('\'', "''")))
        .collect();
    format!(" OPTIONS ({})", pairs.join(", "))
}

impl SqlRenderer for ForeignServerOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ForeignServerOperation::Create { server } => {
                let mut sql = format!("CREATE SERVER {} FOREIGN DATA WRAPPER {}", quote_ident(&server.name), quote_ident(&server.fdw_name));
                if let Some(t) = &server.server_type {
                    sql.push_str(&format!(" TYPE '{}'", t.replace('\'', "''")));
                }
                if let Some(v) = &server.server_version {
                    sql.push_str(&format!(" VERSION '{}'", v.replace('\'', "''")));
                }
                sql.push_str(&options_clause(&server.options));
                sql.push(';');
                vec![RenderedSql::new(sql)]
            }
            ForeignServerOperation::Drop { name } => vec![RenderedSql::destructive(format!(
                "DROP SERVER {};",
                quote_ident(name)
            ))],
            ForeignServerOperation::Comment(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            ForeignServerOperation::Create { server } => DbObjectId::ForeignServer {
                name: server.name.clone(),
            },
            ForeignServerOperation::Drop { name } => DbObjectId::ForeignServer { name: name.clone() },
            ForeignServerOperation::Comment(op) => match op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::ForeignServer {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, ForeignServerOperation::Drop { .. })
    }
}
