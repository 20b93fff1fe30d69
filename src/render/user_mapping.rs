//! SQL rendering for user mapping operations

use crate::catalog::id::DbObjectId;
use crate::diff::operations::UserMappingOperation;
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

impl SqlRenderer for UserMappingOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            UserMappingOperation::Create { mapping } => {
                let user = if mapping.user_name == "PUBLIC" {
                    "PUBLIC".to_string()
                } else {
                    quote_ident(&mapping.user_name)
                };
                vec![RenderedSql::new(format!(
                    "CREATE USER MAPPING FOR {} SERVER {}{};",
                    user,
                    quote_ident(&mapping.server),
                    options_clause(&mapping.options)
                ))]
            }
            UserMappingOperation::Drop { server, user_name } => {
                let user = if user_name == "PUBLIC" {
                    "PUBLIC".to_string()
                } else {
                    quote_ident(user_name)
                };
                vec![RenderedSql::destructive(format!(
                    "DROP USER MAPPING FOR {} SERVER {};",
                    user,
                    quote_ident(server)
                ))]
            }
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            UserMappingOperation::Create { mapping } => DbObjectId::UserMapping {
                server: mapping.server.clone(),
                user_name: mapping.user_name.clone(),
            },
            UserMappingOperation::Drop { server, user_name } => DbObjectId::UserMapping {
                server: server.clone(),
                user_name: user_name.clone(),
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, UserMappingOperation::Drop { .. })
    }
}
