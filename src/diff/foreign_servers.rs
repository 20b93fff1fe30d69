use crate::catalog::foreign_server::ForeignServer;
use crate::diff::comment_utils;
use crate::diff::operations::{ForeignServerIdentifier, ForeignServerOperation, MigrationStep};

pub fn diff(old: Option<&ForeignServer>, new: Option<&ForeignServer>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(server)) => vec![MigrationStep::ForeignServer(
            ForeignServerOperation::Create {
                server: server.clone(),
            },
        )],

        (Some(server), None) => vec![MigrationStep::ForeignServer(ForeignServerOperation::Drop {
            name: server.name.clone(),
        })],

        (Some(old_server), Some(new_server)) => {
            let data_equal = old_server.fdw_name == new_server.fdw_name
                && old_server.server_type == new_server.server_type
                && old_server.server_version == new_server.server_version
                && old_server.options == new_server.options;

            if !data_equal {
                return vec![
                    MigrationStep::ForeignServer(ForeignServerOperation::Drop {
                        name: old_server.name.clone(),
                    }),
                    MigrationStep::ForeignServer(ForeignServerOperation::Create {
                        server: new_server.clone(),
                    }),
                ];
            }

            comment_utils::handle_comment_diff(Some(old_server), Some(new_server), || {
                ForeignServerIdentifier {
                    name: new_server.name.clone(),
                }
            })
            .into_iter()
            .map(|op| MigrationStep::ForeignServer(ForeignServerOperation::Comment(op)))
            .collect()
        }

        (None, None) => vec![],
    }
}
