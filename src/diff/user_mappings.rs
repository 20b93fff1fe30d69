use crate::catalog::user_mapping::UserMapping;
use crate::diff::operations::{MigrationStep, UserMappingOperation};

/// User mappings have no alterable form modeled here: `options` are masked
/// before diffing, so any apparent difference replaces (drop + create).
pub fn diff(old: Option<&UserMapping>, new: Option<&UserMapping>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(mapping)) => vec![MigrationStep::UserMapping(UserMappingOperation::Create {
            mapping: mapping.clone(),
        })],

        (Some(mapping), None) => vec![MigrationStep::UserMapping(UserMappingOperation::Drop {
            server: mapping.server.clone(),
            user_name: mapping.user_name.clone(),
        })],

        (Some(old_mapping), Some(new_mapping)) => {
            if old_mapping.options == new_mapping.options {
                vec![]
            } else {
                vec![
                    MigrationStep::UserMapping(UserMappingOperation::Drop {
                        server: old_mapping.server.clone(),
                        user_name: old_mapping.user_name.clone(),
                    }),
                    MigrationStep::UserMapping(UserMappingOperation::Create {
                        mapping: new_mapping.clone(),
                    }),
                ]
            }
        }

        (None, None) => vec![],
    }
}
