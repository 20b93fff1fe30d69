use crate::catalog::publication::Publication;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, PublicationIdentifier, PublicationOperation};

pub fn diff(old: Option<&Publication>, new: Option<&Publication>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(publication)) => vec![MigrationStep::Publication(PublicationOperation::Create {
            publication: publication.clone(),
        })],

        (Some(publication), None) => vec![MigrationStep::Publication(PublicationOperation::Drop {
            name: publication.name.clone(),
        })],

        (Some(old_pub), Some(new_pub)) => {
            let mut steps = Vec::new();

            let table_surface_changed = old_pub.all_tables != new_pub.all_tables
                || old_pub.tables != new_pub.tables
                || old_pub.publish_insert != new_pub.publish_insert
                || old_pub.publish_update != new_pub.publish_update
                || old_pub.publish_delete != new_pub.publish_delete
                || old_pub.publish_truncate != new_pub.publish_truncate;

            if old_pub.all_tables != new_pub.all_tables {
                // FOR ALL TABLES is not alterable; replace.
                steps.push(MigrationStep::Publication(PublicationOperation::Drop {
                    name: old_pub.name.clone(),
                }));
                steps.push(MigrationStep::Publication(PublicationOperation::Create {
                    publication: new_pub.clone(),
                }));
            } else if table_surface_changed {
                steps.push(MigrationStep::Publication(PublicationOperation::Alter {
                    name: new_pub.name.clone(),
                    all_tables: new_pub.all_tables,
                    tables: new_pub.tables.clone(),
                    publish_insert: new_pub.publish_insert,
                    publish_update: new_pub.publish_update,
                    publish_delete: new_pub.publish_delete,
                    publish_truncate: new_pub.publish_truncate,
                }));
            }

            steps.extend(
                comment_utils::handle_comment_diff(Some(old_pub), Some(new_pub), || {
                    PublicationIdentifier {
                        name: new_pub.name.clone(),
                    }
                })
                .into_iter()
                .map(|op| MigrationStep::Publication(PublicationOperation::Comment(op))),
            );

            steps
        }

        (None, None) => vec![],
    }
}
