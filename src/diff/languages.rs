use crate::catalog::language::Language;
use crate::diff::comment_utils;
use crate::diff::operations::{LanguageIdentifier, LanguageOperation, MigrationStep};

pub fn diff(old: Option<&Language>, new: Option<&Language>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(language)) => vec![MigrationStep::Language(LanguageOperation::Create {
            language: language.clone(),
        })],

        (Some(language), None) => vec![MigrationStep::Language(LanguageOperation::Drop {
            name: language.name.clone(),
        })],

        (Some(old_lang), Some(new_lang)) => {
            if old_lang.trusted != new_lang.trusted {
                return vec![
                    MigrationStep::Language(LanguageOperation::Drop {
                        name: old_lang.name.clone(),
                    }),
                    MigrationStep::Language(LanguageOperation::Create {
                        language: new_lang.clone(),
                    }),
                ];
            }

            comment_utils::handle_comment_diff(Some(old_lang), Some(new_lang), || {
                LanguageIdentifier {
                    name: new_lang.name.clone(),
                }
            })
            .into_iter()
            .map(|op| MigrationStep::Language(LanguageOperation::Comment(op)))
            .collect()
        }

        (None, None) => vec![],
    }
}
