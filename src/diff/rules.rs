use crate::catalog::rule::Rule;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, RuleIdentifier, RuleOperation};

pub fn diff(old: Option<&Rule>, new: Option<&Rule>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(rule)) => vec![MigrationStep::Rule(RuleOperation::Create {
            rule: rule.clone(),
        })],

        (Some(rule), None) => vec![MigrationStep::Rule(RuleOperation::Drop {
            schema: rule.schema.clone(),
            table: rule.table.clone(),
            name: rule.name.clone(),
        })],

        (Some(old_rule), Some(new_rule)) => {
            let mut steps = Vec::new();

            if old_rule.definition != new_rule.definition {
                steps.push(MigrationStep::Rule(RuleOperation::Replace {
                    rule: new_rule.clone(),
                }));
            }

            steps.extend(
                comment_utils::handle_comment_diff(Some(old_rule), Some(new_rule), || {
                    RuleIdentifier {
                        schema: new_rule.schema.clone(),
                        table: new_rule.table.clone(),
                        name: new_rule.name.clone(),
                    }
                })
                .into_iter()
                .map(|op| MigrationStep::Rule(RuleOperation::Comment(op))),
            );

            steps
        }

        (None, None) => vec![],
    }
}
