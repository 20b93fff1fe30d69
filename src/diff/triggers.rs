use crate::catalog::triggers::Trigger;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, TriggerIdentifier, TriggerOperation};

/// Diff a single trigger
pub fn diff(old: Option<&Trigger>, new: Option<&Trigger>) -> Vec<MigrationStep> {
    match (old, new) {
        // CREATE new trigger
        (None, Some(new_trigger)) => {
            vec![MigrationStep::Trigger(TriggerOperation::Create {
                trigger: Box::new(new_trigger.clone()),
            })]
        }

        // DROP old trigger
        (Some(old_trigger), None) => {
            let identifier = TriggerIdentifier::new(
                old_trigger.schema.clone(),
                old_trigger.table_name.clone(),
                old_trigger.name.clone(),
            );
            vec![MigrationStep::Trigger(TriggerOperation::Drop {
                identifier,
            })]
        }

        // REPLACE or comment-only changes
        (Some(old_trigger), Some(new_trigger)) => {
            let mut steps = Vec::new();

            if triggers_differ_structurally(old_trigger, new_trigger) {
                // Structural changes require replacement
                steps.push(MigrationStep::Trigger(TriggerOperation::Replace {
                    old_trigger: Box::new(old_trigger.clone()),
                    new_trigger: Box::new(new_trigger.clone()),
                }));
            } else {
                // Only comments might have changed
                let comment_ops = comment_utils::handle_comment_diff(
                    Some(old_trigger),
                    Some(new_trigger),
                    || TriggerIdentifier::from_trigger(new_trigger),
                );
                for comment_op in comment_ops {
                    steps.push(MigrationStep::Trigger(TriggerOperation::Comment(
                        comment_op,
                    )));
                }
            }

            steps
        }

        // No change
        (None, None) => vec![],
    }
}

/// Check if two triggers differ in their structural properties
/// (everything except comments)
fn triggers_differ_structurally(old: &Trigger, new: &Trigger) -> bool {
    // Compare the complete trigger definitions - this handles all structural changes
    // including timing, events, WHEN conditions, function calls, etc.
    old.definition != new.definition
}
