use crate::catalog::role::Role;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, RoleIdentifier, RoleOperation};

/// Diff a single role. Roles have no non-alterable fields (SPEC_FULL §4.1):
/// an altered role always reconciles via `ALTER ROLE` plus membership
/// grants/revokes, never a drop+create replace.
pub fn diff(old: Option<&Role>, new: Option<&Role>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(role)) => vec![MigrationStep::Role(RoleOperation::Create {
            role: role.clone(),
        })],

        (Some(role), None) => vec![MigrationStep::Role(RoleOperation::Drop {
            name: role.name.clone(),
        })],

        (Some(old_role), Some(new_role)) => {
            let mut steps = Vec::new();

            if old_role.can_login != new_role.can_login
                || old_role.is_superuser != new_role.is_superuser
                || old_role.can_createdb != new_role.can_createdb
                || old_role.can_createrole != new_role.can_createrole
                || old_role.can_replicate != new_role.can_replicate
                || old_role.connection_limit != new_role.connection_limit
            {
                steps.push(MigrationStep::Role(RoleOperation::AlterFlags {
                    name: new_role.name.clone(),
                    can_login: new_role.can_login,
                    is_superuser: new_role.is_superuser,
                    can_createdb: new_role.can_createdb,
                    can_createrole: new_role.can_createrole,
                    can_replicate: new_role.can_replicate,
                    connection_limit: new_role.connection_limit,
                }));
            }

            for group in &new_role.member_of {
                if !old_role.member_of.contains(group) {
                    steps.push(MigrationStep::Role(RoleOperation::GrantMembership {
                        role: new_role.name.clone(),
                        group: group.clone(),
                    }));
                }
            }
            for group in &old_role.member_of {
                if !new_role.member_of.contains(group) {
                    steps.push(MigrationStep::Role(RoleOperation::RevokeMembership {
                        role: new_role.name.clone(),
                        group: group.clone(),
                    }));
                }
            }

            let comment_ops = comment_utils::handle_comment_diff(Some(old_role), Some(new_role), || {
                RoleIdentifier {
                    name: new_role.name.clone(),
                }
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Role(RoleOperation::Comment(comment_op)));
            }

            steps
        }

        (None, None) => vec![],
    }
}
