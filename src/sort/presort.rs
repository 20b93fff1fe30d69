//! Logical pre-sort (spec §4.2): a stable, deterministic grouping pass that
//! makes the final plan readable and gives the phased dependency sort a
//! sensible starting order to break ties with. Correctness of the final
//! order comes entirely from the dependency sort in [`super::sort_phase`];
//! this pass never has to be right, only helpful.

use crate::catalog::id::DbObjectId;
use crate::diff::operations::{MigrationStep, Scope};

use super::Phase;

/// Five-key sort: phase, object-kind rank, schema, parent object, scope.
/// `public` sorts first among schema names when otherwise tied, matching
/// the convention that most hand-written migrations put `public` first.
pub fn logical_pre_sort(mut steps: Vec<MigrationStep>) -> Vec<MigrationStep> {
    steps.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    steps
}

type SortKey = (u8, u8, String, String, u8);

fn sort_key(step: &MigrationStep) -> SortKey {
    let phase = match Phase::of(step) {
        Phase::Drop => 0,
        Phase::CreateAlter => 1,
    };
    let id = step.id();
    let kind_rank = id.kind().rank();
    let schema = schema_key(&id);
    let parent = parent_key(&id);
    let scope = match step.scope() {
        Scope::Object => 0,
        Scope::Comment => 1,
        Scope::Privilege => 2,
    };
    (phase, kind_rank, schema, parent, scope)
}

/// `public` sorts before every other schema name when phase/kind tie.
fn schema_key(id: &DbObjectId) -> String {
    match id.schema() {
        Some("public") => String::new(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Groups changes that touch the same parent object (e.g. every index,
/// constraint, trigger and column change on one table) next to each other.
fn parent_key(id: &DbObjectId) -> String {
    match id {
        DbObjectId::Column { schema, table, .. }
        | DbObjectId::Constraint { schema, table, .. }
        | DbObjectId::Trigger { schema, table, .. }
        | DbObjectId::Rule { schema, table, .. }
        | DbObjectId::Policy { schema, table, .. } => format!("{schema}.{table}"),
        DbObjectId::UserMapping { server, .. } => server.clone(),
        DbObjectId::Comment { object_id } => parent_key(object_id),
        other => other.stable_id().as_str().to_string(),
    }
}
