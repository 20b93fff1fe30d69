//! Phased dependency sort (spec §4.3): a two-pass ordering engine that
//! turns the diff engine's unordered change list into an executable
//! statement order honoring PostgreSQL's dependency rules.
//!
//! The sort runs in two stages. [`presort::logical_pre_sort`] groups
//! changes for human readability and gives the topological sort a
//! deterministic starting order to break ties with; it never has to be
//! correct, only helpful. [`phased_dependency_sort`] then partitions
//! changes into the `drop` and `create_alter_object` phases and sorts each
//! independently against the catalog appropriate to that phase — the
//! source catalog for drops (the state being dismantled, so edges run in
//! reverse), the target catalog for creates/alters (the state being
//! built).

pub mod cycle;
pub mod presort;
pub mod toposort;

use std::collections::BTreeMap;

pub use cycle::CycleError;

use crate::catalog::Catalog;
use crate::catalog::constraint::ConstraintType;
use crate::catalog::id::DbObjectId;
use crate::diff::operations::{ConstraintOperation, MigrationStep, OperationKind, SequenceOperation};

/// The spec's `phase` tag: every change is `drop` or `create_alter_object`,
/// and the two are sorted independently of one another. Drops always
/// precede creates/alters in the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Drop,
    CreateAlter,
}

impl Phase {
    pub fn of(step: &MigrationStep) -> Phase {
        match step.operation_kind() {
            OperationKind::Drop => Phase::Drop,
            OperationKind::Create | OperationKind::Alter => Phase::CreateAlter,
        }
    }
}

/// Where a directed ordering constraint ("`from` must run before `to`")
/// came from, per spec §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOrigin {
    /// Derived from a catalog dependency row (`PgDependRow` / `forward_deps`).
    Catalog,
    /// Derived from a change's own `requires` set (`MigrationStep::dependencies()`,
    /// or the implicit "comment requires its object" / "grant requires its
    /// object and grantee role" rules).
    Explicit,
    /// A kind-specific ordering rule that doesn't reduce to a catalog or
    /// per-change requirement (e.g. "extensions before all other creates").
    Custom,
}

/// A directed edge `from -> to` in the change-index graph for one phase.
/// `soft` edges may be discarded by [`cycle::break_cycles`] to linearize an
/// otherwise-unbreakable cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub origin: ConstraintOrigin,
    pub soft: bool,
}

/// Runs the full phased dependency sort: logical pre-sort, phase split,
/// then an independent constrained topological sort per phase.
pub fn phased_dependency_sort(
    steps: Vec<MigrationStep>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
) -> Result<Vec<MigrationStep>, CycleError> {
    let presorted = presort::logical_pre_sort(steps);

    let mut drop_steps = Vec::new();
    let mut create_alter_steps = Vec::new();
    for step in presorted {
        match Phase::of(&step) {
            Phase::Drop => drop_steps.push(step),
            Phase::CreateAlter => create_alter_steps.push(step),
        }
    }

    let mut ordered = sort_phase(drop_steps, old_catalog, true)?;
    ordered.extend(sort_phase(create_alter_steps, new_catalog, false)?);
    Ok(ordered)
}

/// Sorts one phase's changes against the catalog appropriate to that
/// phase. `is_drop` selects reversed catalog-dependency edges (drops run
/// in reverse dependency order) and marks table-to-table foreign-key
/// edges as soft so mutual-FK cycles have something to break.
fn sort_phase(
    steps: Vec<MigrationStep>,
    catalog: &Catalog,
    is_drop: bool,
) -> Result<Vec<MigrationStep>, CycleError> {
    if steps.len() <= 1 {
        return Ok(steps);
    }

    let id_to_indices = index_by_id(&steps);
    let edges = build_constraints(&steps, &id_to_indices, catalog, is_drop);
    let edges = dedup_edges(edges);
    let surviving = cycle::break_cycles(steps.len(), edges)?;

    let order = toposort::stable_toposort(steps.len(), &surviving).ok_or_else(|| {
        // cycle::break_cycles already guarantees an acyclic graph; a
        // residual cycle here means the breaker and the sort disagree
        // about what "acyclic" means, which is a bug in one of them.
        CycleError {
            node_indices: (0..steps.len()).collect(),
            edges: surviving.iter().map(|e| (e.from, e.to)).collect(),
        }
    })?;

    let mut steps: Vec<Option<MigrationStep>> = steps.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .map(|i| steps[i].take().expect("toposort yields each index once"))
        .collect())
}

fn index_by_id(steps: &[MigrationStep]) -> BTreeMap<DbObjectId, Vec<usize>> {
    let mut map: BTreeMap<DbObjectId, Vec<usize>> = BTreeMap::new();
    for (i, step) in steps.iter().enumerate() {
        map.entry(step.id()).or_default().push(i);
    }
    map
}

fn dedup_edges(edges: Vec<Edge>) -> Vec<Edge> {
    let mut seen: std::collections::BTreeSet<(usize, usize)> = std::collections::BTreeSet::new();
    let mut out = Vec::with_capacity(edges.len());
    for edge in edges {
        if seen.insert((edge.from, edge.to)) {
            out.push(edge);
        }
    }
    out
}

/// Builds every ordering constraint for one phase: catalog-derived,
/// explicit (`requires`), and custom kind-specific rules.
fn build_constraints(
    steps: &[MigrationStep],
    id_to_indices: &BTreeMap<DbObjectId, Vec<usize>>,
    catalog: &Catalog,
    is_drop: bool,
) -> Vec<Edge> {
    let mut edges = Vec::new();

    for (i, step) in steps.iter().enumerate() {
        let step_id = step.id();

        // Catalog constraints: every change touching `dep` (in `producers[dep]`)
        // must precede every change touching `step_id`'s referenced id for
        // creates, and the reverse for drops.
        if let Some(deps) = catalog.forward_deps.get(&step_id) {
            for dep in deps {
                let Some(dep_indices) = id_to_indices.get(dep) else {
                    continue;
                };
                let soft = is_soft_fk_edge(step, dep);
                for &dep_i in dep_indices {
                    if dep_i == i {
                        continue;
                    }
                    if is_drop {
                        // Dropping `step_id` (which depends on `dep`) must
                        // happen before dropping `dep` itself.
                        edges.push(Edge {
                            from: i,
                            to: dep_i,
                            origin: ConstraintOrigin::Catalog,
                            soft,
                        });
                    } else {
                        edges.push(Edge {
                            from: dep_i,
                            to: i,
                            origin: ConstraintOrigin::Catalog,
                            soft,
                        });
                    }
                }
            }
        }

        // Explicit constraints: the change's own `requires` set (step-level
        // dependencies not captured by the catalog, e.g. a synthesized
        // REVOKE, or a grant's grantee role).
        for dep in step.dependencies() {
            if let Some(dep_indices) = id_to_indices.get(&dep) {
                for &dep_i in dep_indices {
                    if dep_i != i {
                        edges.push(Edge {
                            from: dep_i,
                            to: i,
                            origin: ConstraintOrigin::Explicit,
                            soft: false,
                        });
                    }
                }
            }
        }

        // Explicit constraint: `comment:X` (here, any `is_comment()` step)
        // requires every other change touching the same id to have already
        // created/altered the object — i.e. a comment follows its own
        // object's create/alter within the same phase.
        if step.is_comment()
            && let Some(same_id_indices) = id_to_indices.get(&step_id)
        {
            for &other_i in same_id_indices {
                if other_i != i && !steps[other_i].is_comment() {
                    edges.push(Edge {
                        from: other_i,
                        to: i,
                        origin: ConstraintOrigin::Explicit,
                        soft: false,
                    });
                }
            }
        }
    }

    edges.extend(custom_constraints(steps, !is_drop));
    edges
}

/// A table-to-table foreign-key edge is the canonical "soft" edge per
/// spec §4.3: two tables with FKs into each other cannot both be created
/// with the FK inline, so the edge induced by that FK is the one cycle-
/// breaking is allowed to discard (the constraint itself is then added
/// after both tables exist, via its own `ADD CONSTRAINT` change).
fn is_soft_fk_edge(step: &MigrationStep, dep: &DbObjectId) -> bool {
    // A sequence's ownership edge to its owning table's column can race the
    // table's own creation edge to the sequence (default `nextval(...)`),
    // forming a cycle for identity/serial columns.
    if matches!(step, MigrationStep::Sequence(SequenceOperation::AlterOwnership { .. })) {
        return true;
    }

    let is_table_dep = matches!(dep, DbObjectId::Table { .. });
    let is_fk_constraint = matches!(
        step,
        MigrationStep::Constraint(ConstraintOperation::Create(c))
            if matches!(c.constraint_type, ConstraintType::ForeignKey { .. })
    ) || matches!(step, MigrationStep::Table(_));
    is_table_dep && is_fk_constraint
}

/// Kind-specific ordering rules that don't reduce to a single catalog row
/// or per-change `requires` entry.
fn custom_constraints(steps: &[MigrationStep], is_create_phase: bool) -> Vec<Edge> {
    let mut edges = Vec::new();
    if !is_create_phase {
        return edges;
    }

    // Extensions provide types/operators other objects may use; they sort
    // first by kind rank already, but also get a hard ordering guarantee
    // here since an extension with no pg_depend-visible consumer (e.g. a
    // domain built on an extension type with no catalog row recorded)
    // should still never race a non-extension, non-schema create.
    let extension_indices: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s, MigrationStep::Extension(_)) && s.is_create())
        .map(|(i, _)| i)
        .collect();
    let other_create_indices: Vec<usize> = steps
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            !matches!(s, MigrationStep::Extension(_) | MigrationStep::Schema(_)) && s.is_create()
        })
        .map(|(i, _)| i)
        .collect();

    for &ext_i in &extension_indices {
        for &other_i in &other_create_indices {
            edges.push(Edge {
                from: ext_i,
                to: other_i,
                origin: ConstraintOrigin::Custom,
                soft: false,
            });
        }
    }

    edges
}
