//! Plan assembly: fingerprints the catalogs a migration was diffed from and
//! to, classifies the risk of the resulting statement list, and (for
//! callers that only want part of a migration applied) cascades a
//! predicate-based exclusion across dependent changes.
//!
//! This sits downstream of [`crate::diff::diff_order`]: it does not decide
//! *what* changes to make or in what order, only what to report about the
//! already-ordered list before it's handed to [`crate::apply`].

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Catalog;
use crate::catalog::id::{DbObjectId, DependsOn};
use crate::diff::operations::{MigrationStep, OperationKind, SqlRenderer};

/// A finished, orderable migration: the statements to run plus enough
/// bookkeeping to compare two plans for equivalence and to warn a caller
/// before applying something destructive.
#[derive(Debug, Clone)]
pub struct Plan {
    pub version: u32,
    pub source_fingerprint: String,
    pub target_fingerprint: String,
    pub statements: Vec<String>,
    pub risk: Risk,
    pub risk_reasons: Vec<String>,
    pub role: Option<String>,
}

/// Whether applying a plan can destroy data. `data_loss` covers dropped
/// tables, dropped columns, and dropped sequences — see
/// [`classify_risk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Risk {
    Safe,
    DataLoss,
}

/// Options that affect plan assembly but not the diff itself: a role to
/// run the statements as, and whether the caller wants the migration
/// restricted to a subset of changes (see [`apply_filter_cascade`]).
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub role: Option<String>,
}

const PLAN_VERSION: u32 = 1;

/// Builds the [`Plan`] for an already phase-and-dependency-ordered list of
/// steps, fingerprinting `old_catalog`/`new_catalog` and classifying risk.
pub fn assemble(steps: &[MigrationStep], old_catalog: &Catalog, new_catalog: &Catalog, options: &PlanOptions) -> Plan {
    let touched: BTreeSet<DbObjectId> = steps.iter().map(|step| step.id()).collect();

    let source_forms = canonical_forms(old_catalog);
    let target_forms = canonical_forms(new_catalog);

    let source_fingerprint = fingerprint(&touched, &source_forms);
    let target_fingerprint = fingerprint(&touched, &target_forms);

    let rendered: Vec<_> = steps.iter().flat_map(|step| step.to_sql()).collect();
    let needs_check_function_bodies_off = steps.iter().any(|step| {
        matches!(
            step,
            MigrationStep::Function(_) | MigrationStep::Aggregate(_)
        )
    });

    let mut statements = Vec::with_capacity(rendered.len() + 2);
    if let Some(role) = &options.role {
        statements.push(format!("SET ROLE \"{role}\";"));
    }
    if needs_check_function_bodies_off {
        statements.push("SET check_function_bodies = false;".to_string());
    }
    statements.extend(rendered.iter().map(|r| r.sql.clone()));

    let (risk, risk_reasons) = classify_risk(&rendered);

    Plan {
        version: PLAN_VERSION,
        source_fingerprint,
        target_fingerprint,
        statements,
        risk,
        risk_reasons,
        role: options.role.clone(),
    }
}

/// Absence marker for a touched stable ID missing from one side of the
/// diff (e.g. an object that doesn't exist yet on the target side of a
/// create). Keeps the two fingerprints computed over the identical ID set.
const ABSENT_MARKER: &str = "\u{2205}";

fn fingerprint(touched: &BTreeSet<DbObjectId>, forms: &BTreeMap<String, String>) -> String {
    let mut canonical: BTreeMap<&str, &str> = BTreeMap::new();
    for id in touched {
        let key = id.stable_id();
        let form = forms.get(key.as_str()).map(|s| s.as_str()).unwrap_or(ABSENT_MARKER);
        canonical.insert(key.as_str(), form);
    }
    let bytes = serde_json::to_vec(&canonical).expect("BTreeMap<&str, &str> always serializes");
    format!("{:x}", md5::compute(bytes))
}

/// Maps every object in a catalog to its `Debug`-derived canonical form,
/// keyed by stable ID string. Used as the "canonical data form" the plan's
/// fingerprint hashes over; `Debug` already captures every field each
/// catalog struct carries; the ordering within a struct is stable across
/// runs since it derives from source order, not iteration order.
fn canonical_forms(catalog: &Catalog) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();

    for schema in &catalog.schemas {
        let id = DbObjectId::Schema { name: schema.name.clone() };
        map.insert(id.stable_id().as_str().to_string(), format!("{schema:?}"));
    }

    insert_all(&mut map, &catalog.tables);
    insert_all(&mut map, &catalog.views);
    insert_all(&mut map, &catalog.types);
    insert_all(&mut map, &catalog.domains);
    insert_all(&mut map, &catalog.functions);
    insert_all(&mut map, &catalog.aggregates);
    insert_all(&mut map, &catalog.sequences);
    insert_all(&mut map, &catalog.indexes);
    insert_all(&mut map, &catalog.constraints);
    insert_all(&mut map, &catalog.triggers);
    insert_all(&mut map, &catalog.rules);
    insert_all(&mut map, &catalog.policies);
    insert_all(&mut map, &catalog.extensions);
    insert_all(&mut map, &catalog.grants);
    insert_all(&mut map, &catalog.roles);
    insert_all(&mut map, &catalog.languages);
    insert_all(&mut map, &catalog.foreign_servers);
    insert_all(&mut map, &catalog.user_mappings);
    insert_all(&mut map, &catalog.publications);
    insert_all(&mut map, &catalog.subscriptions);
    insert_all(&mut map, &catalog.event_triggers);

    map
}

fn insert_all<T: DependsOn + std::fmt::Debug>(map: &mut BTreeMap<String, String>, items: &[T]) {
    for item in items {
        map.insert(item.id().stable_id().as_str().to_string(), format!("{item:?}"));
    }
}

/// A plan is `data_loss` iff it contains at least one `DROP TABLE`,
/// `ALTER TABLE ... DROP COLUMN`, or `DROP SEQUENCE` statement; the reason
/// list names the offending statement (trimmed to its first line) for
/// surfacing to a human before apply.
fn classify_risk(rendered: &[crate::render::RenderedSql]) -> (Risk, Vec<String>) {
    let mut reasons = Vec::new();
    for stmt in rendered {
        let upper = stmt.sql.to_uppercase();
        if upper.trim_start().starts_with("DROP TABLE") {
            reasons.push(format!("drops a table: {}", first_line(&stmt.sql)));
        } else if upper.contains("DROP COLUMN") {
            reasons.push(format!("drops a column: {}", first_line(&stmt.sql)));
        } else if upper.trim_start().starts_with("DROP SEQUENCE") {
            reasons.push(format!("drops a sequence: {}", first_line(&stmt.sql)));
        }
    }
    let risk = if reasons.is_empty() { Risk::Safe } else { Risk::DataLoss };
    (risk, reasons)
}

fn first_line(sql: &str) -> &str {
    sql.lines().next().unwrap_or("").trim()
}

/// Propagates a caller's exclusion predicate across dependent changes: if
/// `keep` rejects a change, every other change that transitively requires
/// the rejected change's object (via its explicit `dependencies()` or via
/// the catalog's forward dependency graph) is excluded too, as a fixpoint
/// bounded by the number of steps.
pub fn apply_filter_cascade(
    steps: Vec<MigrationStep>,
    catalog: &Catalog,
    mut keep: impl FnMut(&MigrationStep) -> bool,
) -> Vec<MigrationStep> {
    let mut keep_flags: Vec<bool> = steps.iter().map(|step| keep(step)).collect();
    let mut excluded_ids: BTreeSet<DbObjectId> = BTreeSet::new();

    for (step, flag) in steps.iter().zip(&keep_flags) {
        if !flag && step.operation_kind() != OperationKind::Drop {
            excluded_ids.insert(step.id());
        }
    }

    for _ in 0..steps.len().max(1) {
        let mut changed = false;
        for (i, step) in steps.iter().enumerate() {
            if !keep_flags[i] {
                continue;
            }
            let step_id = step.id();
            let depends_on_excluded = step.dependencies().iter().any(|dep| excluded_ids.contains(dep))
                || catalog
                    .forward_deps
                    .get(&step_id)
                    .is_some_and(|deps| deps.iter().any(|dep| excluded_ids.contains(dep)));

            if depends_on_excluded {
                keep_flags[i] = false;
                if step.operation_kind() != OperationKind::Drop {
                    excluded_ids.insert(step_id);
                }
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    steps
        .into_iter()
        .zip(keep_flags)
        .filter_map(|(step, keep)| keep.then_some(step))
        .collect()
}
