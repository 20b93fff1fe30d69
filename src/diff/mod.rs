pub mod aggregates;
pub mod cascade;
pub mod columns;
pub mod comment_utils;
pub mod constraints;
pub mod custom_types;
pub mod domains;
pub mod event_triggers;
pub mod extensions;
pub mod foreign_servers;
pub mod functions;
pub mod grants;
pub mod indexes;
pub mod languages;
pub mod operations;
pub mod policies;
pub mod publications;
pub mod roles;
pub mod rules;
pub mod schemas;
pub mod sequences;
pub mod subscriptions;
pub mod tables;
pub mod triggers;
pub mod user_mappings;
pub mod views;

use crate::catalog::id::{DbObjectId, DependsOn};
use crate::catalog::{
    Catalog, aggregate::Aggregate, constraint::Constraint, custom_type::CustomType, domain::Domain,
    event_trigger::EventTrigger, extension::Extension, foreign_server::ForeignServer,
    function::Function, index::Index, language::Language, publication::Publication, role::Role,
    rule::Rule, sequence::Sequence, subscription::Subscription, table::Table,
    user_mapping::UserMapping, view::View,
};
use crate::diff::operations::MigrationStep;
use crate::sort::CycleError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

pub fn diff_all(old: &Catalog, new: &Catalog) -> Vec<MigrationStep> {
    info!("Diffing catalogs...");
    let mut out = Vec::new();

    out.extend(diff_list(&old.roles, &new.roles, Role::id, roles::diff));

    out.extend(diff_list(
        &old.languages,
        &new.languages,
        Language::id,
        languages::diff,
    ));

    out.extend(diff_list(
        &old.schemas,
        &new.schemas,
        |s| DbObjectId::Schema {
            name: s.name.clone(),
        },
        schemas::diff,
    ));

    out.extend(diff_list(
        &old.extensions,
        &new.extensions,
        Extension::id,
        extensions::diff,
    ));

    out.extend(diff_list(
        &old.types,
        &new.types,
        CustomType::id,
        custom_types::diff,
    ));

    out.extend(diff_list(
        &old.domains,
        &new.domains,
        Domain::id,
        domains::diff,
    ));

    out.extend(diff_list(
        &old.sequences,
        &new.sequences,
        Sequence::id,
        sequences::diff,
    ));

    out.extend(diff_list(&old.tables, &new.tables, Table::id, tables::diff));

    out.extend(diff_list(
        &old.indexes,
        &new.indexes,
        Index::id,
        indexes::diff,
    ));

    out.extend(diff_list(
        &old.constraints,
        &new.constraints,
        Constraint::id,
        constraints::diff,
    ));

    out.extend(diff_list(
        &old.triggers,
        &new.triggers,
        |t| t.id(),
        triggers::diff,
    ));

    out.extend(diff_list(&old.views, &new.views, View::id, views::diff));

    out.extend(diff_list(
        &old.functions,
        &new.functions,
        Function::id,
        functions::diff,
    ));

    out.extend(diff_list(
        &old.aggregates,
        &new.aggregates,
        Aggregate::id,
        aggregates::diff,
    ));

    out.extend(diff_list(
        &old.policies,
        &new.policies,
        |p| p.id(),
        policies::diff,
    ));

    out.extend(diff_list(&old.rules, &new.rules, Rule::id, rules::diff));

    out.extend(diff_list(
        &old.foreign_servers,
        &new.foreign_servers,
        ForeignServer::id,
        foreign_servers::diff,
    ));

    out.extend(diff_list(
        &old.user_mappings,
        &new.user_mappings,
        UserMapping::id,
        user_mappings::diff,
    ));

    out.extend(diff_list(
        &old.publications,
        &new.publications,
        Publication::id,
        publications::diff,
    ));

    out.extend(diff_list(
        &old.subscriptions,
        &new.subscriptions,
        Subscription::id,
        subscriptions::diff,
    ));

    out.extend(diff_list(
        &old.event_triggers,
        &new.event_triggers,
        EventTrigger::id,
        event_triggers::diff,
    ));

    out.extend(grants::diff_grants(&old.grants, &new.grants));

    info!("Diff complete");
    out
}

pub fn diff_list<T, I: Eq + Ord + Clone, R>(
    old: &[T],
    new: &[T],
    id_of: impl Fn(&T) -> I,
    diff_fn: impl Fn(Option<&T>, Option<&T>) -> Vec<R>,
) -> Vec<R> {
    let mut old_map = BTreeMap::new();
    let mut new_map = BTreeMap::new();
    for o in old {
        old_map.insert(id_of(o), o);
    }
    for n in new {
        new_map.insert(id_of(n), n);
    }

    let all_ids: BTreeSet<_> = old_map.keys().chain(new_map.keys()).cloned().collect();

    all_ids
        .into_iter()
        .flat_map(|id| diff_fn(old_map.get(&id).cloned(), new_map.get(&id).cloned()))
        .collect()
}

/// Orders an unordered change list per spec §4.2/§4.3: a logical pre-sort
/// for readability, then a phase-partitioned topological sort (drop phase
/// against `old_catalog`, create/alter phase against `new_catalog`) with
/// cycle detection and heuristic soft-edge breaking.
///
/// Unresolvable cycles are reported as a [`CycleError`] rendered with the
/// change descriptions and surviving hard edges, per spec §4.3's failure
/// semantics ("unresolvable cycles are fatal").
pub fn diff_order(
    steps: Vec<MigrationStep>,
    old_catalog: &Catalog,
    new_catalog: &Catalog,
) -> anyhow::Result<Vec<MigrationStep>> {
    info!("Ordering migration steps...");
    crate::sort::phased_dependency_sort(steps, old_catalog, new_catalog)
        .map_err(|err: CycleError| anyhow::anyhow!("{err}"))
}
