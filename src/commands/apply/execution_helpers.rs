use anyhow::{Context, Result};
use console::style;
use sqlx::PgPool;
use tracing::info;

use crate::apply::connection::PgStatementExecutor;
use crate::apply::{ApplyConfig, ApplyResult, ApplyStatus, PendingStatement, StatementClass, apply_round_based};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::diff::operations::{EventTriggerOperation, FunctionOperation, MigrationStep, RoleOperation, SubscriptionOperation};
use crate::render::Safety;

use super::ApplyOutcome;
use super::verification::verify_final_state;

/// Maps a migration step to the `statement_class` the round-based applier
/// uses for error-classification heuristics and final-body revalidation
/// (spec §6's "statement_class strings").
fn statement_class_for(step: &MigrationStep) -> Option<StatementClass> {
    match step {
        MigrationStep::Function(FunctionOperation::Create { kind, .. })
        | MigrationStep::Function(FunctionOperation::Replace { kind, .. }) => {
            if kind == "PROCEDURE" {
                Some(StatementClass::CreateProcedure)
            } else {
                Some(StatementClass::CreateFunction)
            }
        }
        MigrationStep::Role(RoleOperation::Create { .. }) => Some(StatementClass::CreateRole),
        MigrationStep::Subscription(SubscriptionOperation::Create { .. }) => {
            Some(StatementClass::CreateSubscription)
        }
        MigrationStep::EventTrigger(EventTriggerOperation::Create { .. }) => {
            Some(StatementClass::CreateEventTrigger)
        }
        _ => None,
    }
}

/// Renders every step to its SQL statements, tagging each with the
/// originating step's id (for reporting) and statement class, alongside
/// the safety level used by the safe-only apply path.
fn pending_statements(steps: &[MigrationStep]) -> Vec<(PendingStatement, Safety)> {
    use crate::diff::operations::SqlRenderer;

    let mut out = Vec::new();
    for step in steps {
        let class = statement_class_for(step);
        for (j, rendered) in step.to_sql().into_iter().enumerate() {
            let id = format!("{}#{j}", step.id());
            let mut stmt = PendingStatement::new(id, rendered.sql);
            if let Some(class) = class {
                stmt = stmt.with_class(class);
            }
            out.push((stmt, rendered.safety));
        }
    }
    out
}

/// Turns an [`ApplyResult`] into a `Result<()>`, printing a round summary
/// when verbose and surfacing `stuck`/hard-failure/validation detail in the
/// error message when the run didn't succeed.
fn check_apply_result(result: &ApplyResult, verbose: bool) -> Result<()> {
    if verbose {
        for counters in &result.round_counters {
            println!(
                "   round {}: {} applied, {} retried, {} skipped, {} failed",
                counters.round, counters.applied, counters.retried, counters.skipped, counters.failed
            );
        }
    }

    match result.status {
        ApplyStatus::Success => Ok(()),
        ApplyStatus::Stuck => {
            let detail = result
                .stuck
                .iter()
                .map(|(id, err)| format!("  {id}: {err}"))
                .collect::<Vec<_>>()
                .join("\n");
            Err(anyhow::anyhow!(
                "migration apply got stuck after {} round(s) with {} statement(s) unresolved:\n{detail}",
                result.total_rounds,
                result.stuck.len()
            ))
        }
        ApplyStatus::Error => {
            let mut lines = Vec::new();
            for (id, err) in &result.hard_failures {
                lines.push(format!("  {id}: {err}"));
            }
            for (id, err) in &result.validation_errors {
                lines.push(format!("  {id} (validation): {err}"));
            }
            Err(anyhow::anyhow!(
                "migration apply failed after {} round(s):\n{}",
                result.total_rounds,
                lines.join("\n")
            ))
        }
    }
}

/// Apply all rendered steps (both safe and destructive) through the
/// round-based applier (spec §4.5): a single acquired connection runs the
/// ordered statement list across retry rounds, then a final function-body
/// validation pass.
pub async fn apply_all_rendered_steps(
    steps: &[MigrationStep],
    dev_pool: &PgPool,
    expected_catalog: &Catalog,
    config: &Config,
    verbose: bool,
) -> Result<ApplyOutcome> {
    let pending = pending_statements(steps);
    let total = pending.len();
    info!("Executing {} migration statements across rounds...", total);
    if verbose {
        for (stmt, _) in &pending {
            println!("{}", style(&stmt.sql).dim());
        }
    }

    let statements: Vec<PendingStatement> = pending.into_iter().map(|(stmt, _)| stmt).collect();
    let mut conn = dev_pool
        .acquire()
        .await
        .context("failed to acquire a database connection for apply")?;
    let result = {
        let mut executor = PgStatementExecutor::new(&mut *conn);
        apply_round_based(&mut executor, statements, &ApplyConfig::default()).await
    };
    check_apply_result(&result, verbose)?;

    verify_final_state(dev_pool, expected_catalog, config).await?;
    Ok(ApplyOutcome::Applied)
}

/// Apply only safe rendered steps, optionally showing destructive ones
pub async fn apply_safe_rendered_steps(
    steps: &[MigrationStep],
    dev_pool: &PgPool,
    expected_catalog: &Catalog,
    config: &Config,
    show_skipped: bool,
    verbose: bool,
) -> Result<ApplyOutcome> {
    let all_pending = pending_statements(steps);
    let safe_count = all_pending.iter().filter(|(_, safety)| *safety == Safety::Safe).count();
    let destructive_count = all_pending.len() - safe_count;

    let has_skipped = destructive_count > 0;

    if destructive_count > 0 && show_skipped {
        if verbose {
            println!(
                "⚠️  Detected {} destructive operation{}",
                destructive_count,
                if destructive_count == 1 { "" } else { "s" }
            );
            println!("🛡️  Safe-only mode: skipping destructive operations");
        } else {
            println!(
                "⚠️  {} destructive operation{} detected but not applied in safe-only mode",
                destructive_count,
                if destructive_count == 1 { "" } else { "s" }
            );
        }

        for (stmt, safety) in &all_pending {
            if *safety == Safety::Destructive {
                let sql_preview = stmt.sql.lines().next().unwrap_or("").trim();
                if verbose {
                    println!("❌ Skipped: {sql_preview}");
                } else {
                    println!("   ❌ Skipped: {sql_preview}");
                }
            }
        }

        if safe_count == 0 {
            println!("⚠️  No safe operations to apply");
            return Ok(ApplyOutcome::Skipped);
        }
    }

    if safe_count > 0 {
        if verbose {
            println!(
                "✅ Applying {} safe operation{}",
                safe_count,
                if safe_count == 1 { "" } else { "s" }
            );
        } else {
            println!(
                "✅ Auto-applying {} safe operation{}...",
                safe_count,
                if safe_count == 1 { "" } else { "s" }
            );
        }

        let statements: Vec<PendingStatement> = all_pending
            .into_iter()
            .filter(|(_, safety)| *safety == Safety::Safe)
            .map(|(stmt, _)| stmt)
            .collect();

        info!("Executing {} safe migration statements...", statements.len());

        let mut conn = dev_pool
            .acquire()
            .await
            .context("failed to acquire a database connection for apply")?;
        let result = {
            let mut executor = PgStatementExecutor::new(&mut *conn);
            apply_round_based(&mut executor, statements, &ApplyConfig::default()).await
        };
        check_apply_result(&result, verbose)?;

        if verbose {
            println!("✅ Safe operations completed successfully");
        }

        verify_final_state(dev_pool, expected_catalog, config).await?;
    }

    if has_skipped {
        Ok(ApplyOutcome::Skipped)
    } else {
        Ok(ApplyOutcome::Applied)
    }
}
