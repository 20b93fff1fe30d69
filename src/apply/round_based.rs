//! Core round-based apply algorithm (spec §4.5). DB-agnostic: driven
//! through the [`StatementExecutor`] trait so the retry/classification
//! logic can be exercised against a fake executor in unit tests.

use std::collections::HashSet;

use tracing::warn;

/// The `statement_class` strings from spec §6's external interface — the
/// only classes that affect error classification or earn a final-body
/// revalidation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementClass {
    CreateFunction,
    CreateProcedure,
    CreateSubscription,
    CreateEventTrigger,
    CreateRole,
}

impl StatementClass {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementClass::CreateFunction => "CREATE_FUNCTION",
            StatementClass::CreateProcedure => "CREATE_PROCEDURE",
            StatementClass::CreateSubscription => "CREATE_SUBSCRIPTION",
            StatementClass::CreateEventTrigger => "CREATE_EVENT_TRIGGER",
            StatementClass::CreateRole => "CREATE_ROLE",
        }
    }

    /// Only these two classes get a final `check_function_bodies = on`
    /// revalidation pass (spec §9 open question #2, preserved verbatim —
    /// not expanded to aggregates or the other classes even though they
    /// could in principle fail a body check).
    fn revalidates(self) -> bool {
        matches!(self, StatementClass::CreateFunction | StatementClass::CreateProcedure)
    }
}

/// One statement in the apply run's input list: an id for reporting, the
/// SQL text, and an optional class used for error-classification
/// heuristics and final-body revalidation.
#[derive(Debug, Clone)]
pub struct PendingStatement {
    pub id: String,
    pub sql: String,
    pub statement_class: Option<StatementClass>,
}

impl PendingStatement {
    pub fn new(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sql: sql.into(),
            statement_class: None,
        }
    }

    pub fn with_class(mut self, class: StatementClass) -> Self {
        self.statement_class = Some(class);
        self
    }
}

/// An error observed executing one statement: the SQLSTATE if the backend
/// supplied one, and the human-readable message used both for reporting
/// and for the message-pattern half of [`classify`].
#[derive(Debug, Clone)]
pub struct ExecError {
    pub sqlstate: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sqlstate {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A live connection (or a fake, in tests) the applier can execute
/// statements against. Implementations own whatever single connection the
/// spec requires the whole run to share — this trait doesn't acquire or
/// release one itself.
pub trait StatementExecutor {
    async fn execute(&mut self, sql: &str) -> Result<(), ExecError>;
    async fn set_check_function_bodies(&mut self, enabled: bool) -> Result<(), ExecError>;
}

/// SQLSTATEs spec §4.5/§6 calls out as "dependency" errors: the statement
/// referenced something that doesn't exist yet, which a later round (after
/// some other statement creates it) may resolve.
const DEPENDENCY_SQLSTATES: &[&str] = &[
    "42P01", // undefined_table
    "42703", // undefined_column
    "42704", // undefined_object
    "42883", // undefined_function
    "3F000", // invalid_schema_name
];

/// SQLSTATEs that usually indicate the target instance can't run this
/// statement at all (a capability limitation), so retrying would never
/// help — skip permanently instead. These are heuristic: the same code
/// can mean something else in another statement, so message-pattern
/// matching backs this up for cases with no reliable code (below).
const ENVIRONMENT_SQLSTATES: &[&str] = &[
    "0A000", // feature_not_supported
    "42710", // duplicate_object (role/extension already exists)
    "42501", // insufficient_privilege (event trigger / superuser requirement)
];

/// Message substrings identifying environment/capability limitations that
/// don't reliably carry one of the codes above (logical replication
/// components, optional procedural languages, publication/replica-identity
/// mismatches). Matched case-insensitively against the backend message.
const ENVIRONMENT_MESSAGE_MARKERS: &[&str] = &[
    "walreceiver",
    "logical replication worker",
    "must be superuser",
    "replica identity",
    "extension control file",
    "language \"c\" does not exist",
    "is not available",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retry next round.
    Dependency,
    /// Skip permanently with a warning; doesn't count as a failure.
    Environment,
    /// Surfaced as a hard failure; doesn't abort the run.
    Hard,
}

/// Classifies one [`ExecError`] per spec §4.5/§7. SQLSTATE drives the
/// common cases; the message-marker list backs up environment errors
/// PostgreSQL doesn't give a dedicated code for.
pub fn classify(error: &ExecError) -> ErrorClass {
    if let Some(code) = error.sqlstate.as_deref() {
        if DEPENDENCY_SQLSTATES.contains(&code) {
            return ErrorClass::Dependency;
        }
        if ENVIRONMENT_SQLSTATES.contains(&code) {
            return ErrorClass::Environment;
        }
    }
    let lower = error.message.to_lowercase();
    if ENVIRONMENT_MESSAGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return ErrorClass::Environment;
    }
    ErrorClass::Hard
}

/// Configuration per spec §4.5: bounded rounds, whether to run the main
/// loop with `check_function_bodies` off, and whether to run the final
/// validation pass.
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    pub max_rounds: usize,
    pub disable_check_function_bodies: bool,
    pub run_validation: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            max_rounds: 100,
            disable_check_function_bodies: true,
            run_validation: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    Success,
    Stuck,
    Error,
}

/// Per-round bookkeeping surfaced in [`ApplyResult`], per spec §6's "apply
/// outputs" contract.
#[derive(Debug, Clone, Default)]
pub struct RoundCounters {
    pub round: usize,
    pub applied: usize,
    pub retried: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ApplyResult {
    pub status: ApplyStatus,
    pub total_rounds: usize,
    pub total_applied: usize,
    pub total_skipped: usize,
    pub round_counters: Vec<RoundCounters>,
    pub hard_failures: Vec<(String, String)>,
    pub stuck: Vec<(String, String)>,
    pub validation_errors: Vec<(String, String)>,
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        self.status == ApplyStatus::Success
    }
}

/// Runs the round-based apply algorithm against `executor`. Does not
/// acquire or release a connection itself — callers own that (spec §5:
/// "the connection is released on all exit paths" is the caller's job,
/// since only the caller knows how the connection was obtained).
pub async fn apply_round_based<E: StatementExecutor>(
    executor: &mut E,
    statements: Vec<PendingStatement>,
    config: &ApplyConfig,
) -> ApplyResult {
    if config.disable_check_function_bodies {
        let _ = executor.set_check_function_bodies(false).await;
    }

    let mut pending: Vec<(PendingStatement, Option<String>)> =
        statements.into_iter().map(|s| (s, None)).collect();
    let mut round_counters = Vec::new();
    let mut total_applied = 0usize;
    let mut total_skipped = 0usize;
    let mut hard_failures: Vec<(String, String)> = Vec::new();
    let mut remembered_for_validation: Vec<PendingStatement> = Vec::new();
    let mut stuck_status = false;

    let mut round = 0usize;
    while !pending.is_empty() && round < config.max_rounds {
        round += 1;
        let mut counters = RoundCounters {
            round,
            ..Default::default()
        };
        let mut next_pending = Vec::new();

        for (stmt, _last_error) in pending {
            match executor.execute(&stmt.sql).await {
                Ok(()) => {
                    counters.applied += 1;
                    total_applied += 1;
                    if stmt.statement_class.is_some_and(StatementClass::revalidates) {
                        remembered_for_validation.push(stmt);
                    }
                }
                Err(err) => match classify(&err) {
                    ErrorClass::Dependency => {
                        counters.retried += 1;
                        next_pending.push((stmt, Some(err.to_string())));
                    }
                    ErrorClass::Environment => {
                        counters.skipped += 1;
                        total_skipped += 1;
                        warn!(statement = %stmt.id, error = %err, "skipping environment-limited statement");
                    }
                    ErrorClass::Hard => {
                        counters.failed += 1;
                        hard_failures.push((stmt.id.clone(), err.to_string()));
                    }
                },
            }
        }

        let made_progress = counters.applied > 0;
        round_counters.push(counters);

        if !next_pending.is_empty() && !made_progress {
            stuck_status = true;
            pending = next_pending;
            break;
        }
        pending = next_pending;
    }

    let stuck: Vec<(String, String)> = pending
        .into_iter()
        .map(|(stmt, err)| (stmt.id, err.unwrap_or_default()))
        .collect();
    if !stuck.is_empty() {
        stuck_status = true;
    }

    let mut validation_errors = Vec::new();
    if !stuck_status && config.run_validation && !remembered_for_validation.is_empty() {
        let _ = executor.set_check_function_bodies(true).await;
        let mut seen: HashSet<String> = HashSet::new();
        for stmt in &remembered_for_validation {
            if !seen.insert(stmt.id.clone()) {
                continue;
            }
            let rewritten = rewrite_as_or_replace(&stmt.sql);
            if let Err(err) = executor.execute(&rewritten).await {
                validation_errors.push((stmt.id.clone(), err.to_string()));
            }
        }
    }

    let status = if stuck_status {
        ApplyStatus::Stuck
    } else if hard_failures.is_empty() && validation_errors.is_empty() {
        ApplyStatus::Success
    } else {
        ApplyStatus::Error
    };

    ApplyResult {
        status,
        total_rounds: round,
        total_applied,
        total_skipped,
        round_counters,
        hard_failures,
        stuck,
        validation_errors,
    }
}

/// Rewrites `CREATE FUNCTION`/`CREATE PROCEDURE` to `CREATE OR REPLACE ...`
/// so the final validation pass is idempotent against a statement that
/// already succeeded once in the main loop.
fn rewrite_as_or_replace(sql: &str) -> String {
    let trimmed = sql.trim_start();
    for keyword in ["CREATE FUNCTION", "CREATE PROCEDURE"] {
        if trimmed.len() >= keyword.len() && trimmed[..keyword.len()].eq_ignore_ascii_case(keyword)
        {
            let rest = &trimmed[keyword.len()..];
            let replacement = if keyword == "CREATE FUNCTION" {
                "CREATE OR REPLACE FUNCTION"
            } else {
                "CREATE OR REPLACE PROCEDURE"
            };
            return format!("{replacement}{rest}");
        }
    }
    sql.to_string()
}
