//! The round-based apply engine (spec §4.5): executes an ordered list of
//! statements against a live database, tolerating residual ordering errors
//! the phased dependency sort couldn't rule out, reclassifying SQLSTATE
//! codes as retryable/environmental/fatal, and finishing with a function-
//! body validation pass.
//!
//! [`round_based`] is DB-agnostic — it drives any [`round_based::StatementExecutor`] —
//! so it can be unit-tested against a fake in-memory executor without a
//! live PostgreSQL instance. [`connection`] supplies the real `sqlx`-backed
//! executor the CLI apply commands use.

pub mod connection;
pub mod round_based;

pub use round_based::{
    ApplyConfig, ApplyResult, ApplyStatus, ExecError, PendingStatement, RoundCounters,
    StatementClass, StatementExecutor, apply_round_based,
};
