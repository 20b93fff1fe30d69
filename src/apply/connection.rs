//! The `sqlx`-backed [`StatementExecutor`] the CLI apply commands drive.
//! Holds the single acquired connection the round-based applier's whole
//! run shares, per spec §5 ("applying is strictly sequential on a single
//! connection").

use sqlx::{Executor, PgConnection};

use super::round_based::{ExecError, StatementExecutor};

/// Wraps one already-acquired `sqlx` Postgres connection (or pooled
/// connection, via `Deref<Target = PgConnection>`). The applier never sees
/// the pool — only this single connection — so statement ordering effects
/// are always observed before the next statement runs.
pub struct PgStatementExecutor<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgStatementExecutor<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl StatementExecutor for PgStatementExecutor<'_> {
    async fn execute(&mut self, sql: &str) -> Result<(), ExecError> {
        self.conn.execute(sql).await.map(|_| ()).map_err(to_exec_error)
    }

    async fn set_check_function_bodies(&mut self, enabled: bool) -> Result<(), ExecError> {
        let value = if enabled { "on" } else { "off" };
        self.conn
            .execute(format!("SET check_function_bodies = {value}").as_str())
            .await
            .map(|_| ())
            .map_err(to_exec_error)
    }
}

fn to_exec_error(error: sqlx::Error) -> ExecError {
    let sqlstate = match &error {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    };
    ExecError {
        sqlstate,
        message: error.to_string(),
    }
}
