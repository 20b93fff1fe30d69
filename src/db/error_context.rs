//! Shared utility for extracting rich error context from PostgreSQL errors.
//! Used across all SQL file execution: schema init, migrations, baselines.

use sqlx::postgres::{PgDatabaseError, PgErrorPosition};

/// Rich error context extracted from PostgreSQL errors
#[derive(Debug, Clone)]
pub struct SqlErrorContext {
    /// The primary error message
    pub message: String,
    /// Line number in the SQL file (converted from character position)
    pub line_number: Option<usize>,
    /// Character position in the SQL content (1-indexed)
    #[allow(dead_code)]
    pub position: Option<usize>,
    /// Additional detail from PostgreSQL
    pub detail: Option<String>,
    /// Hint for fixing the error
    pub hint: Option<String>,
    /// Context (e.g., PL/pgSQL function context)
    pub context: Option<String>,
    /// PostgreSQL error code (e.g., "42P01" for undefined_table)
    #[allow(dead_code)]
    pub code: Option<String>,
}

impl SqlErrorContext {
    /// Extract rich error context from a sqlx error
    ///
    /// Uses structured data from PgDatabaseError - no string parsing needed.
    pub fn from_sqlx_error(error: &sqlx::Error, sql_content: &str) -> Self {
        if let Some(db_error) = error.as_database_error()
            && let Some(pg_error) = db_error.try_downcast_ref::<PgDatabaseError>()
        {
            let position = pg_error.position().map(|pos| match pos {
                PgErrorPosition::Original(p) => p,
                PgErrorPosition::Internal { position, .. } => position,
            });
            let line_number = position.map(|p| position_to_line(sql_content, p));

            return Self {
                message: pg_error.message().to_string(),
                line_number,
                position,
                detail: pg_error.detail().map(|s| s.to_string()),
                hint: pg_error.hint().map(|s| s.to_string()),
                context: pg_error.r#where().map(|s| s.to_string()),
                code: Some(pg_error.code().to_string()),
            };
        }

        // Fallback for non-PostgreSQL errors
        Self {
            message: error.to_string(),
            line_number: None,
            position: None,
            detail: None,
            hint: None,
            context: None,
            code: None,
        }
    }

    /// Format the error for display with file context
    pub fn format(&self, file_path: &str, sql_content: &str) -> String {
        let mut msg = format!("SQL error in '{}'", file_path);

        if let Some(line) = self.line_number {
            msg.push_str(&format!(" at line {}", line));
        }
        msg.push_str(":\n\n");

        // Primary error message
        msg.push_str(&format!("  {}\n", self.message));

        // Additional PostgreSQL context
        if let Some(detail) = &self.detail {
            msg.push_str(&format!("\n  Detail: {}", detail));
        }
        if let Some(hint) = &self.hint {
            msg.push_str(&format!("\n  Hint: {}", hint));
        }
        if let Some(ctx) = &self.context {
            msg.push_str(&format!("\n  Context: {}", ctx));
        }

        // Show relevant lines from the SQL content
        if let Some(line) = self.line_number {
            msg.push_str(&format!("\n\n{}", format_line_context(sql_content, line)));
        }

        msg
    }
}

/// Convert 1-indexed character position to line number
pub fn position_to_line(content: &str, position: usize) -> usize {
    let end = (position.saturating_sub(1)).min(content.len());
    content[..end].chars().filter(|c| *c == '\n').count() + 1
}

/// Format SQL content showing context around the error line
pub fn format_line_context(content: &str, error_line: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();
    const CONTEXT_LINES: usize = 3;

    let error_idx = error_line.saturating_sub(1);
    let start_idx = error_idx.saturating_sub(CONTEXT_LINES);
    let end_idx = (error_idx + CONTEXT_LINES + 1).min(total_lines);

    let mut result = String::new();

    if start_idx > 0 {
        result.push_str(&format!("  ... [{} lines above]\n", start_idx));
    }

    for (idx, line) in lines[start_idx..end_idx].iter().enumerate() {
        let line_num = start_idx + idx + 1;
        let marker = if line_num == error_line { ">" } else { " " };
        result.push_str(&format!("  {} {:4} | {}\n", marker, line_num, line));
    }

    if end_idx < total_lines {
        result.push_str(&format!("  ... [{} lines below]", total_lines - end_idx));
    }

    result
}
