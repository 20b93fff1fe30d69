//! Shared SQL rendering for CREATE TABLE statements
//!
//! This module provides consistent table rendering across both schema generation
//! and migration operations to ensure identical SQL output.

use crate::catalog::table::Table;
use crate::render::quote_ident;

/// Render a complete CREATE TABLE statement for the given table.
///
/// This function handles all PostgreSQL table features:
/// - Column definitions with data types
/// - NOT NULL constraints
/// - DEFAULT values
/// - Generated columns (GENERATED ALWAYS AS ... STORED)
/// - Primary key constraints (single and compound)
/// - Proper SQL formatting and identifier quoting
pub fn render_create_table(table: &Table) -> String {
    let mut sql = String::new();

    // CREATE TABLE schema.name
    sql.push_str("CREATE TABLE ");
    sql.push_str(&format!(
        "{}.{}",
        quote_ident(&table.schema),
        quote_ident(&table.name)
    ));
    sql.push_str(" (\n");

    // Column definitions
    let mut column_definitions = Vec::new();

    for column in &table.columns {
        let mut col_def = String::new();

        // Column name and data type
        col_def.push_str(&format!(
            "    {} {}",
            quote_ident(&column.name),
            column.data_type
        ));

        // Generated column expression (must come before default and not null)
        if let Some(ref generated_expr) = column.generated {
            col_def.push_str(&format!(" GENERATED ALWAYS AS ({}) STORED", generated_expr));
        }

        // Default value
        if let Some(ref default) = column.default {
            col_def.push_str(&format!(" DEFAULT {}", default));
        }

        // NOT NULL constraint
        if column.not_null {
            col_def.push_str(" NOT NULL");
        }

        column_definitions.push(col_def);
    }

    // Add primary key constraint if present
    if let Some(ref pk) = table.primary_key {
        let pk_columns = pk
            .columns
            .iter()
            .map(|col| quote_ident(col))
            .collect::<Vec<_>>()
            .join(", ");

        let pk_def = format!(
            "    CONSTRAINT {} PRIMARY KEY ({})",
            quote_ident(&pk.name),
            pk_columns
        );
        column_definitions.push(pk_def);
    }

    // Join all definitions
    sql.push_str(&column_definitions.join(",\n"));
    sql.push_str("\n);");

    sql
}
