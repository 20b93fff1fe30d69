//! Shared SQL rendering for constraint statements
//!
//! This module provides consistent constraint rendering across both schema generation
//! and migration operations to ensure identical SQL output.

use crate::catalog::constraint::{Constraint, ConstraintType};
use crate::render::quote_ident;

/// Render a complete ALTER TABLE ADD CONSTRAINT statement for the given constraint.
///
/// This function handles all PostgreSQL constraint types:
/// - UNIQUE constraints
/// - FOREIGN KEY constraints with full options (ON DELETE/UPDATE, DEFERRABLE)
/// - CHECK constraints (with proper handling of pg_get_constraintdef() output)
/// - EXCLUSION constraints with index methods and operators
/// - Proper SQL formatting and identifier quoting
pub fn render_create_constraint(constraint: &Constraint) -> String {
    let table_name = format!(
        "{}.{}",
        quote_ident(&constraint.schema),
        quote_ident(&constraint.table)
    );

    let constraint_def = match &constraint.constraint_type {
        ConstraintType::Unique { columns } => {
            let column_list = columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            format!("UNIQUE ({})", column_list)
        }
        ConstraintType::ForeignKey {
            columns,
            referenced_schema,
            referenced_table,
            referenced_columns,
            on_delete,
            on_update,
            deferrable,
            initially_deferred,
        } => {
            let column_list = columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            let ref_table = format!(
                "{}.{}",
                quote_ident(referenced_schema),
                quote_ident(referenced_table)
            );
            let ref_column_list = referenced_columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");

            let mut fk_def = format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                column_list, ref_table, ref_column_list
            );

            if let Some(on_delete) = on_delete {
                fk_def.push_str(&format!(" ON DELETE {}", on_delete));
            }
            if let Some(on_update) = on_update {
                fk_def.push_str(&format!(" ON UPDATE {}", on_update));
            }
            if *deferrable {
                fk_def.push_str(" DEFERRABLE");
                if *initially_deferred {
                    fk_def.push_str(" INITIALLY DEFERRED");
                }
            }

            fk_def
        }
        ConstraintType::Check { expression } => {
            // PostgreSQL's pg_get_constraintdef() returns the complete constraint definition
            // including "CHECK (expression)". Since our template uses "ADD CONSTRAINT name {def}",
            // and CHECK constraints expect "CHECK (expression)", we use it directly.
            // However, to handle cases where the expression might already include CHECK,
            // we ensure we don't double the CHECK keyword.
            if expression.trim_start().starts_with("CHECK") {
                // Expression already includes CHECK keyword, use as-is
                expression.clone()
            } else {
                // Expression is just the condition, wrap in CHECK
                format!("CHECK ({})", expression)
            }
        }
        ConstraintType::Exclusion {
            elements,
            operator_classes: _,
            operators,
            index_method,
            predicate,
        } => {
            let mut exclusion_def = format!("EXCLUDE USING {} (", index_method);

            // Build element WITH operator pairs
            let element_ops: Vec<String> = elements
                .iter()
                .zip(operators.iter())
                .map(|(element, operator)| format!("{} WITH {}", element, operator))
                .collect();

            exclusion_def.push_str(&element_ops.join(", "));
            exclusion_def.push(')');

            if let Some(pred) = predicate {
                exclusion_def.push_str(&format!(" WHERE {}", pred));
            }

            exclusion_def
        }
    };

    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} {};",
        table_name,
        quote_ident(&constraint.name),
        constraint_def
    )
}

/// Render a complete ALTER TABLE DROP CONSTRAINT statement for the given constraint.
pub fn render_drop_constraint(schema: &str, table: &str, constraint_name: &str) -> String {
    let table_name = format!("{}.{}", quote_ident(schema), quote_ident(table));
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {};",
        table_name,
        quote_ident(constraint_name)
    )
}
