//! # Support Checker
//!
//! Conservative gate deciding whether a statement is eligible for this
//! planner at all. A `false` here is not an error: the caller routes the
//! statement to its legacy execution path. The checker therefore errs on
//! the side of rejection — anything with subqueries, aggregation,
//! DISTINCT, parameter markers, more than one table, or an
//! information-schema table falls through.

use crate::ast::{Expr, FromClause, SelectField, SelectStmt, Statement};
use crate::catalog::INFORMATION_SCHEMA;

pub fn supported(stmt: &Statement) -> bool {
    match stmt {
        Statement::Select(select) => select_supported(select),
        _ => false,
    }
}

fn select_supported(stmt: &SelectStmt) -> bool {
    if stmt.distinct || !stmt.group_by.is_empty() || stmt.having.is_some() {
        return false;
    }

    match stmt.from {
        None => {}
        Some(FromClause::Join { .. }) => return false,
        Some(FromClause::Table(table)) => {
            if table
                .schema
                .is_some_and(|s| s.eq_ignore_ascii_case(INFORMATION_SCHEMA))
            {
                return false;
            }
        }
    }

    for field in stmt.fields {
        if let SelectField::Expr { expr, .. } = field {
            if !expr_supported(expr) {
                return false;
            }
        }
    }
    if let Some(where_clause) = stmt.where_clause {
        if !expr_supported(where_clause) {
            return false;
        }
    }
    stmt.order_by.iter().all(|item| expr_supported(item.expr))
}

fn expr_supported(expr: &Expr) -> bool {
    match expr {
        Expr::Subquery(_) | Expr::Aggregate(_) | Expr::ParamMarker => false,
        Expr::Value(_) | Expr::Column(_) => true,
        Expr::Binary { left, right, .. } => expr_supported(left) && expr_supported(right),
        Expr::Unary { expr, .. } => expr_supported(expr),
        Expr::Paren(inner) => expr_supported(inner),
        Expr::Row(items) => items.iter().all(|e| expr_supported(e)),
        Expr::Between {
            expr, low, high, ..
        } => expr_supported(expr) && expr_supported(low) && expr_supported(high),
        // NOT IN and NOT LIKE are fenced off here; the range builder
        // treats them as unreachable.
        Expr::InList { negated: true, .. } | Expr::Like { negated: true, .. } => false,
        Expr::InList { expr, list, .. } => {
            expr_supported(expr) && list.iter().all(|e| expr_supported(e))
        }
        Expr::IsNull { expr, .. } | Expr::IsTruth { expr, .. } => expr_supported(expr),
        Expr::Like { expr, pattern, .. } => expr_supported(expr) && expr_supported(pattern),
        Expr::Function(call) => call.args.iter().all(|e| expr_supported(e)),
    }
}
