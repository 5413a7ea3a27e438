//! # Result Type Computation
//!
//! Derives each expression's result type after binding: literals carry
//! their own type, columns take the catalog's, arithmetic promotes to
//! float unless both operands are integers, and every predicate form is
//! integer-valued. `None` stands for NULL (or unknown, e.g. an opaque
//! function call).

use crate::ast::{BinaryOp, Expr, SelectField, SelectStmt, UnaryOp};
use crate::error::{Error, Result};
use crate::types::DataType;

/// Walks the statement's expressions, computing result types and
/// surfacing any reference the binder failed to annotate.
pub fn check_types(stmt: &SelectStmt) -> Result<()> {
    for field in stmt.fields {
        if let SelectField::Expr { expr, .. } = field {
            expr_type(expr)?;
        }
    }
    if let Some(where_clause) = stmt.where_clause {
        expr_type(where_clause)?;
    }
    for item in stmt.order_by {
        expr_type(item.expr)?;
    }
    Ok(())
}

pub fn expr_type(expr: &Expr) -> Result<Option<DataType>> {
    match expr {
        Expr::Value(v) => Ok(v.data_type()),
        Expr::Column(c) => {
            let binding = c.binding.ok_or_else(|| Error::BadField(c.column.to_string()))?;
            Ok(Some(binding.data_type))
        }
        Expr::Binary { op, left, right } => {
            let l = expr_type(left)?;
            let r = expr_type(right)?;
            if op.is_arithmetic() {
                Ok(match (l, r) {
                    (None, _) | (_, None) => None,
                    (Some(DataType::Int), Some(DataType::Int)) if *op != BinaryOp::Div => {
                        Some(DataType::Int)
                    }
                    _ => Some(DataType::Float),
                })
            } else {
                Ok(Some(DataType::Int))
            }
        }
        Expr::Unary { op, expr } => {
            let inner = expr_type(expr)?;
            match op {
                UnaryOp::Neg => Ok(match inner {
                    Some(DataType::Int) => Some(DataType::Int),
                    None => None,
                    _ => Some(DataType::Float),
                }),
                UnaryOp::Not => Ok(Some(DataType::Int)),
            }
        }
        Expr::Paren(inner) => expr_type(inner),
        Expr::Row(items) => {
            for item in *items {
                expr_type(item)?;
            }
            Ok(None)
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            expr_type(expr)?;
            expr_type(low)?;
            expr_type(high)?;
            Ok(Some(DataType::Int))
        }
        Expr::InList { expr, list, .. } => {
            expr_type(expr)?;
            for item in *list {
                expr_type(item)?;
            }
            Ok(Some(DataType::Int))
        }
        Expr::IsNull { expr, .. } | Expr::IsTruth { expr, .. } => {
            expr_type(expr)?;
            Ok(Some(DataType::Int))
        }
        Expr::Like { expr, pattern, .. } => {
            expr_type(expr)?;
            expr_type(pattern)?;
            Ok(Some(DataType::Int))
        }
        Expr::Function(call) => {
            for arg in call.args {
                expr_type(arg)?;
            }
            Ok(None)
        }
        Expr::Aggregate(call) => {
            for arg in call.args {
                expr_type(arg)?;
            }
            Ok(None)
        }
        Expr::Subquery(_) | Expr::ParamMarker => Ok(None),
    }
}
