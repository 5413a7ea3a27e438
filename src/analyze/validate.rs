//! # AST Validation
//!
//! Post-order semantic checks on the parsed statement: operand column
//! arity and wildcard uniqueness. Children are validated before their
//! parent so the deepest offending node reports first.

use crate::ast::{Expr, FromClause, SelectField, SelectStmt, Statement};
use crate::error::{Error, Result};

pub fn validate(stmt: &Statement) -> Result<()> {
    match stmt {
        Statement::Select(select) => validate_select(select),
        Statement::Update(update) => match update.where_clause {
            Some(w) => validate_expr(w),
            None => Ok(()),
        },
        Statement::Delete(delete) => match delete.where_clause {
            Some(w) => validate_expr(w),
            None => Ok(()),
        },
        Statement::Insert(_) => Ok(()),
    }
}

fn validate_select(stmt: &SelectStmt) -> Result<()> {
    check_field_list(stmt.fields)?;
    if let Some(from) = stmt.from {
        validate_from(from)?;
    }
    if let Some(where_clause) = stmt.where_clause {
        validate_expr(where_clause)?;
    }
    for expr in stmt.group_by {
        validate_expr(expr)?;
        check_one_column(expr)?;
    }
    if let Some(having) = stmt.having {
        validate_expr(having)?;
    }
    for item in stmt.order_by {
        validate_expr(item.expr)?;
        check_one_column(item.expr)?;
    }
    Ok(())
}

fn validate_from(from: &FromClause) -> Result<()> {
    match from {
        FromClause::Table(_) => Ok(()),
        FromClause::Join {
            left,
            right,
            condition,
        } => {
            validate_from(left)?;
            validate_from(right)?;
            match condition {
                Some(c) => validate_expr(c),
                None => Ok(()),
            }
        }
    }
}

fn validate_expr(expr: &Expr) -> Result<()> {
    match expr {
        Expr::Binary { op, left, right } => {
            validate_expr(left)?;
            validate_expr(right)?;
            if op.is_comparison() {
                // Row constructors may only meet comparison operators,
                // and then arity must agree on both sides.
                check_same_columns(&[left, right])
            } else {
                check_one_column(left)?;
                check_one_column(right)
            }
        }
        Expr::Unary { expr, .. } => {
            validate_expr(expr)?;
            check_one_column(expr)
        }
        Expr::Paren(inner) => validate_expr(inner),
        Expr::Row(items) => {
            for item in *items {
                validate_expr(item)?;
            }
            if items.len() < 2 {
                Err(Error::RowColumns)
            } else {
                Ok(())
            }
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            validate_expr(expr)?;
            validate_expr(low)?;
            validate_expr(high)?;
            check_one_column(expr)?;
            check_one_column(low)?;
            check_one_column(high)
        }
        Expr::InList { expr, list, .. } => {
            validate_expr(expr)?;
            for item in *list {
                validate_expr(item)?;
            }
            let mut operands: Vec<&Expr> = Vec::with_capacity(list.len() + 1);
            operands.push(expr);
            operands.extend(list.iter().copied());
            check_same_columns(&operands)
        }
        Expr::IsNull { expr, .. } | Expr::IsTruth { expr, .. } => {
            validate_expr(expr)?;
            check_one_column(expr)
        }
        Expr::Like { expr, pattern, .. } => {
            validate_expr(expr)?;
            validate_expr(pattern)?;
            check_one_column(expr)?;
            check_one_column(pattern)
        }
        Expr::Function(call) => {
            for arg in call.args {
                validate_expr(arg)?;
            }
            Ok(())
        }
        Expr::Aggregate(call) => {
            for arg in call.args {
                validate_expr(arg)?;
            }
            Ok(())
        }
        Expr::Subquery(select) => validate_select(select),
        Expr::Value(_) | Expr::Column(_) | Expr::ParamMarker => Ok(()),
    }
}

/// How many columns an expression stands for: a row constructor its
/// element count, a subquery its field count, anything else one.
fn column_count(expr: &Expr) -> usize {
    match expr {
        Expr::Row(items) => items.len(),
        Expr::Subquery(select) => select.fields.len(),
        _ => 1,
    }
}

fn check_one_column(expr: &Expr) -> Result<()> {
    if column_count(expr) != 1 {
        return Err(Error::OneColumn);
    }
    Ok(())
}

fn check_same_columns(exprs: &[&Expr]) -> Result<()> {
    let Some(first) = exprs.first() else {
        return Ok(());
    };
    let count = column_count(first);
    for expr in &exprs[1..] {
        if column_count(expr) != count {
            return Err(Error::SameColumns);
        }
    }
    Ok(())
}

fn check_field_list(fields: &[SelectField]) -> Result<()> {
    let mut has_wildcard = false;
    for field in fields {
        match field {
            SelectField::Wildcard { table: None } => {
                if has_wildcard {
                    return Err(Error::MultiWildCard);
                }
                has_wildcard = true;
            }
            SelectField::Wildcard { table: Some(_) } => {}
            SelectField::Expr { expr, .. } => {
                validate_expr(expr)?;
                check_one_column(expr)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, ColumnRef};
    use crate::types::Value;

    fn column<'a>(name: &'a str) -> Expr<'a> {
        Expr::Column(ColumnRef {
            schema: None,
            table: None,
            column: name,
            binding: None,
        })
    }

    fn select<'a>(
        fields: &'a [SelectField<'a>],
        where_clause: Option<&'a Expr<'a>>,
    ) -> SelectStmt<'a> {
        SelectStmt {
            distinct: false,
            fields,
            from: None,
            where_clause,
            group_by: &[],
            having: None,
            order_by: &[],
            limit: None,
            lock: None,
        }
    }

    #[test]
    fn test_row_needs_two_columns() {
        let a = column("a");
        let items = [&a];
        let row = Expr::Row(&items);
        assert_eq!(validate_expr(&row), Err(Error::RowColumns));
    }

    #[test]
    fn test_comparison_arity_mismatch() {
        let a = column("a");
        let b = column("b");
        let items = [&a, &b];
        let row = Expr::Row(&items);
        let one = Expr::Value(Value::Int(1));
        let cmp = Expr::Binary {
            op: BinaryOp::Eq,
            left: &row,
            right: &one,
        };
        assert_eq!(validate_expr(&cmp), Err(Error::SameColumns));
    }

    #[test]
    fn test_arithmetic_rejects_rows() {
        let a = column("a");
        let b = column("b");
        let items = [&a, &b];
        let row = Expr::Row(&items);
        let one = Expr::Value(Value::Int(1));
        let add = Expr::Binary {
            op: BinaryOp::Add,
            left: &row,
            right: &one,
        };
        assert_eq!(validate_expr(&add), Err(Error::OneColumn));
    }

    #[test]
    fn test_in_list_arity() {
        let a = column("a");
        let b = column("b");
        let probe_items = [&a, &b];
        let probe = Expr::Row(&probe_items);
        let one = Expr::Value(Value::Int(1));
        let list = [&one];
        let in_list = Expr::InList {
            expr: &probe,
            negated: false,
            list: &list,
        };
        assert_eq!(validate_expr(&in_list), Err(Error::SameColumns));
    }

    #[test]
    fn test_double_wildcard_rejected() {
        let fields = [
            SelectField::Wildcard { table: None },
            SelectField::Wildcard { table: None },
        ];
        let stmt = select(&fields, None);
        assert_eq!(validate_select(&stmt), Err(Error::MultiWildCard));
    }

    #[test]
    fn test_qualified_wildcards_do_not_collide() {
        let fields = [
            SelectField::Wildcard { table: None },
            SelectField::Wildcard { table: Some("t") },
        ];
        let stmt = select(&fields, None);
        assert!(validate_select(&stmt).is_ok());
    }

    #[test]
    fn test_plain_predicate_passes() {
        let a = column("a");
        let one = Expr::Value(Value::Int(1));
        let cmp = Expr::Binary {
            op: BinaryOp::Eq,
            left: &a,
            right: &one,
        };
        let fields = [SelectField::Expr {
            expr: &a,
            alias: None,
        }];
        let stmt = select(&fields, Some(&cmp));
        assert!(validate_select(&stmt).is_ok());
    }
}
