//! # Constant Folding
//!
//! Static rewrite ahead of plan construction: arithmetic over two
//! literal operands is evaluated once here so the range builder and the
//! executor see plain values.
//!
//! ## NULL Propagation
//!
//! | Before | After |
//! |--------|-------|
//! | `1 + 1` | `2` |
//! | `NULL + 1` | `NULL` |
//! | `7 / 0` | `NULL` |
//! | `-(3)` | `-3` |
//!
//! Integer overflow leaves the node unfolded, and string operands are
//! not coerced to numbers at plan time; both cases are the executor's to
//! evaluate. Subtrees without literal arithmetic are returned as-is, not
//! copied.

use crate::ast::{BinaryOp, Expr, FunctionCall, OrderByItem, SelectField, SelectStmt, UnaryOp};
use crate::types::Value;
use bumpalo::Bump;

pub fn fold_select<'a>(arena: &'a Bump, stmt: &'a SelectStmt<'a>) -> &'a SelectStmt<'a> {
    let mut fields = bumpalo::collections::Vec::with_capacity_in(stmt.fields.len(), arena);
    for field in stmt.fields {
        match field {
            SelectField::Expr { expr, alias } => fields.push(SelectField::Expr {
                expr: fold_expr(arena, expr),
                alias: *alias,
            }),
            wildcard => fields.push(*wildcard),
        }
    }

    let mut order_by = bumpalo::collections::Vec::with_capacity_in(stmt.order_by.len(), arena);
    for item in stmt.order_by {
        order_by.push(OrderByItem {
            expr: fold_expr(arena, item.expr),
            desc: item.desc,
        });
    }

    arena.alloc(SelectStmt {
        fields: fields.into_bump_slice(),
        where_clause: stmt.where_clause.map(|w| fold_expr(arena, w)),
        order_by: order_by.into_bump_slice(),
        ..*stmt
    })
}

pub fn fold_expr<'a>(arena: &'a Bump, expr: &'a Expr<'a>) -> &'a Expr<'a> {
    match *expr {
        Expr::Binary { op, left, right } => {
            let l = fold_expr(arena, left);
            let r = fold_expr(arena, right);
            if op.is_arithmetic() {
                if let (Some(a), Some(b)) = (l.value(), r.value()) {
                    if let Some(v) = eval_arithmetic(op, a, b) {
                        return arena.alloc(Expr::Value(v));
                    }
                }
            }
            if std::ptr::eq(l, left) && std::ptr::eq(r, right) {
                expr
            } else {
                arena.alloc(Expr::Binary {
                    op,
                    left: l,
                    right: r,
                })
            }
        }
        Expr::Unary {
            op: UnaryOp::Neg,
            expr: inner,
        } => {
            let folded = fold_expr(arena, inner);
            match folded.value() {
                Some(Value::Null) => arena.alloc(Expr::Value(Value::Null)),
                Some(Value::Int(n)) => match n.checked_neg() {
                    Some(neg) => arena.alloc(Expr::Value(Value::Int(neg))),
                    None => rebuild_unary(arena, expr, inner, folded),
                },
                Some(Value::Float(f)) => arena.alloc(Expr::Value(Value::Float(-f))),
                _ => rebuild_unary(arena, expr, inner, folded),
            }
        }
        Expr::Unary {
            op: UnaryOp::Not,
            expr: inner,
        } => {
            let folded = fold_expr(arena, inner);
            rebuild_unary(arena, expr, inner, folded)
        }
        Expr::Paren(inner) => {
            let folded = fold_expr(arena, inner);
            if std::ptr::eq(folded, inner) {
                expr
            } else {
                arena.alloc(Expr::Paren(folded))
            }
        }
        Expr::Between {
            expr: probe,
            negated,
            low,
            high,
        } => {
            let p = fold_expr(arena, probe);
            let l = fold_expr(arena, low);
            let h = fold_expr(arena, high);
            if std::ptr::eq(p, probe) && std::ptr::eq(l, low) && std::ptr::eq(h, high) {
                expr
            } else {
                arena.alloc(Expr::Between {
                    expr: p,
                    negated,
                    low: l,
                    high: h,
                })
            }
        }
        Expr::InList {
            expr: probe,
            negated,
            list,
        } => {
            let p = fold_expr(arena, probe);
            let mut items = bumpalo::collections::Vec::with_capacity_in(list.len(), arena);
            let mut changed = !std::ptr::eq(p, probe);
            for item in list {
                let folded = fold_expr(arena, item);
                changed |= !std::ptr::eq(folded, *item);
                items.push(folded);
            }
            if changed {
                arena.alloc(Expr::InList {
                    expr: p,
                    negated,
                    list: items.into_bump_slice(),
                })
            } else {
                expr
            }
        }
        Expr::Function(call) => {
            let mut args = bumpalo::collections::Vec::with_capacity_in(call.args.len(), arena);
            let mut changed = false;
            for arg in call.args {
                let folded = fold_expr(arena, arg);
                changed |= !std::ptr::eq(folded, *arg);
                args.push(folded);
            }
            if changed {
                arena.alloc(Expr::Function(FunctionCall {
                    name: call.name,
                    args: args.into_bump_slice(),
                }))
            } else {
                expr
            }
        }
        _ => expr,
    }
}

fn rebuild_unary<'a>(
    arena: &'a Bump,
    original: &'a Expr<'a>,
    inner: &'a Expr<'a>,
    folded: &'a Expr<'a>,
) -> &'a Expr<'a> {
    let Expr::Unary { op, .. } = original else {
        unreachable!("rebuild_unary on non-unary expression");
    };
    if std::ptr::eq(folded, inner) {
        original
    } else {
        arena.alloc(Expr::Unary {
            op: *op,
            expr: folded,
        })
    }
}

fn eval_arithmetic<'a>(op: BinaryOp, a: Value<'a>, b: Value<'a>) -> Option<Value<'a>> {
    if a.is_null() || b.is_null() {
        return Some(Value::Null);
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => match op {
            BinaryOp::Add => x.checked_add(y).map(Value::Int),
            BinaryOp::Sub => x.checked_sub(y).map(Value::Int),
            BinaryOp::Mul => x.checked_mul(y).map(Value::Int),
            // MySQL `/` is exact division; the result leaves the integer
            // domain.
            BinaryOp::Div => {
                if y == 0 {
                    Some(Value::Null)
                } else {
                    Some(Value::Float(x as f64 / y as f64))
                }
            }
            BinaryOp::Mod => {
                if y == 0 {
                    Some(Value::Null)
                } else {
                    x.checked_rem(y).map(Value::Int)
                }
            }
            _ => None,
        },
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let x = to_f64(a);
            let y = to_f64(b);
            match op {
                BinaryOp::Add => Some(Value::Float(x + y)),
                BinaryOp::Sub => Some(Value::Float(x - y)),
                BinaryOp::Mul => Some(Value::Float(x * y)),
                BinaryOp::Div => {
                    if y == 0.0 {
                        Some(Value::Null)
                    } else {
                        Some(Value::Float(x / y))
                    }
                }
                BinaryOp::Mod => {
                    if y == 0.0 {
                        Some(Value::Null)
                    } else {
                        Some(Value::Float(x % y))
                    }
                }
                _ => None,
            }
        }
        // No implicit string-to-number coercion at plan time.
        _ => None,
    }
}

fn to_f64(v: Value) -> f64 {
    match v {
        Value::Int(i) => i as f64,
        Value::Float(f) => f,
        _ => unreachable!("numeric fold over non-numeric value"),
    }
}
