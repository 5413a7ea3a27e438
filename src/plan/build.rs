//! # Initial Plan Construction
//!
//! Lowers a bound SELECT into the fixed chain
//! `TableScan -> Filter -> SelectLock -> SelectFields -> Sort -> Limit`,
//! skipping clauses the statement does not have. The WHERE expression is
//! AND-split into the filter's condition list here; deciding which
//! conditions become scan ranges is the refiner's job.

use crate::analyze::bind::BoundSelect;
use crate::ast::{BinaryOp, Expr};
use crate::error::{Error, Result};
use crate::plan::range::HandleRange;
use crate::plan::{Filter, Limit, Plan, SelectFields, SelectLock, Sort, TableScan};

pub struct PlanBuilder;

impl PlanBuilder {
    pub fn build<'a>(bound: &BoundSelect<'a>) -> Result<Plan<'a>> {
        let stmt = bound.stmt;

        let mut plan = bound.table.map(|table| {
            Plan::TableScan(TableScan {
                table,
                ranges: vec![HandleRange::full()],
            })
        });

        if let Some(where_clause) = stmt.where_clause {
            let Some(src) = plan else {
                // `SELECT 1 WHERE ...` has no scan to filter.
                return Err(Error::Unsupported);
            };
            plan = Some(Plan::Filter(Filter {
                src: Box::new(src),
                conditions: split_where(where_clause),
            }));
        }

        if let Some(mode) = stmt.lock {
            plan = plan.map(|src| {
                Plan::SelectLock(SelectLock {
                    src: Box::new(src),
                    mode,
                })
            });
        }

        let mut plan = Plan::SelectFields(SelectFields {
            src: plan.map(Box::new),
            fields: stmt.fields,
        });

        if !stmt.order_by.is_empty() {
            plan = Plan::Sort(Sort {
                src: Box::new(plan),
                by_items: stmt.order_by,
            });
        }

        if let Some(limit) = stmt.limit {
            plan = Plan::Limit(Limit {
                src: Box::new(plan),
                offset: limit.offset,
                count: limit.count,
            });
        }

        Ok(plan)
    }
}

/// Splits a WHERE expression into its top-level conjuncts.
pub fn split_where<'a>(expr: &'a Expr<'a>) -> Vec<&'a Expr<'a>> {
    let mut conditions = Vec::new();
    collect_conjuncts(expr, &mut conditions);
    conditions
}

fn collect_conjuncts<'a>(expr: &'a Expr<'a>, out: &mut Vec<&'a Expr<'a>>) {
    match expr {
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            collect_conjuncts(left, out);
            collect_conjuncts(right, out);
        }
        _ => out.push(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_split_where_flattens_nested_ands() {
        let a = Expr::Value(Value::Int(1));
        let b = Expr::Value(Value::Int(2));
        let c = Expr::Value(Value::Int(3));
        let ab = Expr::Binary {
            op: BinaryOp::And,
            left: &a,
            right: &b,
        };
        let abc = Expr::Binary {
            op: BinaryOp::And,
            left: &ab,
            right: &c,
        };
        assert_eq!(split_where(&abc).len(), 3);
    }

    #[test]
    fn test_split_where_keeps_or_whole() {
        let a = Expr::Value(Value::Int(1));
        let b = Expr::Value(Value::Int(2));
        let or = Expr::Binary {
            op: BinaryOp::Or,
            left: &a,
            right: &b,
        };
        assert_eq!(split_where(&or).len(), 1);
    }
}
