//! # Plan Refinement
//!
//! Walks a plan chain once and specializes it against its leaf access
//! path:
//!
//! - Filter conditions that reference the leaf's key columns (the index
//!   prefix, or the table's integer handle column) are folded into the
//!   scan's range set. Exactly-absorbed conjuncts leave the filter; a
//!   prefix LIKE narrows the scan but stays in the filter because its
//!   range is a superset of the predicate. A filter with nothing left is
//!   removed from the chain.
//! - A Sort whose by-items the leaf already yields in order (all
//!   ascending, bare columns, matching the index prefix or the handle
//!   column, with only order-preserving nodes in between) is removed.
//!
//! Refinement is idempotent: a second pass finds nothing to absorb and
//! rebuilds the same ranges.

use crate::ast::{Expr, OrderByItem};
use crate::error::Result;
use crate::plan::range::{
    append_index_ranges, build_index_ranges, full_range, handle_ranges_from_points, intersection,
    RangeBuilder,
};
use crate::plan::Plan;
use crate::types::Value;
use bumpalo::Bump;
use tracing::trace;

pub fn refine<'a>(plan: Plan<'a>, arena: &'a Bump) -> Result<Plan<'a>> {
    match plan {
        Plan::Sort(mut sort) => {
            let src = refine(*sort.src, arena)?;
            if order_satisfied(&src, sort.by_items) {
                trace!(plan = %src, "sort satisfied by leaf order, removing");
                Ok(src)
            } else {
                sort.src = Box::new(src);
                Ok(Plan::Sort(sort))
            }
        }
        Plan::Filter(mut filter) => {
            let mut src = refine(*filter.src, arena)?;
            let conditions = std::mem::take(&mut filter.conditions);
            let remaining = push_conditions(&mut src, conditions, arena)?;
            if remaining.is_empty() {
                trace!(plan = %src, "all conditions absorbed, removing filter");
                Ok(src)
            } else {
                filter.src = Box::new(src);
                filter.conditions = remaining;
                Ok(Plan::Filter(filter))
            }
        }
        Plan::SelectLock(mut lock) => {
            lock.src = Box::new(refine(*lock.src, arena)?);
            Ok(Plan::SelectLock(lock))
        }
        Plan::SelectFields(mut fields) => {
            if let Some(src) = fields.src.take() {
                fields.src = Some(Box::new(refine(*src, arena)?));
            }
            Ok(Plan::SelectFields(fields))
        }
        Plan::Limit(mut limit) => {
            limit.src = Box::new(refine(*limit.src, arena)?);
            Ok(Plan::Limit(limit))
        }
        leaf @ (Plan::TableScan(_) | Plan::IndexScan(_)) => Ok(leaf),
    }
}

/// Absorbs what the leaf can use and returns the conditions the filter
/// must keep.
fn push_conditions<'a>(
    scan: &mut Plan<'a>,
    conditions: Vec<&'a Expr<'a>>,
    arena: &'a Bump,
) -> Result<Vec<&'a Expr<'a>>> {
    let mut used = vec![false; conditions.len()];
    let mut approx = vec![false; conditions.len()];

    match scan {
        Plan::IndexScan(is) => {
            let index = is.index;
            let builder = RangeBuilder::new(arena);
            for (key_pos, key_col) in index.columns().iter().enumerate() {
                // A later key column only narrows point ranges; past a
                // strict interval its conditions must stay in the
                // filter.
                if key_pos > 0 && !is.ranges.iter().all(|r| r.is_point()) {
                    break;
                }
                let checker = ConditionChecker {
                    column: key_col.name(),
                };
                let matched: Vec<usize> = (0..conditions.len())
                    .filter(|&i| !used[i] && checker.check(conditions[i]))
                    .collect();
                if matched.is_empty() {
                    // Later key columns cannot narrow the scan without
                    // a range on this one.
                    break;
                }

                // If any condition on this column is approximate, every
                // one of them stays in the filter; a later pass then
                // rebuilds the same intersection from the same inputs.
                let any_approx = matched.iter().any(|&i| is_approximate(conditions[i]));
                let mut points = full_range();
                for &i in &matched {
                    points = intersection(points, builder.build(conditions[i])?)?;
                    used[i] = true;
                    approx[i] = any_approx;
                }

                if key_pos == 0 {
                    is.ranges = build_index_ranges(&points);
                } else {
                    is.ranges = append_index_ranges(std::mem::take(&mut is.ranges), &points);
                }
                trace!(
                    index = index.name(),
                    column = key_col.name(),
                    ranges = is.ranges.len(),
                    "folded conditions into index ranges"
                );
            }
        }
        Plan::TableScan(ts) => {
            let Some(handle) = ts.table.handle_column() else {
                return Ok(conditions);
            };
            let checker = ConditionChecker { column: handle };
            let matched: Vec<usize> = (0..conditions.len())
                .filter(|&i| checker.check(conditions[i]))
                .collect();
            if matched.is_empty() {
                return Ok(conditions);
            }

            let builder = RangeBuilder::new(arena);
            let mut points = full_range();
            for &i in &matched {
                points = intersection(points, builder.build(conditions[i])?)?;
            }
            match handle_ranges_from_points(&points) {
                Some(ranges) => {
                    trace!(
                        table = ts.table.name(),
                        ranges = ranges.len(),
                        "folded conditions into handle ranges"
                    );
                    ts.ranges = ranges;
                    let any_approx = matched.iter().any(|&i| is_approximate(conditions[i]));
                    for &i in &matched {
                        used[i] = true;
                        approx[i] = any_approx;
                    }
                }
                // A bound did not convert to a handle; scan in full and
                // keep every condition.
                None => return Ok(conditions),
            }
        }
        _ => return Ok(conditions),
    }

    Ok(conditions
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !used[*i] || approx[*i])
        .map(|(_, c)| c)
        .collect())
}

/// Decides whether one conjunct can become a range over `column`.
struct ConditionChecker<'c> {
    column: &'c str,
}

impl ConditionChecker<'_> {
    fn check(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Paren(inner) => self.check(inner),
            Expr::Binary { op, left, right } => {
                if op.is_logical() {
                    return self.check(left) && self.check(right);
                }
                if !op.is_comparison() {
                    return false;
                }
                (self.matches_column(left) && right.value().is_some())
                    || (self.matches_column(right) && left.value().is_some())
            }
            Expr::InList {
                negated,
                expr,
                list,
            } => {
                !negated && self.matches_column(expr) && list.iter().all(|e| e.value().is_some())
            }
            Expr::Between {
                expr, low, high, ..
            } => self.matches_column(expr) && low.value().is_some() && high.value().is_some(),
            Expr::IsNull { expr, .. } => self.matches_column(expr),
            Expr::IsTruth { expr, .. } => self.matches_column(expr),
            Expr::Like {
                negated,
                expr,
                pattern,
                escape,
            } => !negated && self.matches_column(expr) && like_prefix_usable(pattern, *escape),
            Expr::Column(c) => c.column.eq_ignore_ascii_case(self.column),
            _ => false,
        }
    }

    fn matches_column(&self, expr: &Expr) -> bool {
        expr.column_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(self.column))
    }
}

/// A LIKE pattern is range-worthy only with a non-empty literal prefix.
fn like_prefix_usable(pattern: &Expr, escape: u8) -> bool {
    let bytes: &[u8] = match pattern.value() {
        Some(Value::Text(s)) => s.as_bytes(),
        Some(Value::Bytes(b)) => b,
        _ => return false,
    };
    match bytes.first() {
        None => false,
        Some(&b) if b == b'%' || b == b'_' => false,
        Some(&b) if b == escape => bytes.len() > 1,
        Some(_) => true,
    }
}

/// A conjunct whose range over-approximates the predicate must stay in
/// the filter even after narrowing the scan.
fn is_approximate(expr: &Expr) -> bool {
    match expr {
        Expr::Like { .. } => true,
        Expr::Paren(inner) => is_approximate(inner),
        Expr::Binary { op, left, right } if op.is_logical() => {
            is_approximate(left) || is_approximate(right)
        }
        _ => false,
    }
}

/// True when the chain below a Sort already yields rows in the requested
/// order.
fn order_satisfied(src: &Plan, by_items: &[OrderByItem]) -> bool {
    if by_items.is_empty() {
        return false;
    }
    let mut columns = Vec::with_capacity(by_items.len());
    for item in by_items {
        if item.desc {
            return false;
        }
        match item.expr.column_name() {
            Some(name) => columns.push(name),
            None => return false,
        }
    }

    let mut node = src;
    loop {
        match node {
            Plan::TableScan(ts) => {
                return columns.len() == 1
                    && ts
                        .table
                        .handle_column()
                        .is_some_and(|h| h.eq_ignore_ascii_case(columns[0]));
            }
            Plan::IndexScan(is) => {
                let key = is.index.columns();
                return key.len() >= columns.len()
                    && columns
                        .iter()
                        .zip(key)
                        .all(|(c, k)| k.name().eq_ignore_ascii_case(c));
            }
            Plan::Filter(_) | Plan::SelectFields(_) | Plan::SelectLock(_) => match node.src() {
                Some(inner) => node = inner,
                None => return false,
            },
            // Another blocking or truncating node in between keeps the
            // sort.
            Plan::Sort(_) | Plan::Limit(_) => return false,
        }
    }
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

    #[test]
    fn test_checker_accepts_comparison_against_literal() {
        let col = column("a");
        let one = Expr::Value(Value::Int(1));
        let eq = Expr::Binary {
            op: BinaryOp::Eq,
            left: &col,
            right: &one,
        };
        let checker = ConditionChecker { column: "a" };
        assert!(checker.check(&eq));
        let other = ConditionChecker { column: "b" };
        assert!(!other.check(&eq));
    }

    #[test]
    fn test_checker_rejects_column_to_column() {
        let a = column("a");
        let b = column("b");
        let eq = Expr::Binary {
            op: BinaryOp::Eq,
            left: &a,
            right: &b,
        };
        let checker = ConditionChecker { column: "a" };
        assert!(!checker.check(&eq));
    }

    #[test]
    fn test_checker_requires_same_column_through_or() {
        let a = column("a");
        let one = Expr::Value(Value::Int(1));
        let two = Expr::Value(Value::Int(2));
        let left = Expr::Binary {
            op: BinaryOp::Gt,
            left: &a,
            right: &one,
        };
        let b = column("b");
        let right_same = Expr::Binary {
            op: BinaryOp::Lt,
            left: &a,
            right: &two,
        };
        let right_other = Expr::Binary {
            op: BinaryOp::Lt,
            left: &b,
            right: &two,
        };
        let same = Expr::Binary {
            op: BinaryOp::Or,
            left: &left,
            right: &right_same,
        };
        let mixed = Expr::Binary {
            op: BinaryOp::Or,
            left: &left,
            right: &right_other,
        };
        let checker = ConditionChecker { column: "a" };
        assert!(checker.check(&same));
        assert!(!checker.check(&mixed));
    }

    #[test]
    fn test_like_prefix_usability() {
        let abc = Expr::Value(Value::Text("abc%"));
        let bare = Expr::Value(Value::Text("%abc"));
        let underscore = Expr::Value(Value::Text("_bc"));
        let escaped = Expr::Value(Value::Text("\\%a"));
        assert!(like_prefix_usable(&abc, b'\\'));
        assert!(!like_prefix_usable(&bare, b'\\'));
        assert!(!like_prefix_usable(&underscore, b'\\'));
        assert!(like_prefix_usable(&escaped, b'\\'));
    }

    #[test]
    fn test_approximate_marks_like_only() {
        let col = column("a");
        let pat = Expr::Value(Value::Text("abc%"));
        let like = Expr::Like {
            expr: &col,
            negated: false,
            pattern: &pat,
            escape: b'\\',
        };
        let one = Expr::Value(Value::Int(1));
        let eq = Expr::Binary {
            op: BinaryOp::Eq,
            left: &col,
            right: &one,
        };
        assert!(is_approximate(&like));
        assert!(!is_approximate(&eq));
    }
}
