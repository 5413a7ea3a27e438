//! # Access-Path Alternatives
//!
//! For a table-scan-rooted chain, produces one structurally identical
//! chain per index of the scanned table, differing only in the leaf:
//! each alternative's `IndexScan` starts from the universal first-column
//! range and is narrowed later by the refiner. The original plan is not
//! in the returned list; the caller costs it alongside.

use crate::plan::range::IndexRange;
use crate::plan::{Filter, IndexScan, Limit, Plan, SelectFields, SelectLock, Sort};

/// Enumerates the alternative chains for `plan`. The count is exactly
/// the number of indexes on the scanned table; a chain with no scan has
/// no alternatives.
pub fn alternatives<'a>(plan: &Plan<'a>) -> Vec<Plan<'a>> {
    match plan {
        Plan::TableScan(ts) => ts
            .table
            .indexes()
            .iter()
            .map(|index| {
                Plan::IndexScan(IndexScan {
                    table: ts.table,
                    index,
                    ranges: vec![IndexRange::full()],
                })
            })
            .collect(),
        Plan::IndexScan(_) => {
            unreachable!("alternatives are enumerated from table-scan-rooted plans")
        }
        _ => match plan.src() {
            Some(src) => alternatives(src)
                .into_iter()
                .map(|alt| reparent(plan, alt))
                .collect(),
            None => Vec::new(),
        },
    }
}

/// Shallow copy: duplicates the node's own fields and rewires the
/// source.
fn reparent<'a>(node: &Plan<'a>, src: Plan<'a>) -> Plan<'a> {
    match node {
        Plan::Filter(f) => Plan::Filter(Filter {
            src: Box::new(src),
            conditions: f.conditions.clone(),
        }),
        Plan::SelectLock(l) => Plan::SelectLock(SelectLock {
            src: Box::new(src),
            mode: l.mode,
        }),
        Plan::SelectFields(f) => Plan::SelectFields(SelectFields {
            src: Some(Box::new(src)),
            fields: f.fields,
        }),
        Plan::Sort(s) => Plan::Sort(Sort {
            src: Box::new(src),
            by_items: s.by_items,
        }),
        Plan::Limit(l) => Plan::Limit(Limit {
            src: Box::new(src),
            offset: l.offset,
            count: l.count,
        }),
        Plan::TableScan(_) | Plan::IndexScan(_) => {
            unreachable!("leaf plans have no source to rewire")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, IndexDef, TableDef};
    use crate::plan::range::HandleRange;
    use crate::plan::TableScan;
    use crate::types::DataType;

    fn indexed_table() -> TableDef {
        TableDef::new(
            "t",
            vec![
                ColumnDef::new("a", DataType::Int),
                ColumnDef::new("b", DataType::Int),
            ],
        )
        .with_index(IndexDef::new("a", vec!["a"], false))
        .with_index(IndexDef::new("b", vec!["b"], false))
    }

    #[test]
    fn test_one_alternative_per_index() {
        let t = indexed_table();
        let plan = Plan::SelectFields(SelectFields {
            src: Some(Box::new(Plan::TableScan(TableScan {
                table: &t,
                ranges: vec![HandleRange::full()],
            }))),
            fields: &[],
        });

        let alts = alternatives(&plan);
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].explain(), "Index(t.a)->Fields");
        assert_eq!(alts[1].explain(), "Index(t.b)->Fields");
    }

    #[test]
    fn test_alternative_leaf_starts_universal() {
        let t = indexed_table();
        let plan = Plan::TableScan(TableScan {
            table: &t,
            ranges: vec![HandleRange::full()],
        });
        let alts = alternatives(&plan);
        let Plan::IndexScan(scan) = &alts[0] else {
            panic!("expected index scan leaf");
        };
        assert_eq!(scan.ranges, vec![IndexRange::full()]);
    }

    #[test]
    fn test_no_scan_no_alternatives() {
        let plan = Plan::SelectFields(SelectFields {
            src: None,
            fields: &[],
        });
        assert!(alternatives(&plan).is_empty());
    }
}
