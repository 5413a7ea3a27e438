//! # Cost Estimation
//!
//! Heuristic bottom-up cost model. Each node yields an estimated output
//! row count, an accumulated scalar cost, and whether rows stream
//! through without materialization — a Sort blocks the pipeline, so a
//! Limit above it cannot cheapen the work already done, while a Limit
//! over a streaming chain scales the chain's cost by the fraction of
//! rows it lets through.
//!
//! Range widths come in four tiers: a point range reads one entry, a
//! double-bounded range a small slice, a half-open range a large slice,
//! and the universal range the whole table. The absolute constants only
//! matter relative to each other.

use crate::plan::range::{HandleRange, IndexRange, PointValue};
use crate::plan::{IndexScan, Plan, TableScan};

#[derive(Debug, Clone, Copy)]
struct CostEstimate {
    rows: f64,
    cost: f64,
    pipelined: bool,
}

/// Scalar cost of a refined plan chain; lower is better.
pub fn estimate_cost(plan: &Plan) -> f64 {
    estimate(plan).cost
}

fn estimate(plan: &Plan) -> CostEstimate {
    match plan {
        Plan::TableScan(ts) => estimate_table_scan(ts),
        Plan::IndexScan(is) => estimate_index_scan(is),
        Plan::Filter(f) => {
            const CPU_COST_PER_ROW: f64 = 0.01;
            const FILTER_SELECTIVITY: f64 = 0.5;

            let src = estimate(&f.src);
            CostEstimate {
                rows: (src.rows * FILTER_SELECTIVITY).max(1.0),
                cost: src.cost + src.rows * CPU_COST_PER_ROW,
                pipelined: src.pipelined,
            }
        }
        Plan::SelectLock(l) => estimate(&l.src),
        Plan::SelectFields(f) => match &f.src {
            Some(src) => estimate(src),
            None => CostEstimate {
                rows: 1.0,
                cost: 0.0,
                pipelined: true,
            },
        },
        Plan::Sort(s) => {
            const SORT_CPU_FACTOR: f64 = 0.5;

            let src = estimate(&s.src);
            let n = src.rows.max(2.0);
            CostEstimate {
                rows: src.rows,
                cost: src.cost + n * n.log2() * SORT_CPU_FACTOR,
                pipelined: false,
            }
        }
        Plan::Limit(l) => {
            let src = estimate(&l.src);
            let cap = l.offset.saturating_add(l.count) as f64;
            let rows = src.rows.min(cap);
            let cost = if src.pipelined && src.rows > 0.0 && rows < src.rows {
                src.cost * (rows / src.rows)
            } else {
                src.cost
            };
            CostEstimate {
                rows,
                cost,
                pipelined: src.pipelined,
            }
        }
    }
}

fn estimate_table_scan(scan: &TableScan) -> CostEstimate {
    const ROW_COST: f64 = 1.0;

    let table_rows = scan.table.approx_row_count() as f64;
    let rows: f64 = scan
        .ranges
        .iter()
        .map(|r| handle_range_rows(r, table_rows))
        .sum::<f64>()
        .min(table_rows);
    CostEstimate {
        rows,
        cost: rows * ROW_COST,
        pipelined: true,
    }
}

fn estimate_index_scan(scan: &IndexScan) -> CostEstimate {
    // Reading through an index touches the index and the row, so a full
    // index sweep must lose to a full table scan.
    const INDEX_ROW_COST: f64 = 1.1;

    let table_rows = scan.table.approx_row_count() as f64;
    let rows: f64 = scan
        .ranges
        .iter()
        .map(|r| index_range_rows(r, table_rows))
        .sum::<f64>()
        .min(table_rows);
    CostEstimate {
        rows,
        cost: rows * INDEX_ROW_COST,
        pipelined: true,
    }
}

fn handle_range_rows(range: &HandleRange, table_rows: f64) -> f64 {
    const HALF_RANGE_RATIO: f64 = 0.4;

    if range.is_full() {
        return table_rows;
    }
    if range.low == i64::MIN || range.high == i64::MAX {
        return (table_rows * HALF_RANGE_RATIO).max(1.0);
    }
    let span = (range.high as i128 - range.low as i128 + 1) as f64;
    span.clamp(1.0, table_rows)
}

fn index_range_rows(range: &IndexRange, table_rows: f64) -> f64 {
    const BOUNDED_RANGE_RATIO: f64 = 0.01;
    const HALF_RANGE_RATIO: f64 = 0.4;

    if range.is_point() {
        return 1.0;
    }
    let low_bounded = matches!(range.low.first(), Some(PointValue::Datum(_)));
    let high_bounded = matches!(range.high.first(), Some(PointValue::Datum(_)));
    let estimate = match (low_bounded, high_bounded) {
        (true, true) => table_rows * BOUNDED_RANGE_RATIO,
        (true, false) | (false, true) => table_rows * HALF_RANGE_RATIO,
        (false, false) => table_rows,
    };
    estimate.max(1.0)
}
