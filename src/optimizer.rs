//! # Optimizer Entry Point
//!
//! `optimize()` runs the whole pipeline over one statement:
//!
//! ```text
//! validate -> supported? -> bind -> infer -> fold
//!          -> build plan -> enumerate alternatives
//!          -> refine + cost each -> cheapest plan
//! ```
//!
//! The catalog is a read-only snapshot and the arena is owned by the
//! call frame, so planning is single-threaded per statement and
//! re-entrant across statements. Ties between equally cheap plans keep
//! the earliest candidate, the original table-scan plan first.

use crate::analyze::{check_types, fold_select, supported, validate, Binder, BoundSelect};
use crate::ast::Statement;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::plan::{alternatives, estimate_cost, refine, Plan, PlanBuilder};
use crate::session::SessionContext;
use bumpalo::Bump;
use tracing::debug;

pub struct Optimizer<'a> {
    catalog: &'a Catalog,
    session: &'a SessionContext,
    arena: &'a Bump,
}

impl<'a> Optimizer<'a> {
    pub fn new(catalog: &'a Catalog, session: &'a SessionContext, arena: &'a Bump) -> Self {
        Self {
            catalog,
            session,
            arena,
        }
    }

    pub fn optimize(&self, stmt: &'a Statement<'a>) -> Result<Plan<'a>> {
        validate(stmt)?;
        if !supported(stmt) {
            return Err(Error::Unsupported);
        }
        let Statement::Select(select) = stmt else {
            unreachable!("support checker admits SELECT statements only");
        };

        let binder = Binder::new(self.catalog, self.session, self.arena);
        let bound = binder.bind_select(select)?;
        check_types(bound.stmt)?;
        let bound = BoundSelect {
            stmt: fold_select(self.arena, bound.stmt),
            table: bound.table,
        };

        let plan = PlanBuilder::build(&bound)?;
        let candidates = alternatives(&plan);

        let mut best = refine(plan, self.arena)?;
        let mut best_cost = estimate_cost(&best);
        debug!(cost = best_cost, plan = %best, "costed original plan");

        for candidate in candidates {
            let candidate = refine(candidate, self.arena)?;
            let cost = estimate_cost(&candidate);
            debug!(cost, plan = %candidate, "costed alternative");
            if cost < best_cost {
                best_cost = cost;
                best = candidate;
            }
        }

        debug!(cost = best_cost, plan = %best, "chose plan");
        Ok(best)
    }
}

/// Plans one statement against a catalog snapshot. The snapshot and the
/// arena must outlive the returned plan, which borrows from both.
pub fn optimize<'a>(
    catalog: &'a Catalog,
    session: &'a SessionContext,
    arena: &'a Bump,
    stmt: &'a Statement<'a>,
) -> Result<Plan<'a>> {
    Optimizer::new(catalog, session, arena).optimize(stmt)
}
