//! # planck - SQL Query Planner Core
//!
//! planck turns a parsed single-table `SELECT` plus a catalog snapshot
//! into the cheapest executable plan under a heuristic cost model. It is
//! the planning tier of a SQL engine: the parser hands it an AST, the
//! storage engine receives scan ranges back.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bumpalo::Bump;
//! use planck::{optimize, SessionContext};
//!
//! let arena = Bump::new();
//! let stmt = /* AST allocated into the arena by the parser */;
//! let session = SessionContext::new("app");
//!
//! let plan = optimize(&catalog, &session, &arena, &stmt)?;
//! println!("{plan}"); // e.g. Index(t.c_d)->Fields
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │    Entry Point (optimizer)          │
//! ├─────────────────────────────────────┤
//! │  Analysis (validate / support /     │
//! │   bind / infer / fold)              │
//! ├─────────────────────────────────────┤
//! │  Plan Construction │ Alternatives   │
//! ├────────────────────┼────────────────┤
//! │  Range Analysis    │ Refinement     │
//! ├─────────────────────────────────────┤
//! │         Cost Model & Chooser        │
//! └─────────────────────────────────────┘
//! ```
//!
//! A statement flows top to bottom: semantic validation, the support
//! gate (ineligible statements fall back to the caller's legacy path),
//! name binding against the catalog, type computation, constant folding,
//! then plan construction. The initial table-scan chain is cloned once
//! per index on the table, each clone's leaf swapped for an index scan;
//! the refiner folds filter predicates into scan ranges and drops
//! satisfied filters and sorts; the cost model picks the cheapest
//! survivor.
//!
//! ## Memory Model
//!
//! AST nodes and everything analysis passes derive from them live in a
//! caller-supplied `bumpalo` arena. Plan chains are owned values cloned
//! per alternative, so refining one candidate never aliases another.
//! The catalog is an immutable snapshot shared by reference; planning
//! performs no interior mutation anywhere, which makes concurrent
//! planning over one snapshot safe.
//!
//! ## Scope
//!
//! Single-table SELECT statements only. Joins, subqueries, aggregation,
//! GROUP BY, DISTINCT and parameter markers are rejected up front by the
//! support checker (`Error::Unsupported`), not planned badly.
//!
//! ## Module Overview
//!
//! - [`ast`]: arena-allocated SELECT AST input model
//! - [`catalog`]: schema snapshot (tables, columns, indexes, ids)
//! - [`analyze`]: validation, support gate, binding, typing, folding
//! - [`plan`]: plan nodes, range algebra, builder, alternatives,
//!   refinement, cost model
//! - [`optimizer`]: the `optimize()` pipeline
//! - [`session`]: per-connection context
//! - [`error`]: typed errors with MySQL-compatible codes

pub mod analyze;
pub mod ast;
pub mod catalog;
pub mod error;
pub mod optimizer;
pub mod plan;
pub mod session;
pub mod types;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use optimizer::{optimize, Optimizer};
pub use plan::Plan;
pub use session::SessionContext;
