//! # Semantic Analysis Passes
//!
//! Everything that happens between parsing and plan construction, in
//! pipeline order:
//!
//! 1. [`validate`] — structural checks (operand arity, wildcards)
//! 2. [`supported`] — the eligibility gate; a refusal means "fall back",
//!    not "invalid"
//! 3. [`bind`] — resolve the table and annotate column references from
//!    the catalog
//! 4. [`infer`] — compute expression result types
//! 5. [`fold`] — static rewrite: evaluate constant subexpressions
//!
//! Binding and folding rebuild the AST into the arena rather than
//! mutating it; earlier trees simply become unreachable.

pub mod bind;
pub mod fold;
pub mod infer;
pub mod support;
pub mod validate;

pub use bind::{Binder, BoundSelect};
pub use fold::{fold_expr, fold_select};
pub use infer::{check_types, expr_type};
pub use support::supported;
pub use validate::validate;
