//! # Plan Trees
//!
//! Typed plan nodes for a single-table SELECT, chained leaf-to-root:
//!
//! ```text
//! TableScan|IndexScan -> Filter -> SelectLock -> SelectFields -> Sort -> Limit
//! ```
//!
//! Every non-leaf node owns exactly one upstream source, so a plan is a
//! linear chain with unique tree-shaped ownership: alternatives clone a
//! chain, the refiner mutates its own copy in place, and losers are
//! dropped wholesale. Expression and catalog references stay borrowed —
//! cloning a chain copies range vectors and condition lists, nothing
//! deeper.
//!
//! `explain()` renders the chain the way the planner tests read it, e.g.
//! `Table(t)->Filter->Fields` or `Index(t.c_d)->Fields`.

pub mod alternatives;
pub mod build;
pub mod cost;
pub mod range;
pub mod refine;

pub use alternatives::alternatives;
pub use build::PlanBuilder;
pub use cost::estimate_cost;
pub use range::{HandleRange, IndexRange, PointValue, RangeBuilder, RangePoint};
pub use refine::refine;

use crate::ast::{Expr, LockMode, OrderByItem, SelectField};
use crate::catalog::{IndexDef, TableDef};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Plan<'a> {
    TableScan(TableScan<'a>),
    IndexScan(IndexScan<'a>),
    Filter(Filter<'a>),
    SelectLock(SelectLock<'a>),
    SelectFields(SelectFields<'a>),
    Sort(Sort<'a>),
    Limit(Limit<'a>),
}

/// Leaf: reads a table in handle order, restricted to `ranges`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableScan<'a> {
    pub table: &'a TableDef,
    pub ranges: Vec<HandleRange>,
}

/// Leaf: reads an index in key order, restricted to `ranges`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexScan<'a> {
    pub table: &'a TableDef,
    pub index: &'a IndexDef,
    pub ranges: Vec<IndexRange<'a>>,
}

/// Keeps rows satisfying the conjunction of `conditions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<'a> {
    pub src: Box<Plan<'a>>,
    pub conditions: Vec<&'a Expr<'a>>,
}

/// Annotates the scan with a row-lock intent (`FOR UPDATE`).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectLock<'a> {
    pub src: Box<Plan<'a>>,
    pub mode: LockMode,
}

/// Projects the field list. `src` is None for a FROM-less SELECT.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectFields<'a> {
    pub src: Option<Box<Plan<'a>>>,
    pub fields: &'a [SelectField<'a>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort<'a> {
    pub src: Box<Plan<'a>>,
    pub by_items: &'a [OrderByItem<'a>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Limit<'a> {
    pub src: Box<Plan<'a>>,
    pub offset: u64,
    pub count: u64,
}

impl<'a> Plan<'a> {
    /// The upstream source, for the node kinds that have one.
    pub fn src(&self) -> Option<&Plan<'a>> {
        match self {
            Plan::TableScan(_) | Plan::IndexScan(_) => None,
            Plan::Filter(f) => Some(&f.src),
            Plan::SelectLock(l) => Some(&l.src),
            Plan::SelectFields(f) => f.src.as_deref(),
            Plan::Sort(s) => Some(&s.src),
            Plan::Limit(l) => Some(&l.src),
        }
    }

    pub fn src_mut(&mut self) -> Option<&mut Plan<'a>> {
        match self {
            Plan::TableScan(_) | Plan::IndexScan(_) => None,
            Plan::Filter(f) => Some(&mut f.src),
            Plan::SelectLock(l) => Some(&mut l.src),
            Plan::SelectFields(f) => f.src.as_deref_mut(),
            Plan::Sort(s) => Some(&mut s.src),
            Plan::Limit(l) => Some(&mut l.src),
        }
    }

    /// The access-path node at the bottom of the chain (`self` for a
    /// chain with no scan).
    pub fn leaf(&self) -> &Plan<'a> {
        let mut node = self;
        while let Some(src) = node.src() {
            node = src;
        }
        node
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Plan::TableScan(_) | Plan::IndexScan(_))
    }

    /// Renders the chain leaf-first: `Table(t)->Filter->Fields`.
    pub fn explain(&self) -> String {
        let name = match self {
            Plan::TableScan(ts) => format!("Table({})", ts.table.name()),
            Plan::IndexScan(is) => format!("Index({}.{})", is.table.name(), is.index.name()),
            Plan::Filter(_) => "Filter".to_string(),
            Plan::SelectLock(_) => "Lock".to_string(),
            Plan::SelectFields(_) => "Fields".to_string(),
            Plan::Sort(_) => "Sort".to_string(),
            Plan::Limit(_) => "Limit".to_string(),
        };
        match self.src() {
            Some(src) => format!("{}->{}", src.explain(), name),
            None => name,
        }
    }
}

impl fmt::Display for Plan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.explain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, TableDef};
    use crate::types::DataType;

    fn table() -> TableDef {
        TableDef::new("t", vec![ColumnDef::new("a", DataType::Int)])
    }

    #[test]
    fn test_explain_chain() {
        let t = table();
        let scan = Plan::TableScan(TableScan {
            table: &t,
            ranges: vec![HandleRange::full()],
        });
        let filter = Plan::Filter(Filter {
            src: Box::new(scan),
            conditions: Vec::new(),
        });
        let fields = Plan::SelectFields(SelectFields {
            src: Some(Box::new(filter)),
            fields: &[],
        });
        assert_eq!(fields.explain(), "Table(t)->Filter->Fields");
        assert!(matches!(fields.leaf(), Plan::TableScan(_)));
    }

    #[test]
    fn test_fieldless_chain() {
        let fields = Plan::SelectFields(SelectFields {
            src: None,
            fields: &[],
        });
        assert_eq!(fields.explain(), "Fields");
        assert!(!fields.is_leaf());
        assert!(std::ptr::eq(fields.leaf(), &fields));
    }
}
