//! # SELECT Abstract Syntax Tree
//!
//! The input model the planner consumes. A parser (or a test) allocates
//! these nodes in a `bumpalo` arena; every node borrows its children and
//! its identifier strings with the arena's lifetime, so nodes are `Copy`
//! and analysis passes can rebuild subtrees without touching the
//! originals.
//!
//! ## Design
//!
//! - **Arena allocation**: all child links are `&'a` references into one
//!   `Bump`; passes that rewrite the tree (binding, folding) allocate
//!   replacement nodes into the same arena and leave the old ones
//!   unreachable.
//! - **Pre-computed literals**: `Expr::Value` carries the evaluated
//!   [`Value`] directly — the expression evaluator has already folded
//!   literal nodes by the time planning starts, and `Expr::value()` is
//!   the lazy accessor the range builder reads.
//! - **Flat enum dispatch**: passes are `match` statements over `Expr`,
//!   not visitor objects.
//!
//! Statements other than SELECT carry just enough structure for the
//! support checker to bounce them to the caller's fallback path.

use crate::types::{DataType, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statement<'a> {
    Select(&'a SelectStmt<'a>),
    Insert(&'a InsertStmt<'a>),
    Update(&'a UpdateStmt<'a>),
    Delete(&'a DeleteStmt<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectStmt<'a> {
    pub distinct: bool,
    pub fields: &'a [SelectField<'a>],
    pub from: Option<&'a FromClause<'a>>,
    pub where_clause: Option<&'a Expr<'a>>,
    pub group_by: &'a [&'a Expr<'a>],
    pub having: Option<&'a Expr<'a>>,
    pub order_by: &'a [OrderByItem<'a>],
    pub limit: Option<LimitClause>,
    pub lock: Option<LockMode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectField<'a> {
    /// `*` or `t.*`.
    Wildcard { table: Option<&'a str> },
    Expr {
        expr: &'a Expr<'a>,
        alias: Option<&'a str>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitClause {
    pub offset: u64,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    ForUpdate,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FromClause<'a> {
    Table(TableRef<'a>),
    /// Present only so the support checker can reject multi-table
    /// statements; the planner never lowers a join.
    Join {
        left: &'a FromClause<'a>,
        right: &'a FromClause<'a>,
        condition: Option<&'a Expr<'a>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRef<'a> {
    pub schema: Option<&'a str>,
    pub name: &'a str,
    pub alias: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderByItem<'a> {
    pub expr: &'a Expr<'a>,
    pub desc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertStmt<'a> {
    pub table: TableRef<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateStmt<'a> {
    pub table: TableRef<'a>,
    pub where_clause: Option<&'a Expr<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeleteStmt<'a> {
    pub table: TableRef<'a>,
    pub where_clause: Option<&'a Expr<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'a> {
    /// A constant-folded literal.
    Value(Value<'a>),
    Column(ColumnRef<'a>),
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Unary {
        op: UnaryOp,
        expr: &'a Expr<'a>,
    },
    Paren(&'a Expr<'a>),
    Row(&'a [&'a Expr<'a>]),
    Between {
        expr: &'a Expr<'a>,
        negated: bool,
        low: &'a Expr<'a>,
        high: &'a Expr<'a>,
    },
    InList {
        expr: &'a Expr<'a>,
        negated: bool,
        list: &'a [&'a Expr<'a>],
    },
    IsNull {
        expr: &'a Expr<'a>,
        negated: bool,
    },
    /// `IS [NOT] TRUE` / `IS [NOT] FALSE`.
    IsTruth {
        expr: &'a Expr<'a>,
        truth: bool,
        negated: bool,
    },
    Like {
        expr: &'a Expr<'a>,
        negated: bool,
        pattern: &'a Expr<'a>,
        escape: u8,
    },
    Function(FunctionCall<'a>),
    Aggregate(AggregateCall<'a>),
    Subquery(&'a SelectStmt<'a>),
    ParamMarker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnRef<'a> {
    pub schema: Option<&'a str>,
    pub table: Option<&'a str>,
    pub column: &'a str,
    /// Filled in by the binder; `None` until then.
    pub binding: Option<ColumnBinding>,
}

/// Catalog coordinates of a resolved column reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBinding {
    pub table_id: u64,
    pub offset: usize,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    /// The operator that holds after swapping the operands of a
    /// comparison, e.g. `1 < a` means `a > 1`.
    pub fn swapped(&self) -> BinaryOp {
        match self {
            BinaryOp::Lt => BinaryOp::Gt,
            BinaryOp::LtEq => BinaryOp::GtEq,
            BinaryOp::Gt => BinaryOp::Lt,
            BinaryOp::GtEq => BinaryOp::LtEq,
            other => *other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub args: &'a [&'a Expr<'a>],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateCall<'a> {
    pub name: &'a str,
    pub args: &'a [&'a Expr<'a>],
    pub distinct: bool,
}

/// Default LIKE escape byte.
pub const LIKE_ESCAPE: u8 = b'\\';

impl<'a> Expr<'a> {
    /// The pre-computed constant value, if this node is a literal.
    pub fn value(&self) -> Option<Value<'a>> {
        match self {
            Expr::Value(v) => Some(*v),
            Expr::Paren(inner) => inner.value(),
            _ => None,
        }
    }

    /// The referenced column name, if this node is a bare column
    /// reference (possibly parenthesized).
    pub fn column_name(&self) -> Option<&'a str> {
        match self {
            Expr::Column(c) => Some(c.column),
            Expr::Paren(inner) => inner.column_name(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessor_sees_through_parens() {
        let one = Expr::Value(Value::Int(1));
        let wrapped = Expr::Paren(&one);
        assert_eq!(wrapped.value(), Some(Value::Int(1)));
        assert_eq!(wrapped.column_name(), None);
    }

    #[test]
    fn test_swapped_comparison() {
        assert_eq!(BinaryOp::Lt.swapped(), BinaryOp::Gt);
        assert_eq!(BinaryOp::GtEq.swapped(), BinaryOp::LtEq);
        assert_eq!(BinaryOp::Eq.swapped(), BinaryOp::Eq);
    }
}
