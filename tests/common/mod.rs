//! Shared fixtures: programmatic AST construction and the mock catalog
//! the planner scenarios run against.

#![allow(dead_code)]

use bumpalo::Bump;
use planck::ast::{
    BinaryOp, ColumnRef, Expr, FromClause, LimitClause, LockMode, OrderByItem, SelectField,
    SelectStmt, Statement, TableRef, LIKE_ESCAPE,
};
use planck::catalog::{Catalog, ColumnDef, IndexDef, TableDef};
use planck::plan::Plan;
use planck::types::{DataType, Value};

/// Schema `test` with the planner scenario tables:
///
/// - `t(a, b, c, d)` with indexes `a(a)`, `b(b)`, `c_d(c, d)`
/// - `p(id, v)` with integer primary key `id` and no secondary indexes
pub fn mock_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.create_schema("test").unwrap();
    catalog
        .create_table(
            "test",
            TableDef::new(
                "t",
                vec![
                    ColumnDef::new("a", DataType::Int),
                    ColumnDef::new("b", DataType::Int),
                    ColumnDef::new("c", DataType::Int),
                    ColumnDef::new("d", DataType::Int),
                ],
            )
            .with_index(IndexDef::new("a", vec!["a"], false))
            .with_index(IndexDef::new("b", vec!["b"], false))
            .with_index(IndexDef::new("c_d", vec!["c", "d"], false)),
        )
        .unwrap();
    catalog
        .create_table(
            "test",
            TableDef::new(
                "p",
                vec![
                    ColumnDef::new("id", DataType::Int),
                    ColumnDef::new("v", DataType::Text),
                ],
            )
            .with_primary_key("id"),
        )
        .unwrap();
    catalog
}

pub fn col<'a>(arena: &'a Bump, name: &'a str) -> &'a Expr<'a> {
    arena.alloc(Expr::Column(ColumnRef {
        schema: None,
        table: None,
        column: name,
        binding: None,
    }))
}

pub fn int(arena: &Bump, n: i64) -> &Expr<'_> {
    arena.alloc(Expr::Value(Value::Int(n)))
}

pub fn text<'a>(arena: &'a Bump, s: &'a str) -> &'a Expr<'a> {
    arena.alloc(Expr::Value(Value::Text(s)))
}

pub fn null(arena: &Bump) -> &Expr<'_> {
    arena.alloc(Expr::Value(Value::Null))
}

pub fn binary<'a>(
    arena: &'a Bump,
    op: BinaryOp,
    left: &'a Expr<'a>,
    right: &'a Expr<'a>,
) -> &'a Expr<'a> {
    arena.alloc(Expr::Binary { op, left, right })
}

pub fn and<'a>(arena: &'a Bump, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
    binary(arena, BinaryOp::And, left, right)
}

pub fn or<'a>(arena: &'a Bump, left: &'a Expr<'a>, right: &'a Expr<'a>) -> &'a Expr<'a> {
    binary(arena, BinaryOp::Or, left, right)
}

pub fn paren<'a>(arena: &'a Bump, inner: &'a Expr<'a>) -> &'a Expr<'a> {
    arena.alloc(Expr::Paren(inner))
}

pub fn between<'a>(
    arena: &'a Bump,
    expr: &'a Expr<'a>,
    low: &'a Expr<'a>,
    high: &'a Expr<'a>,
    negated: bool,
) -> &'a Expr<'a> {
    arena.alloc(Expr::Between {
        expr,
        negated,
        low,
        high,
    })
}

pub fn in_list<'a>(
    arena: &'a Bump,
    expr: &'a Expr<'a>,
    items: &[&'a Expr<'a>],
    negated: bool,
) -> &'a Expr<'a> {
    arena.alloc(Expr::InList {
        expr,
        negated,
        list: arena.alloc_slice_copy(items),
    })
}

pub fn is_null<'a>(arena: &'a Bump, expr: &'a Expr<'a>, negated: bool) -> &'a Expr<'a> {
    arena.alloc(Expr::IsNull { expr, negated })
}

pub fn is_truth<'a>(
    arena: &'a Bump,
    expr: &'a Expr<'a>,
    truth: bool,
    negated: bool,
) -> &'a Expr<'a> {
    arena.alloc(Expr::IsTruth {
        expr,
        truth,
        negated,
    })
}

pub fn like<'a>(arena: &'a Bump, expr: &'a Expr<'a>, pattern: &'a str) -> &'a Expr<'a> {
    arena.alloc(Expr::Like {
        expr,
        negated: false,
        pattern: text(arena, pattern),
        escape: LIKE_ESCAPE,
    })
}

pub struct SelectBuilder<'a> {
    arena: &'a Bump,
    distinct: bool,
    fields: Vec<SelectField<'a>>,
    from: Option<&'a FromClause<'a>>,
    where_clause: Option<&'a Expr<'a>>,
    group_by: Vec<&'a Expr<'a>>,
    order_by: Vec<OrderByItem<'a>>,
    limit: Option<LimitClause>,
    lock: Option<LockMode>,
}

impl<'a> SelectBuilder<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self {
            arena,
            distinct: false,
            fields: Vec::new(),
            from: None,
            where_clause: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            lock: None,
        }
    }

    pub fn star(mut self) -> Self {
        self.fields.push(SelectField::Wildcard { table: None });
        self
    }

    pub fn field(mut self, expr: &'a Expr<'a>) -> Self {
        self.fields.push(SelectField::Expr { expr, alias: None });
        self
    }

    pub fn from(mut self, table: &'a str) -> Self {
        self.from = Some(self.arena.alloc(FromClause::Table(TableRef {
            schema: None,
            name: table,
            alias: None,
        })));
        self
    }

    pub fn from_schema(mut self, schema: &'a str, table: &'a str) -> Self {
        self.from = Some(self.arena.alloc(FromClause::Table(TableRef {
            schema: Some(schema),
            name: table,
            alias: None,
        })));
        self
    }

    pub fn filter(mut self, expr: &'a Expr<'a>) -> Self {
        self.where_clause = Some(expr);
        self
    }

    pub fn group(mut self, expr: &'a Expr<'a>) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn order_by(mut self, expr: &'a Expr<'a>, desc: bool) -> Self {
        self.order_by.push(OrderByItem { expr, desc });
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(LimitClause { offset: 0, count });
        self
    }

    pub fn for_update(mut self) -> Self {
        self.lock = Some(LockMode::ForUpdate);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn build(self) -> &'a Statement<'a> {
        let stmt = self.arena.alloc(SelectStmt {
            distinct: self.distinct,
            fields: self.arena.alloc_slice_copy(&self.fields),
            from: self.from,
            where_clause: self.where_clause,
            group_by: self.arena.alloc_slice_copy(&self.group_by),
            having: None,
            order_by: self.arena.alloc_slice_copy(&self.order_by),
            limit: self.limit,
            lock: self.lock,
        });
        self.arena.alloc(Statement::Select(stmt))
    }
}

/// String form of the leaf scan's ranges, e.g. `[1 1]` or
/// `[<nil> <nil>] [1 1]`.
pub fn leaf_ranges(plan: &Plan) -> String {
    match plan.leaf() {
        Plan::IndexScan(scan) => scan
            .ranges
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        Plan::TableScan(scan) => scan
            .ranges
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        other => panic!("plan has no scan leaf: {other}"),
    }
}
