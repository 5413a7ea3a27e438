//! # Name Binding
//!
//! Resolves the statement's table against the catalog and rewrites every
//! column reference with its catalog coordinates. The pass rebuilds the
//! expression trees into the arena; the input AST is left untouched.
//!
//! Resolution errors carry the MySQL codes the server expects: unknown
//! schema 1049, unknown table 1146, unknown column 1054, and a stray
//! qualifier 1051.

use crate::ast::{
    ColumnBinding, ColumnRef, Expr, FromClause, OrderByItem, SelectField, SelectStmt,
};
use crate::catalog::{Catalog, TableDef};
use crate::error::{Error, Result};
use crate::session::SessionContext;
use bumpalo::Bump;
use hashbrown::HashMap;

/// A SELECT whose references have been resolved, plus the table it
/// scans (None for a FROM-less statement).
#[derive(Debug, Clone, Copy)]
pub struct BoundSelect<'a> {
    pub stmt: &'a SelectStmt<'a>,
    pub table: Option<&'a TableDef>,
}

pub struct Binder<'a> {
    catalog: &'a Catalog,
    session: &'a SessionContext,
    arena: &'a Bump,
}

struct Scope<'a> {
    table: &'a TableDef,
    /// Alias if the FROM clause declared one, else the table name.
    name: &'a str,
    columns: HashMap<String, usize>,
}

impl<'a> Binder<'a> {
    pub fn new(catalog: &'a Catalog, session: &'a SessionContext, arena: &'a Bump) -> Self {
        Self {
            catalog,
            session,
            arena,
        }
    }

    pub fn bind_select(&self, stmt: &'a SelectStmt<'a>) -> Result<BoundSelect<'a>> {
        let scope = match stmt.from {
            None => None,
            Some(FromClause::Join { .. }) => return Err(Error::Unsupported),
            Some(FromClause::Table(table_ref)) => {
                let schema = table_ref
                    .schema
                    .unwrap_or_else(|| self.session.current_schema());
                let table = self.catalog.resolve_table(schema, table_ref.name)?;
                let columns = table
                    .columns()
                    .iter()
                    .map(|c| (c.name().to_ascii_lowercase(), c.offset()))
                    .collect();
                Some(Scope {
                    table,
                    name: table_ref.alias.unwrap_or(table_ref.name),
                    columns,
                })
            }
        };
        let scope = scope.as_ref();

        let fields = self.bind_fields(scope, stmt.fields)?;
        let where_clause = match stmt.where_clause {
            Some(w) => Some(self.bind_expr(scope, w)?),
            None => None,
        };
        let order_by = self.bind_order_by(scope, stmt.order_by)?;

        let bound = self.arena.alloc(SelectStmt {
            fields,
            where_clause,
            order_by,
            ..*stmt
        });
        Ok(BoundSelect {
            stmt: bound,
            table: scope.map(|s| s.table),
        })
    }

    fn bind_fields(
        &self,
        scope: Option<&Scope<'a>>,
        fields: &'a [SelectField<'a>],
    ) -> Result<&'a [SelectField<'a>]> {
        let mut out = bumpalo::collections::Vec::with_capacity_in(fields.len(), self.arena);
        for field in fields {
            match field {
                SelectField::Wildcard { table: Some(name) } => {
                    let known = scope.is_some_and(|s| s.name.eq_ignore_ascii_case(name));
                    if !known {
                        return Err(Error::BadTable(name.to_string()));
                    }
                    out.push(*field);
                }
                SelectField::Wildcard { table: None } => out.push(*field),
                SelectField::Expr { expr, alias } => out.push(SelectField::Expr {
                    expr: self.bind_expr(scope, expr)?,
                    alias: *alias,
                }),
            }
        }
        Ok(out.into_bump_slice())
    }

    fn bind_order_by(
        &self,
        scope: Option<&Scope<'a>>,
        items: &'a [OrderByItem<'a>],
    ) -> Result<&'a [OrderByItem<'a>]> {
        let mut out = bumpalo::collections::Vec::with_capacity_in(items.len(), self.arena);
        for item in items {
            out.push(OrderByItem {
                expr: self.bind_expr(scope, item.expr)?,
                desc: item.desc,
            });
        }
        Ok(out.into_bump_slice())
    }

    fn bind_expr(
        &self,
        scope: Option<&Scope<'a>>,
        expr: &'a Expr<'a>,
    ) -> Result<&'a Expr<'a>> {
        let bound = match *expr {
            Expr::Column(column) => Expr::Column(ColumnRef {
                binding: Some(self.resolve_column(scope, &column)?),
                ..column
            }),
            Expr::Binary { op, left, right } => Expr::Binary {
                op,
                left: self.bind_expr(scope, left)?,
                right: self.bind_expr(scope, right)?,
            },
            Expr::Unary { op, expr } => Expr::Unary {
                op,
                expr: self.bind_expr(scope, expr)?,
            },
            Expr::Paren(inner) => Expr::Paren(self.bind_expr(scope, inner)?),
            Expr::Row(items) => Expr::Row(self.bind_exprs(scope, items)?),
            Expr::Between {
                expr,
                negated,
                low,
                high,
            } => Expr::Between {
                expr: self.bind_expr(scope, expr)?,
                negated,
                low: self.bind_expr(scope, low)?,
                high: self.bind_expr(scope, high)?,
            },
            Expr::InList {
                expr,
                negated,
                list,
            } => Expr::InList {
                expr: self.bind_expr(scope, expr)?,
                negated,
                list: self.bind_exprs(scope, list)?,
            },
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: self.bind_expr(scope, expr)?,
                negated,
            },
            Expr::IsTruth {
                expr,
                truth,
                negated,
            } => Expr::IsTruth {
                expr: self.bind_expr(scope, expr)?,
                truth,
                negated,
            },
            Expr::Like {
                expr,
                negated,
                pattern,
                escape,
            } => Expr::Like {
                expr: self.bind_expr(scope, expr)?,
                negated,
                pattern: self.bind_expr(scope, pattern)?,
                escape,
            },
            Expr::Function(call) => Expr::Function(crate::ast::FunctionCall {
                name: call.name,
                args: self.bind_exprs(scope, call.args)?,
            }),
            // Rejected by the support checker before binding runs.
            Expr::Aggregate(_) | Expr::Subquery(_) => return Ok(expr),
            Expr::Value(_) | Expr::ParamMarker => return Ok(expr),
        };
        Ok(self.arena.alloc(bound))
    }

    fn bind_exprs(
        &self,
        scope: Option<&Scope<'a>>,
        items: &'a [&'a Expr<'a>],
    ) -> Result<&'a [&'a Expr<'a>]> {
        let mut out = bumpalo::collections::Vec::with_capacity_in(items.len(), self.arena);
        for item in items {
            out.push(self.bind_expr(scope, item)?);
        }
        Ok(out.into_bump_slice())
    }

    fn resolve_column(
        &self,
        scope: Option<&Scope<'a>>,
        column: &ColumnRef<'a>,
    ) -> Result<ColumnBinding> {
        let Some(scope) = scope else {
            return Err(Error::BadField(column.column.to_string()));
        };
        if let Some(qualifier) = column.table {
            if !qualifier.eq_ignore_ascii_case(scope.name) {
                return Err(Error::BadField(format!("{}.{}", qualifier, column.column)));
            }
        }
        let offset = scope
            .columns
            .get(&column.column.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| Error::BadField(column.column.to_string()))?;
        Ok(ColumnBinding {
            table_id: scope.table.id(),
            offset,
            data_type: scope.table.columns()[offset].data_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, TableDef};
    use crate::types::DataType;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.create_schema("test").unwrap();
        catalog
            .create_table(
                "test",
                TableDef::new(
                    "t",
                    vec![
                        ColumnDef::new("a", DataType::Int),
                        ColumnDef::new("b", DataType::Text),
                    ],
                ),
            )
            .unwrap();
        catalog
    }

    fn select_from<'a>(
        arena: &'a Bump,
        table: &'a str,
        where_clause: Option<&'a Expr<'a>>,
    ) -> &'a SelectStmt<'a> {
        let from = arena.alloc(FromClause::Table(crate::ast::TableRef {
            schema: None,
            name: table,
            alias: None,
        }));
        arena.alloc(SelectStmt {
            distinct: false,
            fields: &[],
            from: Some(from),
            where_clause,
            group_by: &[],
            having: None,
            order_by: &[],
            limit: None,
            lock: None,
        })
    }

    #[test]
    fn test_binds_column_offsets() {
        let catalog = catalog();
        let session = SessionContext::new("test");
        let arena = Bump::new();
        let binder = Binder::new(&catalog, &session, &arena);

        let b = arena.alloc(Expr::Column(ColumnRef {
            schema: None,
            table: None,
            column: "B",
            binding: None,
        }));
        let stmt = select_from(&arena, "t", Some(b));
        let bound = binder.bind_select(stmt).unwrap();

        let Some(Expr::Column(c)) = bound.stmt.where_clause else {
            panic!("expected bound column");
        };
        let binding = c.binding.expect("binding filled in");
        assert_eq!(binding.offset, 1);
        assert_eq!(binding.data_type, DataType::Text);
        assert_eq!(bound.table.unwrap().name(), "t");
    }

    #[test]
    fn test_unknown_names_surface_codes() {
        let catalog = catalog();
        let session = SessionContext::new("test");
        let arena = Bump::new();
        let binder = Binder::new(&catalog, &session, &arena);

        let stmt = select_from(&arena, "missing", None);
        assert_eq!(
            binder.bind_select(stmt).unwrap_err(),
            Error::NoSuchTable("missing".to_string())
        );

        let ghost = arena.alloc(Expr::Column(ColumnRef {
            schema: None,
            table: None,
            column: "ghost",
            binding: None,
        }));
        let stmt = select_from(&arena, "t", Some(ghost));
        assert_eq!(
            binder.bind_select(stmt).unwrap_err(),
            Error::BadField("ghost".to_string())
        );

        let mut session = SessionContext::new("test");
        session.set_current_schema("nowhere");
        let binder = Binder::new(&catalog, &session, &arena);
        let stmt = select_from(&arena, "t", None);
        assert_eq!(
            binder.bind_select(stmt).unwrap_err(),
            Error::BadDb("nowhere".to_string())
        );
    }

    #[test]
    fn test_stray_qualifier_is_rejected() {
        let catalog = catalog();
        let session = SessionContext::new("test");
        let arena = Bump::new();
        let binder = Binder::new(&catalog, &session, &arena);

        let qualified = arena.alloc(Expr::Column(ColumnRef {
            schema: None,
            table: Some("u"),
            column: "a",
            binding: None,
        }));
        let stmt = select_from(&arena, "t", Some(qualified));
        assert_eq!(
            binder.bind_select(stmt).unwrap_err(),
            Error::BadField("u.a".to_string())
        );
    }
}
