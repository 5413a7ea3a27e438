//! # Catalog Snapshot
//!
//! The catalog is the planner's read-only view of schema metadata:
//! schemas by name, each holding tables with their columns and indexes.
//! It is built up front with `create_schema` / `create_table` and then
//! handed to the planner by shared reference; planning never mutates it,
//! so independent statements can plan in parallel against one snapshot.
//!
//! Schema and table names resolve case-sensitively; column names resolve
//! case-insensitively (see [`table::TableDef::column_by_name`]).

pub mod table;

pub use table::{ColumnDef, ColumnId, IndexDef, IndexId, SchemaId, TableDef, TableId};

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Name of the virtual schema the planner refuses to plan against.
pub const INFORMATION_SCHEMA: &str = "information_schema";

#[derive(Debug)]
pub struct SchemaDef {
    id: SchemaId,
    name: String,
    tables: HashMap<String, TableDef>,
}

impl SchemaDef {
    fn new(id: SchemaId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tables: HashMap::new(),
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }
}

#[derive(Debug)]
pub struct Catalog {
    schemas: HashMap<String, SchemaDef>,
    next_schema_id: SchemaId,
    next_table_id: TableId,
    next_column_id: ColumnId,
    next_index_id: IndexId,
}

impl Catalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            schemas: HashMap::new(),
            next_schema_id: 1,
            next_table_id: 1,
            next_column_id: 1,
            next_index_id: 1,
        };

        catalog.schemas.insert(
            INFORMATION_SCHEMA.to_string(),
            SchemaDef::new(0, INFORMATION_SCHEMA),
        );

        catalog
    }

    pub fn schema_exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaDef> {
        self.schemas.get(name)
    }

    pub fn create_schema(&mut self, name: impl Into<String>) -> Result<SchemaId> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(Error::DatabaseExists);
        }

        let id = self.next_schema_id;
        self.next_schema_id += 1;
        self.schemas.insert(name.clone(), SchemaDef::new(id, name));
        Ok(id)
    }

    pub fn drop_schema(&mut self, name: &str) -> Result<()> {
        if name == INFORMATION_SCHEMA {
            return Err(Error::BadDb(name.to_string()));
        }
        if self.schemas.remove(name).is_none() {
            return Err(Error::DbDropExists);
        }
        Ok(())
    }

    /// Registers a table, assigning stable ids to the table, its columns
    /// and its indexes, and resolving index columns to row offsets.
    pub fn create_table(&mut self, schema_name: &str, mut table: TableDef) -> Result<TableId> {
        // Resolve index columns against the table before taking any id.
        let offsets: HashMap<String, usize> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(off, c)| (c.name().to_ascii_lowercase(), off))
            .collect();
        for index in table.indexes() {
            for icol in index.columns() {
                if !offsets.contains_key(&icol.name().to_ascii_lowercase()) {
                    return Err(Error::BadField(icol.name().to_string()));
                }
            }
        }

        let schema = self
            .schemas
            .get_mut(schema_name)
            .ok_or_else(|| Error::BadDb(schema_name.to_string()))?;
        if schema.tables.contains_key(table.name()) {
            return Err(Error::TableExists);
        }

        let table_id = self.next_table_id;
        self.next_table_id += 1;
        table.assign(table_id);

        for (offset, column) in table.columns_mut().iter_mut().enumerate() {
            column.assign(self.next_column_id, offset);
            self.next_column_id += 1;
        }

        for index in table.indexes_mut() {
            index.assign(self.next_index_id);
            self.next_index_id += 1;
            for pos in 0..index.columns().len() {
                let offset = offsets[&index.columns()[pos].name().to_ascii_lowercase()];
                index.set_column_offset(pos, offset);
            }
        }

        let name = table.name().to_string();
        schema.tables.insert(name, table);
        Ok(table_id)
    }

    pub fn drop_table(&mut self, schema_name: &str, table_name: &str) -> Result<()> {
        let schema = self
            .schemas
            .get_mut(schema_name)
            .ok_or_else(|| Error::BadDb(schema_name.to_string()))?;
        if schema.tables.remove(table_name).is_none() {
            return Err(Error::BadTable(table_name.to_string()));
        }
        Ok(())
    }

    /// Looks a table up in the given schema. `BadDb` if the schema is
    /// unknown, `NoSuchTable` if the table is.
    pub fn resolve_table(&self, schema_name: &str, table_name: &str) -> Result<&TableDef> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| Error::BadDb(schema_name.to_string()))?;
        schema
            .table(table_name)
            .ok_or_else(|| Error::NoSuchTable(table_name.to_string()))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn demo_table() -> TableDef {
        TableDef::new(
            "users",
            vec![
                ColumnDef::new("id", DataType::Int),
                ColumnDef::new("email", DataType::Text),
            ],
        )
        .with_primary_key("id")
        .with_index(IndexDef::new("email", vec!["email"], true))
    }

    #[test]
    fn test_ids_are_assigned_on_create() {
        let mut catalog = Catalog::new();
        catalog.create_schema("app").unwrap();
        catalog.create_table("app", demo_table()).unwrap();

        let table = catalog.resolve_table("app", "users").unwrap();
        assert!(table.id() > 0);
        assert!(table.columns().iter().all(|c| c.id() > 0));
        assert_eq!(table.columns()[1].offset(), 1);
        assert!(table.indexes()[0].id() > 0);
        assert_eq!(table.indexes()[0].columns()[0].offset(), 1);
    }

    #[test]
    fn test_duplicate_schema_and_table() {
        let mut catalog = Catalog::new();
        catalog.create_schema("app").unwrap();
        assert_eq!(catalog.create_schema("app"), Err(Error::DatabaseExists));

        catalog.create_table("app", demo_table()).unwrap();
        assert_eq!(
            catalog.create_table("app", demo_table()),
            Err(Error::TableExists)
        );
    }

    #[test]
    fn test_resolution_errors() {
        let mut catalog = Catalog::new();
        catalog.create_schema("app").unwrap();

        assert_eq!(
            catalog.resolve_table("nope", "users"),
            Err(Error::BadDb("nope".to_string()))
        );
        assert_eq!(
            catalog.resolve_table("app", "users"),
            Err(Error::NoSuchTable("users".to_string()))
        );
    }

    #[test]
    fn test_index_over_unknown_column_is_rejected() {
        let mut catalog = Catalog::new();
        catalog.create_schema("app").unwrap();
        let bad = TableDef::new("t", vec![ColumnDef::new("a", DataType::Int)])
            .with_index(IndexDef::new("ghost", vec!["ghost"], false));
        assert_eq!(
            catalog.create_table("app", bad),
            Err(Error::BadField("ghost".to_string()))
        );
    }

    #[test]
    fn test_information_schema_is_seeded_and_protected() {
        let mut catalog = Catalog::new();
        assert!(catalog.schema_exists(INFORMATION_SCHEMA));
        assert!(catalog.drop_schema(INFORMATION_SCHEMA).is_err());
        assert_eq!(catalog.drop_schema("missing"), Err(Error::DbDropExists));
    }
}
