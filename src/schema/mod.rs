//! Reconstruction of the table catalog from the schema table and the rows of each table.

mod catalog;
mod columns;
mod table;

pub use self::{
    catalog::{RowKind, SYSTEM_PREFIX, SchemaCatalog, SchemaEntry, SchemaKind},
    columns::{ColumnDef, ColumnList, DEFAULT_TYPE, parse_columns},
    table::{ColumnStatistics, Row, TableInfo, TableStatistics},
};
