use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::table::{Row, TableInfo};
use crate::record::Record;

/// Prefix of the names reserved for SQLite's internal tables.
pub const SYSTEM_PREFIX: &str = "sqlite_";

/// Type of object described by a schema row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaKind {
    Table,
    Index,
    View,
    Trigger,
    Other(String),
}

impl From<&str> for SchemaKind {
    fn from(kind: &str) -> Self {
        match kind {
            "table" => Self::Table,
            "index" => Self::Index,
            "view" => Self::View,
            "trigger" => Self::Trigger,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One row of the schema table: `(type, name, tbl_name, rootpage, sql)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaEntry {
    pub kind: SchemaKind,
    pub name: String,
    /// Table the object belongs to. Tables name themselves.
    pub table_name: String,
    /// 1-based root page. Views and triggers have none.
    pub root_page: Option<u32>,
    /// Defining statement. Missing for automatically created indexes.
    pub sql: Option<String>,
}

impl SchemaEntry {
    pub fn from_record(record: &Record) -> Option<Self> {
        if record.len() < 5 {
            return None;
        }

        Some(Self {
            kind: SchemaKind::from(record.text(0)?),
            name: record.text(1)?.to_string(),
            table_name: record.text(2).unwrap_or_default().to_string(),
            root_page: record
                .integer(3)
                .and_then(|page| u32::try_from(page).ok())
                .filter(|page| *page != 0),
            sql: record.text(4).map(str::to_string),
        })
    }
}

/// Whether a row was read from the schema table or from a table's b-tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Schema,
    Data,
}

/// Tables of a database, assembled from rows in the order they're scanned.
///
/// Data rows are matched to a table only when they sit on the table's root page. Rows on pages
/// below an interior root are left unassigned; reaching them means descending from the root
/// through [`crate::btree::PageInfo::children`].
#[derive(Clone, Debug, Default)]
pub struct SchemaCatalog {
    entries: Vec<SchemaEntry>,
    tables: BTreeMap<String, TableInfo>,
    unassigned: Vec<Row>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: Row, kind: RowKind) {
        match kind {
            RowKind::Schema => self.add_schema_row(row),
            RowKind::Data => self.add_data_row(row),
        }
    }

    fn add_schema_row(&mut self, row: Row) {
        let Some(entry) = SchemaEntry::from_record(&row.record) else {
            warn!(
                page = row.page_index,
                slot = row.slot,
                "ignoring malformed schema row"
            );
            return;
        };

        if entry.kind == SchemaKind::Table {
            debug!(name = %entry.name, root_page = ?entry.root_page, "registering table");

            let table = self
                .tables
                .entry(entry.name.clone())
                .or_insert_with(|| TableInfo::new(&entry.name));

            if let Some(root_page) = entry.root_page {
                table.set_root_page(root_page);
            }
            if let Some(sql) = &entry.sql {
                table.set_sql(sql);
            }
        }

        self.entries.push(entry);
    }

    fn add_data_row(&mut self, row: Row) {
        let table = row.page_index.checked_add(1).and_then(|root_page| {
            self.tables
                .values_mut()
                .find(|table| table.root_page() == Some(root_page))
        });

        match table {
            Some(table) => table.add_row(row),
            None => self.unassigned.push(row),
        }
    }

    /// Every schema row seen, including indexes, views and triggers.
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Names of user tables, in ascending order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables
            .keys()
            .map(String::as_str)
            .filter(|name| !name.starts_with(SYSTEM_PREFIX))
            .collect()
    }

    /// Number of user tables with a defining statement.
    pub fn table_count(&self) -> usize {
        self.tables
            .values()
            .filter(|table| !table.name().starts_with(SYSTEM_PREFIX) && table.sql().is_some())
            .count()
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    /// All tables, system tables included.
    pub fn tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.values()
    }

    /// Table rooted at the zero based `page_index`.
    pub fn table_for_page(&self, page_index: u32) -> Option<&TableInfo> {
        let root_page = page_index.checked_add(1)?;

        self.tables
            .values()
            .find(|table| table.root_page() == Some(root_page))
    }

    pub fn rows(&self, name: &str) -> Option<&[Row]> {
        self.table(name).map(TableInfo::rows)
    }

    /// Data rows which aren't on any table's root page.
    pub fn unassigned_rows(&self) -> &[Row] {
        &self.unassigned
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::record::{self, Value};

    fn row(page_index: u32, slot: usize, values: &[Value]) -> Row {
        let payload = record::encode(values);

        Row {
            page_index,
            slot,
            row_id: Some(slot as i64 + 1),
            record: Record::decode(&payload, 0, payload.len()).unwrap(),
        }
    }

    fn schema_row(slot: usize, kind: &str, name: &str, root_page: i64, sql: &str) -> Row {
        row(
            0,
            slot,
            &[
                Value::from(kind),
                Value::from(name),
                Value::from(name),
                Value::Integer(root_page),
                Value::from(sql),
            ],
        )
    }

    fn catalog() -> SchemaCatalog {
        let mut catalog = SchemaCatalog::new();

        for row in [
            schema_row(0, "table", "users", 2, "CREATE TABLE users (id INTEGER, name TEXT)"),
            schema_row(1, "table", "sqlite_sequence", 3, "CREATE TABLE sqlite_sequence(name,seq)"),
            schema_row(2, "index", "users_name", 4, "CREATE INDEX users_name ON users(name)"),
            schema_row(3, "table", "accounts", 5, "CREATE TABLE accounts (balance REAL)"),
        ] {
            catalog.add_row(row, RowKind::Schema);
        }

        catalog
    }

    #[test]
    fn registers_tables() {
        let catalog = catalog();

        assert_eq!(catalog.table_names(), vec!["accounts", "users"]);
        assert_eq!(catalog.table_count(), 2);
        assert_eq!(catalog.entries().len(), 4);
        assert_eq!(catalog.entries()[2].kind, SchemaKind::Index);

        let users = catalog.table("users").unwrap();
        assert_eq!(users.root_page(), Some(2));
        assert_eq!(
            users.column_names().collect::<Vec<_>>(),
            vec!["id", "name"]
        );

        // System tables are kept, only hidden from the names.
        assert!(catalog.table("sqlite_sequence").is_some());
        assert_eq!(catalog.tables().count(), 3);
    }

    #[test]
    fn data_rows_match_root_page() {
        let mut catalog = catalog();

        catalog.add_row(row(1, 0, &[Value::Integer(1), Value::from("ann")]), RowKind::Data);
        catalog.add_row(row(1, 1, &[Value::Integer(2), Value::from("bob")]), RowKind::Data);
        catalog.add_row(row(4, 0, &[Value::Float(9.5)]), RowKind::Data);
        catalog.add_row(row(6, 0, &[Value::from("orphan")]), RowKind::Data);

        assert_eq!(catalog.rows("users").map(<[Row]>::len), Some(2));
        assert_eq!(catalog.rows("accounts").map(<[Row]>::len), Some(1));
        assert_eq!(catalog.unassigned_rows().len(), 1);
        assert_eq!(catalog.table_for_page(4).map(TableInfo::name), Some("accounts"));
        assert!(catalog.table_for_page(0).is_none());
    }

    #[test]
    fn last_page_index() {
        let mut catalog = catalog();
        catalog.add_row(row(u32::MAX, 0, &[Value::Integer(1)]), RowKind::Data);

        assert_eq!(catalog.unassigned_rows().len(), 1);
        assert!(catalog.table_for_page(u32::MAX).is_none());
    }

    #[test]
    fn reregistering_updates() {
        let mut catalog = catalog();
        catalog.add_row(
            schema_row(4, "table", "users", 7, "CREATE TABLE users (id INTEGER)"),
            RowKind::Schema,
        );

        let users = catalog.table("users").unwrap();
        assert_eq!(users.root_page(), Some(7));
        assert_eq!(users.column_count(), 1);
        assert_eq!(catalog.table_names().len(), 2);
    }

    #[test]
    fn malformed_schema_row() {
        let mut catalog = SchemaCatalog::new();
        catalog.add_row(row(0, 0, &[Value::from("table"), Value::Null]), RowKind::Schema);
        catalog.add_row(
            row(
                0,
                1,
                &[
                    Value::Integer(1),
                    Value::from("x"),
                    Value::from("x"),
                    Value::Integer(2),
                    Value::Null,
                ],
            ),
            RowKind::Schema,
        );

        assert!(catalog.entries().is_empty());
        assert!(catalog.table_names().is_empty());
    }

    #[test]
    fn view_without_root_page() {
        let entry = SchemaEntry::from_record(
            &schema_row(0, "view", "v", 0, "CREATE VIEW v AS SELECT 1").record,
        )
        .unwrap();

        assert_eq!(entry.kind, SchemaKind::View);
        assert_eq!(entry.root_page, None);
    }
}
