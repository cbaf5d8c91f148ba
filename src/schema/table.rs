use std::collections::HashMap;

use super::columns::{ColumnDef, parse_columns};
use crate::record::{Record, Value};

static NULL: Value = Value::Null;

/// A decoded row, tagged with the slot it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// Zero based index of the page holding the row.
    pub page_index: u32,
    pub slot: usize,
    /// Row id, for rows of table b-trees.
    pub row_id: Option<i64>,
    pub record: Record,
}

impl Row {
    /// Value stored in `column`. Columns missing from the record (added to the table after the
    /// row was written) read as `NULL`.
    pub fn value(&self, column: usize) -> &Value {
        self.record.get(column).unwrap_or(&NULL)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableInfo {
    name: String,
    /// 1-based page number of the table's b-tree root.
    root_page: Option<u32>,
    sql: Option<String>,
    columns: Vec<ColumnDef>,
    /// Lower cased column name to position.
    column_index: HashMap<String, usize>,
    autoincrement: bool,
    rows: Vec<Row>,
}

impl TableInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_page(&self) -> Option<u32> {
        self.root_page
    }

    pub fn set_root_page(&mut self, root_page: u32) {
        self.root_page = Some(root_page);
    }

    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Store the `CREATE TABLE` statement, replacing the column list with the one it declares.
    pub fn set_sql(&mut self, sql: impl Into<String>) {
        let sql = sql.into();
        let parsed = parse_columns(&sql);

        self.column_index = HashMap::new();
        for (i, column) in parsed.columns.iter().enumerate() {
            self.column_index
                .entry(column.name.to_lowercase())
                .or_insert(i);
        }

        self.columns = parsed.columns;
        self.autoincrement = parsed.autoincrement;
        self.sql = Some(sql);
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn column_types(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(|column| column.declared_type.as_str())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of the column called `name`, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(&name.to_lowercase()).copied()
    }

    pub fn is_autoincrement(&self) -> bool {
        self.autoincrement
    }

    /// Position of the `INTEGER PRIMARY KEY` column, which aliases the row id and is stored as
    /// `NULL` in every record.
    pub fn rowid_alias(&self) -> Option<usize> {
        let mut keys = self.columns.iter().enumerate().filter(|(_, c)| c.primary_key);

        match (keys.next(), keys.next()) {
            (Some((i, column)), None) if column.declared_type == "INTEGER" => Some(i),
            _ => None,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Value of `column` in `row`, reading the row id for the row id alias column.
    pub fn value(&self, row: &Row, column: usize) -> Value {
        match (self.rowid_alias(), row.value(column), row.row_id) {
            (Some(alias), Value::Null, Some(row_id)) if alias == column => Value::Integer(row_id),
            (_, value, _) => value.clone(),
        }
    }

    /// Every value of the column called `name`, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<Value>> {
        let column = self.column_index(name)?;

        Some(self.rows.iter().map(|row| self.value(row, column)).collect())
    }

    /// Distinct values of the column called `name`, in ascending order.
    pub fn distinct_values(&self, name: &str) -> Option<Vec<Value>> {
        let mut values = self.column_values(name)?;
        sort_dedup(&mut values);

        Some(values)
    }

    /// Rows where the column called `name` equals `value`.
    pub fn rows_where(&self, name: &str, value: &Value) -> Vec<&Row> {
        self.rows_where_all(&[(name, value.clone())])
    }

    /// Rows matching every `(column, value)` condition.
    pub fn rows_where_all(&self, conditions: &[(&str, Value)]) -> Vec<&Row> {
        let Some(conditions) = conditions
            .iter()
            .map(|(name, value)| Some((self.column_index(name)?, value)))
            .collect::<Option<Vec<_>>>()
        else {
            return Vec::new();
        };

        self.rows
            .iter()
            .filter(|row| {
                conditions
                    .iter()
                    .all(|(column, value)| self.value(row, *column).total_cmp(value).is_eq())
            })
            .collect()
    }

    /// Row whose primary key is `key`. The row id alias is used when the table has one,
    /// otherwise the first column.
    pub fn row_by_primary_key(&self, key: &Value) -> Option<&Row> {
        let column = self.rowid_alias().unwrap_or(0);

        self.rows
            .iter()
            .find(|row| self.value(row, column).total_cmp(key).is_eq())
    }

    /// Rows ordered by the column called `name`. Rows with equal values keep their order.
    pub fn rows_sorted_by(&self, name: &str, ascending: bool) -> Option<Vec<&Row>> {
        let column = self.column_index(name)?;

        let mut rows = self.rows.iter().collect::<Vec<_>>();
        rows.sort_by(|a, b| {
            let ordering = self.value(a, column).total_cmp(&self.value(b, column));
            if ascending { ordering } else { ordering.reverse() }
        });

        Some(rows)
    }

    pub fn statistics(&self) -> TableStatistics {
        TableStatistics {
            row_count: self.rows.len(),
            columns: (0..self.columns.len())
                .map(|column| {
                    let values = self
                        .rows
                        .iter()
                        .map(|row| self.value(row, column))
                        .collect::<Vec<_>>();
                    ColumnStatistics::from_values(&self.columns[column].name, values)
                })
                .collect(),
        }
    }
}

fn sort_dedup(values: &mut Vec<Value>) {
    values.sort_by(Value::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b).is_eq());
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableStatistics {
    pub row_count: usize,
    pub columns: Vec<ColumnStatistics>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStatistics {
    pub name: String,
    pub non_null: usize,
    pub nulls: usize,
    /// Distinct values, excluding `NULL`.
    pub distinct: usize,
    pub min: Option<Value>,
    pub max: Option<Value>,
}

impl ColumnStatistics {
    fn from_values(name: &str, mut values: Vec<Value>) -> Self {
        let total = values.len();
        values.retain(|value| !value.is_null());
        let non_null = values.len();

        sort_dedup(&mut values);

        Self {
            name: name.to_string(),
            non_null,
            nulls: total - non_null,
            distinct: values.len(),
            min: values.first().cloned(),
            max: values.last().cloned(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::record::{self, Record};

    fn row(row_id: i64, values: &[Value]) -> Row {
        let payload = record::encode(values);

        Row {
            page_index: 1,
            slot: row_id as usize,
            row_id: Some(row_id),
            record: Record::decode(&payload, 0, payload.len()).unwrap(),
        }
    }

    fn people() -> TableInfo {
        let mut table = TableInfo::new("people");
        table.set_root_page(2);
        table.set_sql(
            "CREATE TABLE people (id INTEGER PRIMARY KEY AUTOINCREMENT, Name TEXT, age INT)",
        );

        for (id, name, age) in [
            (1, "ann", Value::Integer(31)),
            (2, "bob", Value::Null),
            (3, "cat", Value::Integer(25)),
            (4, "ann", Value::Integer(40)),
        ] {
            table.add_row(row(id, &[Value::Null, Value::from(name), age]));
        }

        table
    }

    #[test]
    fn columns() {
        let table = people();

        assert_eq!(table.column_count(), 3);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["id", "Name", "age"]
        );
        assert_eq!(
            table.column_types().collect::<Vec<_>>(),
            vec!["INTEGER", "TEXT", "INT"]
        );
        assert_eq!(table.column_index("NAME"), Some(1));
        assert_eq!(table.column_index("missing"), None);
        assert!(table.is_autoincrement());
        assert_eq!(table.rowid_alias(), Some(0));
    }

    #[test]
    fn rowid_alias_reads_row_id() {
        let table = people();

        assert_eq!(
            table.column_values("id"),
            Some((1..=4).map(Value::Integer).collect())
        );
        assert_eq!(
            table
                .row_by_primary_key(&Value::Integer(3))
                .map(|row| row.value(1)),
            Some(&Value::from("cat"))
        );
    }

    #[test]
    fn missing_column_reads_null() {
        let mut table = people();
        table.add_row(row(5, &[Value::Null, Value::from("dan")]));

        assert_eq!(table.column_values("age").unwrap()[4], Value::Null);
    }

    #[test]
    fn queries() {
        let table = people();

        let named_ann = table.rows_where("name", &Value::from("ann"));
        assert_eq!(
            named_ann.iter().map(|row| row.row_id).collect::<Vec<_>>(),
            vec![Some(1), Some(4)]
        );

        let older_ann =
            table.rows_where_all(&[("name", "ann".into()), ("age", Value::Integer(40))]);
        assert_eq!(older_ann.len(), 1);
        assert_eq!(older_ann[0].row_id, Some(4));

        assert!(table.rows_where("missing", &Value::Null).is_empty());

        assert_eq!(
            table.distinct_values("name"),
            Some(vec!["ann".into(), "bob".into(), "cat".into()])
        );

        let by_age = table.rows_sorted_by("age", false).unwrap();
        assert_eq!(
            by_age.iter().map(|row| row.row_id).collect::<Vec<_>>(),
            vec![Some(4), Some(1), Some(3), Some(2)]
        );
    }

    #[test]
    fn statistics() {
        let stats = people().statistics();

        assert_eq!(stats.row_count, 4);
        assert_eq!(
            stats.columns[2],
            ColumnStatistics {
                name: "age".to_string(),
                non_null: 3,
                nulls: 1,
                distinct: 3,
                min: Some(Value::Integer(25)),
                max: Some(Value::Integer(40)),
            }
        );
        assert_eq!(stats.columns[1].distinct, 3);
        assert_eq!(stats.columns[0].nulls, 0);
    }

    #[test]
    fn set_sql_replaces_columns() {
        let mut table = people();
        table.set_sql("CREATE TABLE people (x REAL)");

        assert_eq!(table.column_count(), 1);
        assert_eq!(table.column_index("name"), None);
        assert!(!table.is_autoincrement());
    }
}
