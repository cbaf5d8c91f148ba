//! Column definitions recovered from `CREATE TABLE` statements.

/// Declared type of a column with no type name. A column whose definition continues straight into
/// a constraint (`a NOT NULL`) also gets this type, never the constraint keyword.
pub const DEFAULT_TYPE: &str = "TEXT";

/// Keywords which start a table constraint rather than a column definition.
const TABLE_CONSTRAINTS: [&str; 3] = ["CONSTRAINT", "CHECK", "UNIQUE"];

/// Keywords which may follow a column name in place of a type name.
const COLUMN_CONSTRAINTS: [&str; 10] = [
    "CONSTRAINT",
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "CHECK",
    "DEFAULT",
    "COLLATE",
    "REFERENCES",
    "GENERATED",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// Leading type name, upper cased. Length specifiers such as `(255)` are dropped.
    pub declared_type: String,
    /// Column was declared `PRIMARY KEY` inline.
    pub primary_key: bool,
}

/// Columns of a table, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnList {
    pub columns: Vec<ColumnDef>,
    /// Table uses `AUTOINCREMENT` for its row ids.
    pub autoincrement: bool,
}

/// Parse the column definitions out of a `CREATE TABLE` statement. Table constraints are skipped.
/// Statements without a parenthesised column list (such as `CREATE TABLE .. AS SELECT`) yield no
/// columns.
pub fn parse_columns(sql: &str) -> ColumnList {
    let Some(body) = column_list(sql) else {
        return ColumnList::default();
    };

    ColumnList {
        columns: split_definitions(body)
            .into_iter()
            .filter(|definition| !is_table_constraint(definition))
            .filter_map(parse_definition)
            .collect(),
        autoincrement: body.to_ascii_uppercase().contains("AUTOINCREMENT"),
    }
}

/// Text between the first unquoted `(` and its matching `)`.
fn column_list(sql: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = None;

    for (i, c) in sql.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == closing_quote(open) => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`' | '[') => quote = Some(c),
            (None, '(') => {
                start.get_or_insert(i + 1);
                depth += 1;
            }
            (None, ')') if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|start| &sql[start..i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Split on commas which aren't nested in parentheses or quotes.
fn split_definitions(body: &str) -> Vec<&str> {
    let mut definitions = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == closing_quote(open) => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`' | '[') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                definitions.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    definitions.push(body[start..].trim());

    definitions.retain(|definition| !definition.is_empty());
    definitions
}

fn closing_quote(open: char) -> char {
    if open == '[' { ']' } else { open }
}

/// Leading identifier characters of `s`.
fn leading_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn is_table_constraint(definition: &str) -> bool {
    let keyword = leading_word(definition).to_ascii_uppercase();

    match keyword.as_str() {
        "PRIMARY" | "FOREIGN" => leading_word(definition[keyword.len()..].trim_start())
            .eq_ignore_ascii_case("KEY"),
        keyword => TABLE_CONSTRAINTS.contains(&keyword),
    }
}

fn parse_definition(definition: &str) -> Option<ColumnDef> {
    let (name, rest) = split_name(definition)?;

    let declared_type = match leading_word(rest.trim_start()).to_ascii_uppercase() {
        word if word.is_empty() || COLUMN_CONSTRAINTS.contains(&word.as_str()) => {
            DEFAULT_TYPE.to_string()
        }
        word => word,
    };

    let rest = rest.to_ascii_uppercase();

    Some(ColumnDef {
        name,
        declared_type,
        primary_key: rest.contains("PRIMARY KEY"),
    })
}

/// Separate the column name from the remainder of its definition, removing any quoting.
fn split_name(definition: &str) -> Option<(String, &str)> {
    let mut chars = definition.chars();

    match chars.next()? {
        open @ ('"' | '\'' | '`' | '[') => {
            let inner = &definition[1..];
            let end = inner.find(closing_quote(open))?;
            Some((inner[..end].to_string(), &inner[end + 1..]))
        }
        _ => {
            let end = definition
                .find(char::is_whitespace)
                .unwrap_or(definition.len());
            let name = definition[..end]
                .chars()
                .filter(|c| !matches!(c, '"' | '\'' | '`' | '[' | ']'))
                .collect::<String>();

            (!name.is_empty()).then_some((name, &definition[end..]))
        }
    }
}
