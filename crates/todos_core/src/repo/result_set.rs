//! Raw tabular results returned by `PersistenceGateway::query`.
//!
//! Every cell is text-encoded (or NULL) regardless of the declared column
//! type; callers cast through `crate::decode`.

use rusqlite::types::ValueRef;
use rusqlite::Statement;

/// One result row: column name to text cell, in select-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRow {
    cells: Vec<(String, Option<String>)>,
}

impl TextRow {
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// Returns `None` when the column is absent, `Some(None)` when it is NULL.
    pub fn cell(&self, column: &str) -> Option<Option<&str>> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_deref())
    }

    /// Returns the text of `column`, treating NULL and absent alike.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cell(column).flatten()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }
}

/// All rows produced by one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<TextRow>,
}

impl ResultSet {
    pub fn first(&self) -> Option<&TextRow> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextRow> {
        self.rows.iter()
    }

    /// Runs a prepared statement and collects its rows as text.
    pub(crate) fn collect<P>(stmt: &mut Statement<'_>, params: P) -> rusqlite::Result<Self>
    where
        P: rusqlite::Params,
    {
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                cells.push((column.clone(), text_cell(row.get_ref(index)?)));
            }
            collected.push(TextRow { cells });
        }

        Ok(Self {
            columns,
            rows: collected,
        })
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a TextRow;
    type IntoIter = std::slice::Iter<'a, TextRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = TextRow;
    type IntoIter = std::vec::IntoIter<TextRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

fn text_cell(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(number) => Some(number.to_string()),
        ValueRef::Real(number) => Some(number.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ResultSet, TextRow};
    use rusqlite::Connection;

    #[test]
    fn collect_renders_every_storage_class_as_text() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 42 AS answer, 1.5 AS ratio, 'hi' AS greeting, NULL AS \"nothing\";")
            .unwrap();

        let result = ResultSet::collect(&mut stmt, []).unwrap();
        assert_eq!(result.columns, ["answer", "ratio", "greeting", "nothing"]);
        assert_eq!(result.len(), 1);

        let row = result.first().unwrap();
        assert_eq!(row.get("answer"), Some("42"));
        assert_eq!(row.get("ratio"), Some("1.5"));
        assert_eq!(row.get("greeting"), Some("hi"));
        assert_eq!(row.cell("nothing"), Some(None));
        assert_eq!(row.cell("absent"), None);
    }

    #[test]
    fn text_row_keeps_select_order() {
        let row = TextRow::from_cells([
            ("b".to_string(), Some("2".to_string())),
            ("a".to_string(), None),
        ]);
        assert_eq!(row.columns().collect::<Vec<_>>(), ["b", "a"]);
    }
}
