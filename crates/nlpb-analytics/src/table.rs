//! Dynamically typed tabular input.
//!
//! The dataset schema is not known ahead of time, so a [`RawTable`] is an
//! ordered list of named columns holding typed [`Cell`]s. The normalizer
//! inspects column names and kinds explicitly instead of coercing values.

use std::io::Read;
use std::path::Path;

use crate::error::AnalyticsError;

/// Cell spellings read as missing values.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL"];

/// One CSV field.
///
/// The source text is kept as read; its type is inferred on demand so that
/// numeric-looking text ("007", "1.50") renders back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Value(String),
}

impl Cell {
    /// Reads a raw CSV field, mapping null markers to [`Cell::Null`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if NULL_MARKERS.contains(&raw) {
            Cell::Null
        } else {
            Cell::Value(raw.to_string())
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// The source text, `None` for `Null`.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Value(raw) => Some(raw.clone()),
        }
    }

    /// `true`/`false` in any case.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Value(raw) if raw.eq_ignore_ascii_case("true") => Some(true),
            Cell::Value(raw) if raw.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Kind of this single value, `None` for `Null`.
    #[must_use]
    pub fn value_kind(&self) -> Option<ColumnKind> {
        let Cell::Value(raw) = self else {
            return None;
        };
        if self.as_bool().is_some() {
            return Some(ColumnKind::Boolean);
        }
        // "inf" and friends parse as floats but are words in a text dataset.
        let numeric = raw.parse::<i64>().is_ok()
            || raw.parse::<f64>().is_ok_and(f64::is_finite);
        Some(if numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        })
    }
}

impl From<&str> for Cell {
    fn from(raw: &str) -> Self {
        Cell::Value(raw.to_string())
    }
}

/// Inferred type of a column, from its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell is null.
    Empty,
    Boolean,
    Numeric,
    /// At least one free-form string value.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        let mut kind = ColumnKind::Empty;
        for value_kind in self.cells.iter().filter_map(Cell::value_kind) {
            kind = match (kind, value_kind) {
                (_, ColumnKind::Text) => return ColumnKind::Text,
                (ColumnKind::Empty, k) => k,
                (k, v) if k == v => k,
                // Booleans mixed with numbers: no meaningful type, read as text.
                _ => return ColumnKind::Text,
            };
        }
        kind
    }
}

/// Ordered columns of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    columns: Vec<Column>,
    rows: usize,
}

impl RawTable {
    /// Builds a table from columns.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Schema`] if the columns differ in length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, AnalyticsError> {
        let rows = columns.first().map_or(0, |c| c.cells.len());
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != rows) {
            return Err(AnalyticsError::Schema(format!(
                "column {:?} has {} cells, expected {rows}",
                bad.name,
                bad.cells.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Reads CSV with a header row, reading every field with [`Cell::parse`].
    ///
    /// Short records are padded with `Null`; fields beyond the header are ignored.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`csv::Error`] on I/O or malformed input.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut columns: Vec<Column> = reader
            .headers()?
            .iter()
            .map(|name| Column::new(name, Vec::new()))
            .collect();

        let mut rows = 0usize;
        for record in reader.records() {
            let record = record?;
            if record.len() > columns.len() {
                tracing::debug!(
                    row = rows,
                    fields = record.len(),
                    columns = columns.len(),
                    "ignoring fields beyond the header"
                );
            }
            for (idx, column) in columns.iter_mut().enumerate() {
                column
                    .cells
                    .push(record.get(idx).map_or(Cell::Null, Cell::parse));
            }
            rows += 1;
        }

        Ok(Self { columns, rows })
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Loads the dataset CSV at `path`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Dataset`] if the file cannot be opened or parsed.
pub fn load_csv(path: &Path) -> Result<RawTable, AnalyticsError> {
    let dataset_error = |source: csv::Error| AnalyticsError::Dataset {
        path: path.display().to_string(),
        source,
    };
    let file = std::fs::File::open(path).map_err(|e| dataset_error(csv::Error::from(e)))?;
    let table = RawTable::from_csv_reader(file).map_err(dataset_error)?;
    tracing::info!(
        path = %path.display(),
        rows = table.rows(),
        columns = table.columns().len(),
        "dataset loaded"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kind_infers_from_source_text() {
        assert_eq!(Cell::parse(""), Cell::Null);
        assert_eq!(Cell::parse("NaN"), Cell::Null);
        assert_eq!(Cell::parse("True").as_bool(), Some(true));
        assert_eq!(Cell::parse("false").value_kind(), Some(ColumnKind::Boolean));
        assert_eq!(Cell::parse("42").value_kind(), Some(ColumnKind::Numeric));
        assert_eq!(Cell::parse("0.5").value_kind(), Some(ColumnKind::Numeric));
        assert_eq!(Cell::parse("inf").value_kind(), Some(ColumnKind::Text));
        assert_eq!(
            Cell::parse("ótimo atendimento").value_kind(),
            Some(ColumnKind::Text)
        );
        assert_eq!(Cell::Null.value_kind(), None);
    }

    #[test]
    fn render_returns_source_text_unchanged() {
        for raw in ["007", "1.50", "+5", "TRUE", "1e3"] {
            assert_eq!(Cell::parse(raw).render().as_deref(), Some(raw));
        }
    }

    #[test]
    fn column_kind_from_non_null_cells() {
        let bools = Column::new("inbound", vec!["true".into(), Cell::Null, "False".into()]);
        assert_eq!(bools.kind(), ColumnKind::Boolean);

        let numbers = Column::new("n", vec!["1".into(), "2.5".into()]);
        assert_eq!(numbers.kind(), ColumnKind::Numeric);

        let mixed = Column::new("m", vec!["1".into(), "x".into()]);
        assert_eq!(mixed.kind(), ColumnKind::Text);

        let empty = Column::new("e", vec![Cell::Null, Cell::Null]);
        assert_eq!(empty.kind(), ColumnKind::Empty);
    }

    #[test]
    fn from_columns_rejects_ragged_columns() {
        let result = RawTable::from_columns(vec![
            Column::new("a", vec!["1".into(), "2".into()]),
            Column::new("b", vec!["1".into()]),
        ]);
        assert!(matches!(result, Err(AnalyticsError::Schema(_))));
    }

    #[test]
    fn csv_reader_pads_short_records() {
        let csv = "texto,categoria,idioma\nolá mundo,saudacao,pt\nhello,greeting\n";
        let table = RawTable::from_csv_reader(csv.as_bytes()).expect("parse csv");
        assert_eq!(table.rows(), 2);
        assert_eq!(table.columns().len(), 3);
        let idioma = table.column(2).expect("idioma column");
        assert_eq!(idioma.cells, vec![Cell::from("pt"), Cell::Null]);
    }

    #[test]
    fn load_csv_reports_missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(
            matches!(err, AnalyticsError::Dataset { ref path, .. } if path.ends_with("here.csv")),
            "unexpected error: {err:?}"
        );
    }
}
