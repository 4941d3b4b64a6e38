use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{ExplorerError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value covering common dataframe dtypes.
/// Categorical domains live in `BTreeSet`s, so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` (numeric cells only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// `Null` and NaN are the missing-value markers.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Canonical textual form used by the exporter and by column type
    /// unification. Missing cells have no text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::String(s) | CellValue::Date(s) => Some(s.clone()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(format_float(*v)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Null => None,
        }
    }

    fn is_textual(&self) -> bool {
        matches!(self, CellValue::String(_) | CellValue::Date(_))
    }
}

/// Whole floats keep a trailing `.0` so they read back as floats.
fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column – a named, type-homogeneous sequence of cells
// ---------------------------------------------------------------------------

/// Storage type of a column after unification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Bool,
    Text,
    /// Every cell is missing.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: ColumnType,
    values: Vec<CellValue>,
}

impl Column {
    /// Build a column, unifying the cell types:
    /// * any textual cell turns every present cell into text,
    /// * booleans mixed with numbers are also turned into text,
    /// * integers mixed with floats are widened to floats,
    /// * NaN floats become `Null`.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let mut values: Vec<CellValue> = values
            .into_iter()
            .map(|v| if v.is_missing() { CellValue::Null } else { v })
            .collect();

        let has = |pred: fn(&CellValue) -> bool| values.iter().any(pred);
        let has_text = has(CellValue::is_textual);
        let has_bool = has(|v| matches!(v, CellValue::Bool(_)));
        let has_int = has(|v| matches!(v, CellValue::Integer(_)));
        let has_float = has(|v| matches!(v, CellValue::Float(_)));
        let has_number = has_int || has_float;

        let dtype = if has_text || (has_bool && has_number) {
            for v in &mut values {
                if !v.is_textual() {
                    if let Some(text) = v.to_text() {
                        *v = CellValue::String(text);
                    }
                }
            }
            ColumnType::Text
        } else if has_float {
            for v in &mut values {
                if let CellValue::Integer(i) = v {
                    *v = CellValue::Float(*i as f64);
                }
            }
            ColumnType::Float
        } else if has_int {
            ColumnType::Integer
        } else if has_bool {
            ColumnType::Bool
        } else {
            ColumnType::Empty
        };

        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present numeric values, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Sorted set of distinct values (missing included when present).
    pub fn unique_values(&self) -> BTreeSet<CellValue> {
        self.values.iter().cloned().collect()
    }

    fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered set of uniquely named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Assemble a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(ExplorerError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
            if col.len() != row_count {
                return Err(ExplorerError::InvalidTable(format!(
                    "column '{}' has {} rows, expected {row_count}",
                    col.name(),
                    col.len()
                )));
            }
        }
        Ok(Table { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.columns.len())
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// First `n` rows (preview).
    pub fn head(&self, n: usize) -> Table {
        let rows: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&rows)
    }

    /// New table holding the given rows, in the given order.
    /// Indices must be `< row_count()`.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            row_count: rows.len(),
        }
    }

    /// Projection onto `names`, keeping this table's column order.
    pub fn project(&self, names: &[String]) -> Result<Table> {
        if let Some(missing) = names.iter().find(|n| self.column(n).is_none()) {
            return Err(ExplorerError::UnknownColumn(missing.clone()));
        }
        let columns = self
            .columns
            .iter()
            .filter(|c| names.iter().any(|n| n == c.name()))
            .cloned()
            .collect();
        Ok(Table {
            columns,
            row_count: self.row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_cell_turns_column_textual() {
        let col = Column::new(
            "mixed",
            vec![
                CellValue::Integer(1),
                CellValue::String("a".into()),
                CellValue::Null,
            ],
        );
        assert_eq!(col.dtype(), ColumnType::Text);
        assert_eq!(col.values()[0], CellValue::String("1".into()));
        assert_eq!(col.values()[2], CellValue::Null);
    }

    #[test]
    fn integers_widen_to_float() {
        let col = Column::new("x", vec![CellValue::Integer(2), CellValue::Float(0.5)]);
        assert_eq!(col.dtype(), ColumnType::Float);
        assert_eq!(col.values()[0], CellValue::Float(2.0));
    }

    #[test]
    fn nan_is_missing() {
        let col = Column::new("x", vec![CellValue::Float(f64::NAN), CellValue::Float(1.0)]);
        assert_eq!(col.values()[0], CellValue::Null);
        assert_eq!(col.missing_count(), 1);
    }

    #[test]
    fn all_missing_column_is_empty_typed() {
        let col = Column::new("x", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(col.dtype(), ColumnType::Empty);
    }

    #[test]
    fn table_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("a", vec![CellValue::Integer(1)]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidTable(_)));
    }

    #[test]
    fn table_rejects_duplicate_names() {
        let err = Table::new(vec![Column::new("a", vec![]), Column::new("a", vec![])]).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidTable(_)));
    }

    #[test]
    fn project_keeps_table_order() {
        let table = Table::new(vec![
            Column::new("a", vec![CellValue::Integer(1)]),
            Column::new("b", vec![CellValue::Integer(2)]),
            Column::new("c", vec![CellValue::Integer(3)]),
        ])
        .unwrap();
        let projected = table.project(&["c".into(), "a".into()]).unwrap();
        assert_eq!(projected.column_names(), vec!["a", "c"]);
        assert!(matches!(
            table.project(&["zzz".into()]),
            Err(ExplorerError::UnknownColumn(_))
        ));
    }

    #[test]
    fn head_truncates() {
        let table = Table::new(vec![Column::new(
            "a",
            (0..10).map(CellValue::Integer).collect(),
        )])
        .unwrap();
        assert_eq!(table.head(5).shape(), (5, 1));
        assert_eq!(table.head(50).shape(), (10, 1));
    }

    #[test]
    fn whole_floats_keep_decimal_point() {
        assert_eq!(CellValue::Float(2.0).to_text().as_deref(), Some("2.0"));
        assert_eq!(CellValue::Float(2.5).to_text().as_deref(), Some("2.5"));
        assert_eq!(CellValue::Null.to_text(), None);
    }
}
