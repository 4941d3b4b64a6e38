use std::collections::BTreeSet;

use super::model::{CellValue, Column, ColumnType, Table};

/// How a column is filtered and analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Textual or enumerated (text, dates, booleans).
    Categorical,
    /// Integer or float (also columns with no present value at all).
    Numeric,
}

/// Observed `[min, max]` of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Clamp a value into the bounds.
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

/// Observed values of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// Distinct values, `Null` included when the column has gaps.
    Categorical(BTreeSet<CellValue>),
    /// `None` when the column has no present value.
    Numeric(Option<Bounds>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
    pub domain: Domain,
}

impl ColumnSchema {
    /// Numeric bounds, if this is a numeric column with observed values.
    pub fn bounds(&self) -> Option<Bounds> {
        match &self.domain {
            Domain::Numeric(bounds) => *bounds,
            Domain::Categorical(_) => None,
        }
    }
}

/// Classify every column of `table`, in column order.
///
/// The result describes one particular table; it goes stale as soon as the
/// table is replaced (e.g. after dropping missing rows) and must be rebuilt.
pub fn inspect(table: &Table) -> Vec<ColumnSchema> {
    table.columns().iter().map(inspect_column).collect()
}

/// Look up one column's schema by name.
pub fn find<'a>(schema: &'a [ColumnSchema], name: &str) -> Option<&'a ColumnSchema> {
    schema.iter().find(|s| s.name == name)
}

/// Textual and boolean columns are categorical, everything else numeric.
pub fn column_kind(column: &Column) -> ColumnKind {
    match column.dtype() {
        ColumnType::Text | ColumnType::Bool => ColumnKind::Categorical,
        ColumnType::Integer | ColumnType::Float | ColumnType::Empty => ColumnKind::Numeric,
    }
}

fn inspect_column(column: &Column) -> ColumnSchema {
    let kind = column_kind(column);
    let domain = match kind {
        ColumnKind::Categorical => Domain::Categorical(column.unique_values()),
        ColumnKind::Numeric => Domain::Numeric(numeric_bounds(column)),
    };
    ColumnSchema {
        name: column.name().to_string(),
        kind,
        domain,
    }
}

fn numeric_bounds(column: &Column) -> Option<Bounds> {
    column.numeric_values().into_iter().fold(None, |acc, v| {
        Some(match acc {
            None => Bounds { min: v, max: v },
            Some(b) => Bounds {
                min: b.min.min(v),
                max: b.max.max(v),
            },
        })
    })
}
