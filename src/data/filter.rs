use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Table};
use super::schema::{self, ColumnKind, ColumnSchema, Domain};
use crate::error::{ExplorerError, Result};

// ---------------------------------------------------------------------------
// User selections: what the filter widgets hand us per column
// ---------------------------------------------------------------------------

/// One column's raw widget state.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSelection {
    /// Chosen categorical values.
    Values(BTreeSet<CellValue>),
    /// Chosen numeric sub-range.
    Range { low: f64, high: f64 },
}

/// Per-column selection state: column_name → selection.
/// A selected column absent from the map means "everything".
pub type SelectionState = BTreeMap<String, ColumnSelection>;

/// The selection that lets every row of a column through.
pub fn full_selection(column: &ColumnSchema) -> ColumnSelection {
    match &column.domain {
        Domain::Categorical(values) => ColumnSelection::Values(values.clone()),
        Domain::Numeric(Some(b)) => ColumnSelection::Range {
            low: b.min,
            high: b.max,
        },
        Domain::Numeric(None) => ColumnSelection::Range {
            low: f64::NEG_INFINITY,
            high: f64::INFINITY,
        },
    }
}

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// One column's predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// Row passes when its value is one of `allowed`.
    Categorical {
        column: String,
        allowed: BTreeSet<CellValue>,
    },
    /// Row passes when `low <= value <= high`; missing values never pass.
    Range { column: String, low: f64, high: f64 },
}

impl FilterSpec {
    pub fn column(&self) -> &str {
        match self {
            FilterSpec::Categorical { column, .. } | FilterSpec::Range { column, .. } => column,
        }
    }

    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            FilterSpec::Categorical { allowed, .. } => allowed.contains(value),
            FilterSpec::Range { low, high, .. } => value
                .as_f64()
                .is_some_and(|v| *low <= v && v <= *high),
        }
    }
}

/// Turn the user's selections into one [`FilterSpec`] per selected column,
/// in selection order.
///
/// * categorical choices are intersected with the column's domain,
///   an empty choice yields a filter that matches nothing;
/// * numeric ranges are clamped to the observed bounds (a reversed range
///   is swapped first);
/// * a column without an explicit selection gets the full selection.
pub fn build_filters(
    schema: &[ColumnSchema],
    selected_columns: &[String],
    selections: &SelectionState,
) -> Result<Vec<FilterSpec>> {
    selected_columns
        .iter()
        .map(|name| {
            let column = schema::find(schema, name)
                .ok_or_else(|| ExplorerError::UnknownColumn(name.clone()))?;
            let selection = selections
                .get(name)
                .cloned()
                .unwrap_or_else(|| full_selection(column));
            build_filter(column, selection)
        })
        .collect()
}

fn build_filter(column: &ColumnSchema, selection: ColumnSelection) -> Result<FilterSpec> {
    let name = column.name.clone();
    match (column.kind, &column.domain, selection) {
        (ColumnKind::Categorical, Domain::Categorical(domain), ColumnSelection::Values(chosen)) => {
            let allowed: BTreeSet<CellValue> = chosen.intersection(domain).cloned().collect();
            if allowed.len() < chosen.len() {
                log::warn!(
                    "Discarding {} value(s) not present in column '{name}'",
                    chosen.len() - allowed.len()
                );
            }
            Ok(FilterSpec::Categorical {
                column: name,
                allowed,
            })
        }
        (ColumnKind::Numeric, Domain::Numeric(bounds), ColumnSelection::Range { low, high }) => {
            if low.is_nan() || high.is_nan() {
                return Err(ExplorerError::InvalidSelection {
                    column: name,
                    message: "range bounds must be numbers".into(),
                });
            }
            let (mut low, mut high) = if low <= high { (low, high) } else { (high, low) };
            if let Some(b) = bounds {
                let (cl, ch) = (b.clamp(low), b.clamp(high));
                if cl != low || ch != high {
                    log::warn!("Clamping range on '{name}' to [{}, {}]", b.min, b.max);
                }
                low = cl;
                high = ch;
            }
            Ok(FilterSpec::Range {
                column: name,
                low,
                high,
            })
        }
        (kind, _, selection) => Err(ExplorerError::InvalidSelection {
            column: name,
            message: format!("{selection:?} does not fit a {kind:?} column"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// A table derived from a base table by applying filters.
///
/// Never updated in place: when any filter or the column selection changes
/// the view is rebuilt from the base table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    /// Surviving rows, projected onto the selected columns.
    pub table: Table,
    /// Base-table index of every surviving row, ascending.
    pub rows: Vec<usize>,
}

/// Return indices of rows that pass all filters.
///
/// A row passes when it satisfies every filter (conjunction).
pub fn filtered_indices(table: &Table, filters: &[FilterSpec]) -> Result<Vec<usize>> {
    let columns = filters
        .iter()
        .map(|f| {
            table
                .column(f.column())
                .map(|c| (f, c.values()))
                .ok_or_else(|| ExplorerError::UnknownColumn(f.column().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((0..table.row_count())
        .filter(|&row| columns.iter().all(|(f, values)| f.matches(&values[row])))
        .collect())
}

/// Apply `filters` to `table` and project onto `selected_columns`.
///
/// The view keeps the base table's column order and row order.
pub fn apply_filters(
    table: &Table,
    selected_columns: &[String],
    filters: &[FilterSpec],
) -> Result<FilteredView> {
    let rows = filtered_indices(table, filters)?;
    let table = table.project(selected_columns)?.take_rows(&rows);
    log::debug!(
        "Applied {} filter(s): {} row(s) remain",
        filters.len(),
        rows.len()
    );
    Ok(FilteredView { table, rows })
}
