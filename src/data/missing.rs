use super::model::Table;

/// Where a table has gaps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissingReport {
    /// Total number of missing cells.
    pub total: usize,
    /// `(column, missing cells)` for every column, in column order.
    pub per_column: Vec<(String, usize)>,
}

impl MissingReport {
    pub fn has_missing(&self) -> bool {
        self.total > 0
    }
}

/// Count missing cells per column.
pub fn detect_missing(table: &Table) -> MissingReport {
    let per_column: Vec<(String, usize)> = table
        .columns()
        .iter()
        .map(|c| (c.name().to_string(), c.missing_count()))
        .collect();
    let total = per_column.iter().map(|(_, n)| n).sum();
    MissingReport { total, per_column }
}

/// Return a new table without the rows holding at least one missing cell.
///
/// Surviving rows keep their order. The input is left untouched; any schema
/// or filter derived from it must be rebuilt against the result.
pub fn drop_missing(table: &Table) -> Table {
    let keep: Vec<usize> = (0..table.row_count())
        .filter(|&r| table.columns().iter().all(|c| !c.values()[r].is_missing()))
        .collect();
    log::info!(
        "Dropping {} of {} rows with missing values",
        table.row_count() - keep.len(),
        table.row_count()
    );
    table.take_rows(&keep)
}
