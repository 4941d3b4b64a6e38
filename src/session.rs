use crate::analysis::{self, AnalysisResult};
use crate::config::ExplorerConfig;
use crate::data::export::{self, ExportFile};
use crate::data::filter::{self, ColumnSelection, FilteredView, SelectionState};
use crate::data::loader::{self, FileFormat};
use crate::data::missing::{self, MissingReport};
use crate::data::model::Table;
use crate::data::schema::{self, ColumnSchema};
use crate::error::{ExplorerError, Result};

// ---------------------------------------------------------------------------
// Loaded dataset
// ---------------------------------------------------------------------------

/// A table together with everything derived from it on load.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub source_name: String,
    pub format: FileFormat,
    pub table: Table,
    pub schema: Vec<ColumnSchema>,
    pub missing: MissingReport,
}

impl LoadedDataset {
    fn new(source_name: String, format: FileFormat, table: Table) -> Self {
        let schema = schema::inspect(&table);
        let missing = missing::detect_missing(&table);
        Self {
            source_name,
            format,
            table,
            schema,
            missing,
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one user's interaction cycle needs, independent of rendering.
///
/// Every mutator runs a full recomputation of the derived state. When the
/// filter step fails the error is recorded in `status_message` and returned,
/// and the inputs and state from before the call are restored. Analysis
/// failures only affect the analysis: they are kept in `analysis_error` and
/// do not fail filter or view changes.
#[derive(Debug, Default)]
pub struct Session {
    pub config: ExplorerConfig,

    /// Loaded dataset (None until the user uploads a file).
    dataset: Option<LoadedDataset>,

    /// Columns shown in the filtered view, in selection order.
    view_columns: Vec<String>,

    /// Per-column filter selections.
    selections: SelectionState,

    /// Result of the current filters; None when no view column is selected.
    filtered: Option<FilteredView>,

    /// Columns selected for analysis.
    analysis_columns: Vec<String>,

    /// Last successful analysis.
    analysis: Option<AnalysisResult>,

    /// Why the current analysis columns produced no result.
    analysis_error: Option<ExplorerError>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Session {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn dataset(&self) -> Option<&LoadedDataset> {
        self.dataset.as_ref()
    }

    pub fn view_columns(&self) -> &[String] {
        &self.view_columns
    }

    pub fn selections(&self) -> &SelectionState {
        &self.selections
    }

    pub fn filtered(&self) -> Option<&FilteredView> {
        self.filtered.as_ref()
    }

    pub fn analysis_columns(&self) -> &[String] {
        &self.analysis_columns
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn analysis_error(&self) -> Option<&ExplorerError> {
        self.analysis_error.as_ref()
    }

    /// Table used for analysis and export: the filtered view when there is
    /// one, the full table otherwise.
    pub fn active_table(&self) -> Option<&Table> {
        match (&self.filtered, &self.dataset) {
            (Some(view), _) => Some(&view.table),
            (None, Some(ds)) => Some(&ds.table),
            (None, None) => None,
        }
    }

    /// Load an upload, resolving its format from the file name.
    pub fn load(&mut self, file_name: &str, bytes: &[u8]) -> Result<()> {
        let format = record(&mut self.status_message, FileFormat::from_file_name(file_name))?;
        self.load_with_format(file_name, bytes, format)
    }

    /// Load an upload of a known format, replacing the current dataset and
    /// resetting every selection.
    pub fn load_with_format(&mut self, file_name: &str, bytes: &[u8], format: FileFormat) -> Result<()> {
        let table = record(&mut self.status_message, loader::load_bytes(bytes, format))?;
        let dataset = LoadedDataset::new(file_name.to_string(), format, table);

        self.view_columns = dataset
            .table
            .column_names()
            .into_iter()
            .take(self.config.default_view_columns)
            .collect();
        self.selections.clear();
        self.analysis_columns.clear();
        self.analysis = None;
        self.analysis_error = None;
        self.filtered = None;
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute()
    }

    /// Replace the table by one without incomplete rows.
    ///
    /// The schema is rebuilt and filter selections are reset, since they may
    /// name values that no longer exist.
    pub fn drop_missing(&mut self) -> Result<()> {
        let Some(ds) = &self.dataset else {
            return Ok(());
        };
        let table = missing::drop_missing(&ds.table);
        let dataset = LoadedDataset::new(ds.source_name.clone(), ds.format, table);
        self.dataset = Some(dataset);
        self.selections.clear();
        self.status_message = Some("Missing values have been removed.".to_string());
        self.recompute()
    }

    /// Change the viewed columns, dropping selections for columns no longer
    /// viewed. A column list the filter step rejects is not kept.
    pub fn set_view_columns(&mut self, columns: Vec<String>) -> Result<()> {
        let previous_columns = std::mem::replace(&mut self.view_columns, columns);
        let previous_selections = self.selections.clone();
        self.selections
            .retain(|name, _| self.view_columns.contains(name));
        let result = self.recompute();
        if result.is_err() {
            self.view_columns = previous_columns;
            self.selections = previous_selections;
        }
        result
    }

    /// Update one column's filter selection. A selection the column rejects
    /// is not kept.
    pub fn set_selection(&mut self, column: &str, selection: ColumnSelection) -> Result<()> {
        let previous = self.selections.insert(column.to_string(), selection);
        let result = self.recompute();
        if result.is_err() {
            match previous {
                Some(sel) => self.selections.insert(column.to_string(), sel),
                None => self.selections.remove(column),
            };
        }
        result
    }

    /// Return one column's filter to "everything".
    pub fn reset_selection(&mut self, column: &str) -> Result<()> {
        self.selections.remove(column);
        self.recompute()
    }

    /// Current selection for `column`, defaulting to the full domain.
    pub fn selection_for(&self, column: &str) -> Option<ColumnSelection> {
        if let Some(sel) = self.selections.get(column) {
            return Some(sel.clone());
        }
        let ds = self.dataset.as_ref()?;
        schema::find(&ds.schema, column).map(filter::full_selection)
    }

    /// Change the analysed columns. A selection the analysis rejects is
    /// reported and the previous columns and result are kept.
    pub fn set_analysis_columns(&mut self, columns: Vec<String>) -> Result<()> {
        let previous_columns = std::mem::replace(&mut self.analysis_columns, columns);
        let previous_analysis = self.analysis.take();
        let previous_error = self.analysis_error.take();
        self.reanalyse();
        match self.analysis_error.take() {
            None => Ok(()),
            Some(e) => {
                self.analysis_columns = previous_columns;
                self.analysis = previous_analysis;
                self.analysis_error = previous_error;
                record(&mut self.status_message, Err(e))
            }
        }
    }

    /// Rebuild the filtered view and the analysis from scratch.
    ///
    /// Fails only when the filter step does; see [`Session::analysis_error`]
    /// for the analysis outcome.
    pub fn recompute(&mut self) -> Result<()> {
        let Some(ds) = &self.dataset else {
            self.filtered = None;
            self.analysis = None;
            self.analysis_error = None;
            return Ok(());
        };

        let filtered = if self.view_columns.is_empty() {
            None
        } else {
            let view = filter::build_filters(&ds.schema, &self.view_columns, &self.selections)
                .and_then(|filters| filter::apply_filters(&ds.table, &self.view_columns, &filters));
            Some(record(&mut self.status_message, view)?)
        };
        self.filtered = filtered;
        self.reanalyse();
        Ok(())
    }

    /// Rerun the analysis over the rows that survive the current filters.
    fn reanalyse(&mut self) {
        let Some(ds) = &self.dataset else {
            self.analysis = None;
            self.analysis_error = None;
            return;
        };

        // Analysis runs over every column of the surviving rows, so analysis
        // columns need not be among the view columns.
        let analysed_rows = self.filtered.as_ref().map(|v| ds.table.take_rows(&v.rows));
        let table = analysed_rows.as_ref().unwrap_or(&ds.table);
        match analysis::analyze(table, &self.analysis_columns, &self.config) {
            Ok(result) => {
                self.analysis = result;
                self.analysis_error = None;
            }
            Err(e) => {
                log::warn!("analysis of {:?} failed: {e}", self.analysis_columns);
                self.analysis = None;
                self.analysis_error = Some(e);
            }
        }
    }

    /// CSV export of the active table; `Ok(None)` before anything is loaded.
    pub fn export(&mut self) -> Result<Option<ExportFile>> {
        let Some(table) = self.active_table() else {
            return Ok(None);
        };
        let file = export::export_csv(table, &self.config.export_file_name);
        record(&mut self.status_message, file).map(Some)
    }
}

/// Put an error into the status line before handing it back.
fn record<T>(status: &mut Option<String>, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        log::error!("{e}");
        *status = Some(format!("Error: {e}"));
    }
    result
}
