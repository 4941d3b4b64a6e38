//! Analysis layer: pick univariate or multivariate analysis from the
//! number of selected columns.
//!
//! ```text
//!   0 columns  → nothing to analyse
//!   1 column   → numeric: stats + histogram/KDE + box plot
//!                categorical: frequency counts
//!   2+ columns → Pearson correlation matrix (numeric columns only)
//! ```

pub mod correlation;
pub mod stats;

use crate::config::ExplorerConfig;
use crate::data::model::{CellValue, Column, Table};
use crate::data::schema::{column_kind, ColumnKind};
use crate::error::{ExplorerError, Result};

pub use correlation::CorrelationMatrix;
pub use stats::{BoxplotData, DistributionOptions, Histogram, UnivariateStats};

/// Output of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// One numeric column.
    Univariate {
        column: String,
        stats: UnivariateStats,
        boxplot: BoxplotData,
    },
    /// One categorical column: value counts, most frequent first.
    Frequencies {
        column: String,
        counts: Vec<(CellValue, usize)>,
    },
    /// Two or more numeric columns.
    Correlation(CorrelationMatrix),
}

impl From<&ExplorerConfig> for DistributionOptions {
    fn from(cfg: &ExplorerConfig) -> Self {
        DistributionOptions {
            bins: cfg.histogram_bins,
            kde_points: cfg.kde_points,
            outlier_iqr_factor: cfg.outlier_iqr_factor,
        }
    }
}

/// Analyse `columns` of `table`.
///
/// Returns `Ok(None)` when no column is selected. A multivariate selection
/// containing a categorical column is rejected as a whole with
/// [`ExplorerError::Analysis`] rather than silently narrowed.
pub fn analyze(
    table: &Table,
    columns: &[String],
    config: &ExplorerConfig,
) -> Result<Option<AnalysisResult>> {
    let selected = columns
        .iter()
        .map(|name| {
            table
                .column(name)
                .ok_or_else(|| ExplorerError::UnknownColumn(name.clone()))
        })
        .collect::<Result<Vec<&Column>>>()?;

    log::debug!("Dispatching analysis over {columns:?}");
    match selected.as_slice() {
        [] => Ok(None),
        [column] => univariate(column, &config.into()).map(Some),
        many => multivariate(many).map(Some),
    }
}

fn univariate(column: &Column, opts: &DistributionOptions) -> Result<AnalysisResult> {
    match column_kind(column) {
        ColumnKind::Categorical => Ok(AnalysisResult::Frequencies {
            column: column.name().to_string(),
            counts: stats::frequencies(column.values()),
        }),
        ColumnKind::Numeric => {
            let (stats, boxplot) = stats::describe(&column.numeric_values(), opts).ok_or_else(|| {
                ExplorerError::Analysis(format!("column '{}' has no values to analyse", column.name()))
            })?;
            Ok(AnalysisResult::Univariate {
                column: column.name().to_string(),
                stats,
                boxplot,
            })
        }
    }
}

fn multivariate(columns: &[&Column]) -> Result<AnalysisResult> {
    let non_numeric: Vec<&str> = columns
        .iter()
        .filter(|c| column_kind(c) == ColumnKind::Categorical)
        .map(|c| c.name())
        .collect();
    if !non_numeric.is_empty() {
        return Err(ExplorerError::Analysis(format!(
            "correlation needs numeric columns; non-numeric: {}",
            non_numeric.join(", ")
        )));
    }
    Ok(AnalysisResult::Correlation(CorrelationMatrix::compute(columns)))
}
