use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "PANDA_EXPLORER_CONFIG";

/// Tunables for the explorer. Every field has a default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Rows shown in the dataset preview.
    pub preview_rows: usize,
    /// How many leading columns are selected for viewing after a load.
    pub default_view_columns: usize,
    /// Fixed histogram bin count; `None` picks one from the data.
    pub histogram_bins: Option<usize>,
    /// Evaluation points of the density curve.
    pub kde_points: usize,
    /// Boxplot outlier fence, in interquartile ranges.
    pub outlier_iqr_factor: f64,
    /// Name offered for the CSV download.
    pub export_file_name: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            default_view_columns: 2,
            histogram_bins: None,
            kde_points: 200,
            outlier_iqr_factor: 1.5,
            export_file_name: "filtered_data.csv".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text).context("parsing config JSON")
    }

    /// Load from the file named by `PANDA_EXPLORER_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}
