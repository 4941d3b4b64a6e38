//! Data explorer core: load a tabular upload, inspect its columns, narrow it
//! with per-column filters, analyse a selection and export the result.
//!
//! Everything here is a plain function or value; rendering and widget state
//! live in the binary's `ui` layer, which drives a [`session::Session`].

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod session;

pub use analysis::{analyze, AnalysisResult};
pub use config::ExplorerConfig;
pub use data::filter::{apply_filters, build_filters, ColumnSelection, FilterSpec, FilteredView};
pub use data::loader::{load_bytes, FileFormat};
pub use data::model::{CellValue, Column, Table};
pub use data::schema::{inspect, ColumnKind, ColumnSchema, Domain};
pub use error::{ExplorerError, Result};
pub use session::Session;
