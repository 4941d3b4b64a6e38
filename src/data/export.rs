use super::model::Table;
use crate::error::{ExplorerError, Result};

/// Content type declared for every export.
pub const CSV_MIME: &str = "text/csv";

/// A named, ready-to-save byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialise `table` as UTF-8 CSV: comma separated, header row first,
/// one line per row, missing cells left empty.
///
/// The output depends on nothing but the table, so identical tables always
/// produce identical bytes.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(table.column_names())
        .map_err(|e| ExplorerError::Export(e.to_string()))?;
    for r in 0..table.row_count() {
        let record = table.row(r).into_iter().map(|v| v.to_text().unwrap_or_default());
        writer
            .write_record(record)
            .map_err(|e| ExplorerError::Export(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExplorerError::Export(e.error().to_string()))
}

/// Serialise `table` into an [`ExportFile`] called `file_name`.
pub fn export_csv(table: &Table, file_name: &str) -> Result<ExportFile> {
    let bytes = to_csv_bytes(table)?;
    log::info!(
        "Exported {} rows to '{file_name}' ({} bytes)",
        table.row_count(),
        bytes.len()
    );
    Ok(ExportFile {
        file_name: file_name.to_string(),
        mime: CSV_MIME,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    #[test]
    fn writes_header_and_rows() {
        let table = Table::new(vec![
            Column::new("age", vec![CellValue::Integer(25), CellValue::Null]),
            Column::new(
                "city",
                vec![CellValue::String("New York, NY".into()), CellValue::String("LA".into())],
            ),
        ])
        .unwrap();
        let out = String::from_utf8(to_csv_bytes(&table).unwrap()).unwrap();
        assert_eq!(out, "age,city\n25,\"New York, NY\"\n,LA\n");
    }

    #[test]
    fn header_only_table_exports_complete_header() {
        let table = Table::new(vec![Column::new("a", Vec::new()), Column::new("b", Vec::new())]).unwrap();
        assert_eq!(to_csv_bytes(&table).unwrap(), b"a,b\n");
    }

    #[test]
    fn export_file_metadata() {
        let file = export_csv(&Table::default(), "filtered_data.csv").unwrap();
        assert_eq!(file.file_name, "filtered_data.csv");
        assert_eq!(file.mime, "text/csv");
    }
}
