use std::collections::BTreeSet;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::model::{CellValue, Column, Table};
use crate::error::{ExplorerError, Result};

// ---------------------------------------------------------------------------
// Declared formats
// ---------------------------------------------------------------------------

/// The upload formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
    Json,
}

impl FileFormat {
    /// Resolve a format tag (`csv`, `xlsx`/`spreadsheet`, `json`).
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "spreadsheet" => Ok(FileFormat::Spreadsheet),
            "json" => Ok(FileFormat::Json),
            other => Err(ExplorerError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Resolve the format from a file name's extension.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_tag(ext)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "CSV"),
            FileFormat::Spreadsheet => write!(f, "XLSX"),
            FileFormat::Json => write!(f, "JSON"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse uploaded bytes into a [`Table`]. Dispatch by declared format.
///
/// Every format produces the same column/row model, so nothing downstream
/// needs to know where a table came from. Malformed input fails as a whole;
/// no partial table is returned.
pub fn load_bytes(bytes: &[u8], format: FileFormat) -> Result<Table> {
    let table = match format {
        FileFormat::Csv => load_csv(bytes),
        FileFormat::Spreadsheet => load_spreadsheet(bytes),
        FileFormat::Json => load_json(bytes),
    }?;
    log::info!(
        "Loaded {format} table with {} rows and columns {:?}",
        table.row_count(),
        table.column_names()
    );
    Ok(table)
}

/// Build a table from a header and row-major cells, normalising the header.
fn table_from_rows(
    format: FileFormat,
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
) -> Result<Table> {
    let names = normalize_header(header);
    let mut columns: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); names.len()];
    for (row_no, row) in rows.into_iter().enumerate() {
        if row.len() > names.len() {
            return Err(ExplorerError::load(
                format,
                format!("row {row_no} has {} fields but the header has {}", row.len(), names.len()),
            ));
        }
        let width = row.len();
        for (col, value) in columns.iter_mut().zip(row) {
            col.push(value);
        }
        for col in columns.iter_mut().skip(width) {
            col.push(CellValue::Null);
        }
    }
    Table::new(
        names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}

/// Blank names become `Unnamed: {i}`, repeated names get `.1`, `.2`, … suffixes.
fn normalize_header(header: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(header.len());
    for (i, raw) in header.into_iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            raw
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while out.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        out.push(name);
    }
    out
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Rows must all have the header's width.
fn load_csv(bytes: &[u8]) -> Result<Table> {
    let format = FileFormat::Csv;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ExplorerError::load(format, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(ExplorerError::load(format, "no columns to parse from input"));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ExplorerError::load(format, e))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    table_from_rows(format, headers, rows)
}

/// Type a CSV field the way a dataframe reader would.
pub(crate) fn guess_cell_type(s: &str) -> CellValue {
    let t = s.trim();
    if t.is_empty() || matches!(t, "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL") {
        return CellValue::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        return CellValue::Float(f);
    }
    match t {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of an `.xlsx` workbook; the first row is the header.
fn load_spreadsheet(bytes: &[u8]) -> Result<Table> {
    let format = FileFormat::Spreadsheet;
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ExplorerError::load(format, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExplorerError::load(format, "workbook contains no worksheets"))?
        .map_err(|e| ExplorerError::load(format, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(ExplorerError::load(format, "no columns to parse from worksheet"));
    };
    let header: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let rows = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    table_from_rows(format, header, rows)
}

/// Workbooks store every number as a double, so whole numbers come back as
/// integers to match what the CSV and JSON readers produce.
fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => CellValue::Integer(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::Date(d.to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepted JSON layouts (the two common dataframe orientations):
///
/// ```json
/// [ { "age": 25, "city": "NY" }, { "age": 40, "city": "LA" } ]
/// { "age": [25, 40], "city": ["NY", "LA"] }
/// { "age": { "0": 25, "1": 40 }, "city": { "0": "NY", "1": "LA" } }
/// ```
fn load_json(bytes: &[u8]) -> Result<Table> {
    let format = FileFormat::Json;
    let root: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| ExplorerError::load(format, e))?;

    match root {
        JsonValue::Array(records) => load_json_records(records),
        JsonValue::Object(columns) => load_json_columns(columns),
        other => Err(ExplorerError::load(
            format,
            format!("expected a top-level array or object, found {}", json_kind(&other)),
        )),
    }
}

fn load_json_records(records: Vec<JsonValue>) -> Result<Table> {
    let format = FileFormat::Json;
    let mut header: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.into_iter().enumerate() {
        let JsonValue::Object(obj) = rec else {
            return Err(ExplorerError::load(format, format!("row {i} is not a JSON object")));
        };
        for key in obj.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .iter()
        .map(|obj| {
            header
                .iter()
                .map(|key| obj.get(key).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();
    table_from_rows(format, header, rows)
}

fn load_json_columns(columns: Map<String, JsonValue>) -> Result<Table> {
    let format = FileFormat::Json;
    let keyed = columns.values().filter(|v| v.is_object()).count();
    if keyed != 0 && keyed != columns.len() {
        return Err(ExplorerError::load(
            format,
            "either every column is an array or every column is an object keyed by row",
        ));
    }
    let index = row_index(&columns);

    let mut built = Vec::with_capacity(columns.len());
    for (name, values) in columns {
        let cells: Vec<CellValue> = match values {
            JsonValue::Array(items) => items.iter().map(json_to_cell).collect(),
            JsonValue::Object(items) => index
                .iter()
                .map(|key| items.get(key).map_or(CellValue::Null, json_to_cell))
                .collect(),
            other => {
                return Err(ExplorerError::load(
                    format,
                    format!("column '{name}' holds a {}, expected an array or object", json_kind(&other)),
                ))
            }
        };
        built.push(Column::new(name, cells));
    }
    Table::new(built).map_err(|e| ExplorerError::load(format, e))
}

/// Row keys of `{column: {row: value}}` data, in first-seen order across columns.
fn row_index(columns: &Map<String, JsonValue>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut index = Vec::new();
    for key in columns.values().filter_map(JsonValue::as_object).flat_map(|rows| rows.keys()) {
        if seen.insert(key.as_str()) {
            index.push(key.clone());
        }
    }
    index
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

fn json_kind(val: &JsonValue) -> &'static str {
    match val {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnType;
    use std::io::Write;

    const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// A one-sheet workbook: `strings` go to the shared-string table and
    /// `rows` hold raw `<c>` contents, numbers stored as doubles.
    fn workbook(strings: &[&str], rows: &[Vec<String>]) -> Vec<u8> {
        let shared: String = strings.iter().map(|s| format!("<si><t>{s}</t></si>")).collect();
        let sheet_rows: String = rows
            .iter()
            .map(|cells| format!("<row>{}</row>", cells.concat()))
            .collect();
        let parts = [
            (
                "xl/workbook.xml",
                format!(
                    "<workbook xmlns=\"{SHEET_NS}\" xmlns:r=\"{REL_NS}\"><sheets>\
                     <sheet name=\"Sheet1\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>"
                ),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                format!(
                    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
                     <Relationship Id=\"rId1\" Type=\"{REL_NS}/worksheet\" Target=\"worksheets/sheet1.xml\"/>\
                     </Relationships>"
                ),
            ),
            ("xl/sharedStrings.xml", format!("<sst xmlns=\"{SHEET_NS}\">{shared}</sst>")),
            (
                "xl/worksheets/sheet1.xml",
                format!("<worksheet xmlns=\"{SHEET_NS}\"><sheetData>{sheet_rows}</sheetData></worksheet>"),
            ),
        ];

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, body) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn text(i: usize) -> String {
        format!("<c t=\"s\"><v>{i}</v></c>")
    }

    fn number(v: &str) -> String {
        format!("<c><v>{v}</v></c>")
    }

    #[test]
    fn format_tags_resolve() {
        assert_eq!(FileFormat::from_tag("CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_tag(".xlsx").unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::from_file_name("data.json").unwrap(), FileFormat::Json);
        assert!(matches!(
            FileFormat::from_file_name("data.parquet"),
            Err(ExplorerError::UnsupportedFormat(ext)) if ext == "parquet"
        ));
        assert!(matches!(
            FileFormat::from_file_name("README"),
            Err(ExplorerError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn csv_types_columns() {
        let table = load_bytes(b"age,city,score\n25,NY,1.5\n40,LA,\n", FileFormat::Csv).unwrap();
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.column("age").unwrap().dtype(), ColumnType::Integer);
        assert_eq!(table.column("city").unwrap().dtype(), ColumnType::Text);
        assert_eq!(table.column("score").unwrap().values()[1], CellValue::Null);
    }

    #[test]
    fn ragged_csv_is_a_load_error() {
        let err = load_bytes(b"a,b\n1,2\n3\n", FileFormat::Csv).unwrap_err();
        assert!(matches!(err, ExplorerError::Load { format: FileFormat::Csv, .. }));
    }

    #[test]
    fn empty_csv_is_a_load_error() {
        assert!(load_bytes(b"", FileFormat::Csv).is_err());
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let table = load_bytes(b"a,a,\n1,2,3\n", FileFormat::Csv).unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2"]);
    }

    #[test]
    fn json_records_and_columns_agree() {
        let records = load_bytes(
            br#"[{"age": 25, "city": "NY"}, {"age": 40, "city": "LA"}]"#,
            FileFormat::Json,
        )
        .unwrap();
        let columns = load_bytes(
            br#"{"age": [25, 40], "city": ["NY", "LA"]}"#,
            FileFormat::Json,
        )
        .unwrap();
        let indexed = load_bytes(
            br#"{"age": {"0": 25, "1": 40}, "city": {"0": "NY", "1": "LA"}}"#,
            FileFormat::Json,
        )
        .unwrap();
        assert_eq!(records, columns);
        assert_eq!(records, indexed);
    }

    #[test]
    fn workbook_loads_like_the_same_csv() {
        let bytes = workbook(
            &["age", "city", "score", "NY", "LA"],
            &[
                vec![text(0), text(1), text(2)],
                vec![number("25"), text(3), number("1.5")],
                vec![number("40"), text(4), number("2")],
                vec![number("25"), text(4), number("2")],
            ],
        );
        let sheet = load_bytes(&bytes, FileFormat::Spreadsheet).unwrap();
        let csv = load_bytes(
            b"age,city,score\n25,NY,1.5\n40,LA,2\n25,LA,2\n",
            FileFormat::Csv,
        )
        .unwrap();
        assert_eq!(sheet.column("age").unwrap().dtype(), ColumnType::Integer);
        assert_eq!(sheet.column("score").unwrap().dtype(), ColumnType::Float);
        assert_eq!(sheet, csv);
    }

    #[test]
    fn spreadsheet_cells_map_to_cell_values() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        assert_eq!(spreadsheet_cell(&Data::Float(25.0)), CellValue::Integer(25));
        assert_eq!(spreadsheet_cell(&Data::Float(1.5)), CellValue::Float(1.5));
        assert_eq!(spreadsheet_cell(&Data::Float(1.0e300)), CellValue::Float(1.0e300));
        let noon = ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false);
        assert_eq!(
            spreadsheet_cell(&Data::DateTime(noon)),
            CellValue::Date("2024-01-01 12:00:00".into())
        );
    }

    #[test]
    fn keyed_json_columns_align_by_row_key() {
        let table = load_bytes(
            br#"{"a": {"0": 1, "1": 2}, "b": {"1": "y", "0": "x", "2": "z"}}"#,
            FileFormat::Json,
        )
        .unwrap();
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(
            table.column("a").unwrap().values(),
            &[CellValue::Integer(1), CellValue::Integer(2), CellValue::Null]
        );
        assert_eq!(
            table.column("b").unwrap().values(),
            &[
                CellValue::String("x".into()),
                CellValue::String("y".into()),
                CellValue::String("z".into()),
            ]
        );
    }

    #[test]
    fn json_columns_cannot_mix_arrays_and_keyed_objects() {
        let err = load_bytes(br#"{"a": [1, 2], "b": {"0": 1, "1": 2}}"#, FileFormat::Json).unwrap_err();
        assert!(matches!(err, ExplorerError::Load { format: FileFormat::Json, .. }));
    }

    #[test]
    fn json_records_fill_absent_keys_with_null() {
        let table = load_bytes(br#"[{"a": 1}, {"b": "x"}]"#, FileFormat::Json).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.column("a").unwrap().values()[1], CellValue::Null);
    }

    #[test]
    fn malformed_json_carries_parser_message() {
        let err = load_bytes(b"[{\"a\": 1", FileFormat::Json).unwrap_err();
        match err {
            ExplorerError::Load { format, message } => {
                assert_eq!(format, FileFormat::Json);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn json_scalar_root_is_rejected() {
        assert!(load_bytes(b"42", FileFormat::Json).is_err());
    }

    #[test]
    fn garbage_spreadsheet_is_a_load_error() {
        let err = load_bytes(b"not a zip archive", FileFormat::Spreadsheet).unwrap_err();
        assert!(matches!(err, ExplorerError::Load { format: FileFormat::Spreadsheet, .. }));
    }
}
