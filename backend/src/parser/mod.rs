//! Table decoding with format, encoding and delimiter auto-detection.
//!
//! Spreadsheets (`.xlsx`, `.xls`, `.ods`) are read with calamine, anything
//! else as delimited text. No shipment-specific logic here.

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use chrono::{NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};
use std::io::Cursor;
use std::path::Path;

use crate::error::{DecodeError, DecodeResult};
use crate::models::{unique_headers, Row, Table};

/// ZIP container (xlsx, ods)
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE2 compound document (xls)
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// How the input was read
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFormat {
    /// First worksheet of a workbook
    Spreadsheet { sheet: String },
    /// Delimited text
    Delimited { encoding: String, delimiter: char },
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Spreadsheet { sheet } => write!(f, "spreadsheet (sheet '{}')", sheet),
            SourceFormat::Delimited { encoding, delimiter } => {
                write!(f, "delimited text ({}, '{}')", encoding, format_delimiter(*delimiter))
            }
        }
    }
}

/// Result of decoding with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Decoded table
    pub table: Table,
    /// Detected input format
    pub format: SourceFormat,
}

/// Whether the bytes look like a workbook
pub fn is_spreadsheet(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE2_MAGIC)
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode a file with auto-detection.
pub fn parse_file<P: AsRef<Path>>(path: P) -> DecodeResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

/// Decode bytes with auto-detection of format, encoding and delimiter.
pub fn parse_bytes(bytes: &[u8]) -> DecodeResult<ParseResult> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyFile);
    }

    if is_spreadsheet(bytes) {
        return parse_spreadsheet(bytes);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_delimited(&content, delimiter)?;

    Ok(ParseResult {
        table,
        format: SourceFormat::Delimited { encoding, delimiter },
    })
}

/// Parse delimited text with an explicit delimiter.
///
/// Quoted fields may contain the delimiter. Short rows are padded with empty
/// values, extra values are ignored, blank rows are skipped.
///
/// # Example
/// ```ignore
/// use carload::parser::parse_delimited;
///
/// let table = parse_delimited("Vin;OriginState\n1HG;TX", ';').unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.rows()[0]["Vin"], "1HG");
/// ```
pub fn parse_delimited(content: &str, delimiter: char) -> DecodeResult<Table> {
    if !delimiter.is_ascii() {
        return Err(DecodeError::InvalidDelimiter(delimiter));
    }
    let delimiter = delimiter as u8;
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Err(DecodeError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = unique_headers(reader.headers()?.iter());
    let mut table = Table::new(headers);

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|v| v.is_empty()) {
            continue;
        }

        let row: Row = table
            .headers()
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), Value::String(record.get(i).unwrap_or("").to_string())))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Read the first worksheet of a workbook.
pub fn parse_spreadsheet(bytes: &[u8]) -> DecodeResult<ParseResult> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DecodeError::Spreadsheet(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::NoWorksheet)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoWorksheet)?
        .map_err(|e| DecodeError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(DecodeError::NoHeaders)?;
    let headers = unique_headers(header_row.iter().map(cell_value_text));
    let mut table = Table::new(headers);

    for cells in rows {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }

        let row: Row = table
            .headers()
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), cells.get(i).map(cell_to_value).unwrap_or(Value::Null)))
            .collect();
        table.push_row(row);
    }

    Ok(ParseResult {
        table,
        format: SourceFormat::Spreadsheet { sheet },
    })
}

/// Convert a worksheet cell to a table value.
///
/// Integral floats become integers, dates become ISO text.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| Value::String(format_datetime(dt)))
            .unwrap_or_else(|| Value::String(cell.to_string())),
        other => Value::String(other.to_string()),
    }
}

fn cell_value_text(cell: &Data) -> String {
    match cell_to_value(cell) {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn float_value(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn format_datetime(dt: NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Printable delimiter
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_delimited("Vin,OriginState\n1HG,TX\n2FT,CA", ',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0]["Vin"], "1HG");
        assert_eq!(table.rows()[1]["OriginState"], "CA");
    }

    #[test]
    fn test_quoted_delimiter_kept() {
        let csv = "OriginAddress,OriginCity\n\"12 Main St, Suite 4\",Austin";
        let table = parse_delimited(csv, ',').unwrap();

        assert_eq!(table.rows()[0]["OriginAddress"], "12 Main St, Suite 4");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_delimited("a;b\n1;2\n\n;\n3;4\n", ';').unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ragged_rows() {
        let table = parse_delimited("a;b;c\n1\n1;2;3;4", ';').unwrap();

        assert_eq!(table.rows()[0]["b"], "");
        assert_eq!(table.rows()[0]["c"], "");
        assert_eq!(table.rows()[1]["c"], "3");
        assert_eq!(table.rows()[1].len(), 3);
    }

    #[test]
    fn test_headers_trimmed_and_named() {
        let table = parse_delimited(" Vin ,,Price\nA,x,1", ',').unwrap();
        assert_eq!(table.headers(), &["Vin", "Unnamed: 1", "Price"]);
    }

    #[test]
    fn test_duplicate_headers_suffixed() {
        let table = parse_delimited("Vin,Vin,Price\nA,B,1", ',').unwrap();

        assert_eq!(table.headers(), &["Vin", "Vin.1", "Price"]);
        assert_eq!(table.rows()[0]["Vin"], "A");
        assert_eq!(table.rows()[0]["Vin.1"], "B");
        assert_eq!(table.rows()[0]["Price"], "1");
    }

    #[test]
    fn test_empty_input_error() {
        assert!(matches!(parse_bytes(b""), Err(DecodeError::EmptyFile)));
        assert!(matches!(parse_delimited("  \n", ','), Err(DecodeError::EmptyFile)));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let err = parse_delimited("a→b", '→').unwrap_err();
        assert!(matches!(err, DecodeError::InvalidDelimiter('→')));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_csv() {
        let result = parse_bytes(b"Vin;Price\nA;100\nB;200").unwrap();

        assert_eq!(
            result.format,
            SourceFormat::Delimited { encoding: "utf-8".into(), delimiter: ';' }
        );
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.table.headers(), &["Vin", "Price"]);
    }

    #[test]
    fn test_spreadsheet_magic() {
        assert!(is_spreadsheet(b"PK\x03\x04rest"));
        assert!(is_spreadsheet(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0]));
        assert!(!is_spreadsheet(b"Vin,Price"));
    }

    #[test]
    fn test_corrupt_spreadsheet_is_decode_error() {
        let err = parse_bytes(b"PK\x03\x04not really a zip").unwrap_err();
        assert!(matches!(err, DecodeError::Spreadsheet(_)));
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(cell_to_value(&Data::Float(78701.0)), Value::from(78701));
        assert_eq!(cell_to_value(&Data::Float(850.5)), serde_json::json!(850.5));
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(cell_to_value(&Data::String("TX".into())), serde_json::json!("TX"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }
}
