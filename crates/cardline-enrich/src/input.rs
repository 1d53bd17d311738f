//! Tabular file loading (CSV and spreadsheet workbooks)

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use cardline_core::Error;

use crate::frame::{Cell, Frame};
use crate::schema::Schema;

/// Extensions read through calamine; everything else is CSV
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Validated input rows
#[derive(Debug)]
pub struct InputTable {
    pub path: PathBuf,
    pub frame: Frame,
    /// Rows dropped for lacking the key
    pub skipped: usize,
}

/// Load the inventory export and validate it against `schema`.
///
/// Fails with `SchemaInvalid` if the key column is absent. Rows with a
/// blank key are dropped and counted in `skipped`.
pub fn load_input(path: &Path, schema: &Schema) -> Result<InputTable, Error> {
    let mut frame = read_table(path, None)?;
    let key = frame
        .column_index(schema.key_column)
        .ok_or_else(|| Error::SchemaInvalid {
            column: schema.key_column.to_string(),
            path: path.to_path_buf(),
        })?;
    let skipped = frame.retain_rows(|row| !row[key].is_empty());
    if skipped > 0 {
        log::warn!(
            "{}: skipped {skipped} rows without '{}'",
            path.display(),
            schema.key_column
        );
    }
    Ok(InputTable {
        path: path.to_path_buf(),
        frame,
        skipped,
    })
}

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Read any supported table. `sheet` selects a worksheet by name when the
/// file is a workbook that has it; otherwise the first sheet is used.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Frame, Error> {
    if is_workbook(path) {
        read_workbook(path, sheet)
    } else {
        read_csv(path)
    }
}

/// Read a CSV file with a header row.
///
/// Fields that are not valid UTF-8 decode as Latin-1. A leading byte order
/// mark on the first header is dropped.
pub fn read_csv(path: &Path) -> Result<Frame, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers = reader
        .byte_headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = decode(h);
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h
            }
        })
        .collect();
    let mut frame = Frame::new(headers);

    let mut record = csv::ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .map_err(|e| csv_error(path, e))?
    {
        frame.push_row(record.iter().map(|f| Cell::infer(&decode(f))).collect());
    }
    log::debug!("{}: {} CSV rows", path.display(), frame.len());
    Ok(frame)
}

/// Read one worksheet; the first row is the header.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Frame, Error> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::spreadsheet(path, e))?;
    let names = workbook.sheet_names();
    let name = sheet
        .filter(|s| names.iter().any(|n| n.as_str() == *s))
        .map(str::to_string)
        .or_else(|| names.first().cloned())
        .ok_or_else(|| Error::spreadsheet(path, "workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| Error::spreadsheet(path, e))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Frame::default());
    };
    let mut frame = Frame::new(header.iter().map(|d| d.to_string()).collect());
    for row in rows {
        frame.push_row(row.iter().map(data_cell).collect());
    }
    log::debug!("{} [{name}]: {} rows", path.display(), frame.len());
    Ok(frame)
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::number(*i as f64),
        Data::Float(f) => Cell::number(*f),
        Data::String(s) => Cell::text(s.as_str()),
        Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => Cell::number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
    }
}

/// UTF-8 if valid, else Latin-1 (each byte is one code point)
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn csv_error(path: &Path, e: csv::Error) -> Error {
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => Error::io(path, io),
        _ => Error::spreadsheet(path, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn csv_with_types() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "export.csv",
            b"Name,Quantity,Collector number,Scryfall ID\nElves,2,007,a1\nRing,1,,b2\n",
        );
        let frame = read_csv(&path).unwrap();
        assert_eq!(
            frame.columns(),
            ["Name", "Quantity", "Collector number", "Scryfall ID"]
        );
        assert_eq!(frame.rows()[0][1], Cell::Number(2.0));
        assert_eq!(frame.rows()[0][2], Cell::text("007"));
        assert_eq!(frame.rows()[1][2], Cell::Empty);
    }

    #[test]
    fn csv_strips_bom() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bom.csv", b"\xef\xbb\xbfScryfall ID,Name\nx,y\n");
        let frame = read_csv(&path).unwrap();
        assert_eq!(frame.columns()[0], "Scryfall ID");
    }

    #[test]
    fn csv_latin1_fallback() {
        let dir = TempDir::new().unwrap();
        // "Jötun" in Latin-1
        let path = write(&dir, "latin1.csv", b"Name,Scryfall ID\nJ\xf6tun,a1\n");
        let frame = read_csv(&path).unwrap();
        assert_eq!(frame.rows()[0][0], Cell::text("Jötun"));
    }

    #[test]
    fn csv_short_rows_are_padded() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "short.csv", b"a,b,c\n1\n");
        let frame = read_csv(&path).unwrap();
        assert_eq!(frame.rows()[0], vec![Cell::Number(1.0), Cell::Empty, Cell::Empty]);
    }

    #[test]
    fn load_input_requires_key() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "nokey.csv", b"Name,Quantity\nElves,1\n");
        let err = load_input(&path, &Schema::default()).unwrap_err();
        match err {
            Error::SchemaInvalid { column, .. } => assert_eq!(column, "Scryfall ID"),
            other => panic!("expected SchemaInvalid, got {other}"),
        }
    }

    #[test]
    fn load_input_key_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "case.csv", b"scryfall id\na1\n");
        assert!(matches!(
            load_input(&path, &Schema::default()),
            Err(Error::SchemaInvalid { .. })
        ));
    }

    #[test]
    fn load_input_drops_blank_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "blank.csv", b"Name,Scryfall ID\nA,a1\nB,\nC,  \nD,d4\n");
        let input = load_input(&path, &Schema::default()).unwrap();
        assert_eq!(input.frame.len(), 2);
        assert_eq!(input.skipped, 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err}");
    }

    #[test]
    fn workbook_detection() {
        assert!(is_workbook(Path::new("a.xlsx")));
        assert!(is_workbook(Path::new("a.XLSX")));
        assert!(is_workbook(Path::new("a.ods")));
        assert!(!is_workbook(Path::new("a.csv")));
        assert!(!is_workbook(Path::new("noext")));
    }
}
