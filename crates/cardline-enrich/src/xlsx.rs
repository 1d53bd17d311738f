//! Spreadsheet output
//!
//! The workbook is rendered to memory and then written tmp → rename, so a
//! failed run never leaves a truncated output in place of the previous one.

use std::path::Path;

use cardline_core::{Error, write_atomic};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::frame::{Cell, Frame};
use crate::input::read_table;

/// Excel's column width limit, in characters
pub const MAX_COLUMN_WIDTH: usize = 255;

/// Width of each column: widest rendered value (header included) + `padding`,
/// capped at [`MAX_COLUMN_WIDTH`]
pub fn column_widths(frame: &Frame, padding: usize) -> Vec<usize> {
    frame
        .columns()
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let widest = frame
                .rows()
                .iter()
                .map(|row| row[i].to_string().chars().count())
                .fold(header.chars().count(), usize::max);
            (widest + padding).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Render `frame` as a single-sheet workbook with bold headers, fitted
/// column widths, and an autofilter over the whole data extent.
pub fn render_workbook(
    frame: &Frame,
    sheet_name: &str,
    padding: usize,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    let header = Format::new().set_bold();
    for (col, name) in frame.columns().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header)?;
    }
    for (r, row) in frame.rows().iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    sheet.write_string(r, col as u16, s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, col as u16, *n)?;
                }
            }
        }
    }

    for (col, width) in column_widths(frame, padding).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width as f64)?;
    }
    if frame.width() > 0 {
        sheet.autofilter(0, 0, frame.len() as u32, (frame.width() - 1) as u16)?;
    }

    workbook.save_to_buffer()
}

/// Render and atomically write the workbook to `path`.
pub fn write_workbook(
    path: &Path,
    frame: &Frame,
    sheet_name: &str,
    padding: usize,
) -> Result<(), Error> {
    let bytes =
        render_workbook(frame, sheet_name, padding).map_err(|e| Error::spreadsheet(path, e))?;
    write_atomic(path, &bytes).map_err(|e| Error::io(path, e))?;
    log::debug!(
        "Wrote {} rows x {} columns to {}",
        frame.len(),
        frame.width(),
        path.display()
    );
    Ok(())
}

/// Previously written output, read from `sheet_name` if present, else
/// the first sheet. A missing file is `None`.
pub fn read_prior(path: &Path, sheet_name: &str) -> Result<Option<Frame>, Error> {
    if !path.is_file() {
        log::debug!("No prior output at {}", path.display());
        return Ok(None);
    }
    read_table(path, Some(sheet_name)).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::read_workbook;
    use tempfile::TempDir;

    fn sample() -> Frame {
        let mut f = Frame::new(vec!["Card Name".into(), "Mana Value".into(), "Scryfall ID".into()]);
        f.push_row(vec![Cell::text("Llanowar Elves"), Cell::Number(1.0), Cell::text("a1")]);
        f.push_row(vec![Cell::text("Emrakul, the Aeons Torn"), Cell::Number(15.0), Cell::text("e1")]);
        f.push_row(vec![Cell::Empty, Cell::Empty, Cell::text("abc-123")]);
        f
    }

    #[test]
    fn widths_are_widest_plus_padding() {
        let widths = column_widths(&sample(), 2);
        // "Emrakul, the Aeons Torn" = 23
        assert_eq!(widths, vec![25, 12, 13]);
    }

    #[test]
    fn long_values_cap_column_width() {
        let mut f = Frame::new(vec!["Notes".into(), "Scryfall ID".into()]);
        f.push_row(vec![Cell::text("x".repeat(400)), Cell::text("a1")]);
        assert_eq!(column_widths(&f, 2), vec![MAX_COLUMN_WIDTH, 13]);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.xlsx");
        write_workbook(&path, &f, "MtG Collection", 2).unwrap();
        let back = read_workbook(&path, None).unwrap();
        assert_eq!(back.rows()[0][0].to_string().len(), 400);
    }

    #[test]
    fn widths_of_header_only_frame() {
        let f = Frame::new(vec!["Quantity".into()]);
        assert_eq!(column_widths(&f, 2), vec![10]);
    }

    #[test]
    fn write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&path, &sample(), "MtG Collection", 2).unwrap();

        assert!(!dir.path().join("out.xlsx.tmp").exists());
        let back = read_workbook(&path, Some("MtG Collection")).unwrap();
        assert_eq!(back.columns(), sample().columns());
        assert_eq!(back.len(), 3);
        assert_eq!(back.rows()[1][1], Cell::Number(15.0));
        assert_eq!(back.rows()[2][0], Cell::Empty);
    }

    #[test]
    fn read_prior_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_prior(&dir.path().join("none.xlsx"), "MtG Collection")
            .unwrap()
            .is_none());
    }

    #[test]
    fn invalid_sheet_name_is_error() {
        assert!(render_workbook(&sample(), "bad[name]", 2).is_err());
    }
}
