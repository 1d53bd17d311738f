//! In-memory table: ordered named columns over rows of typed cells

use std::fmt;

/// Maximum integer digits for a text value to be read as a number.
/// Longer digit runs (inventory IDs) stay text so they survive exactly.
const MAX_NUMERIC_DIGITS: usize = 15;

/// One table value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    /// Blank / missing marker
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Type a raw text field: blank → `Empty`, plain decimal → `Number`, else `Text`.
    ///
    /// Only `-?digits(.digits)?` without leading zeros counts as a decimal,
    /// so collector numbers like `"007"` or `"12a"` stay text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if is_plain_decimal(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                return Self::Number(n);
            }
        }
        Self::Text(raw.to_string())
    }

    /// Text cell; an empty string is `Empty`
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    /// Number cell; NaN and infinities are `Empty`
    pub fn number(n: f64) -> Self {
        if n.is_finite() {
            Self::Number(n)
        } else {
            Self::Empty
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Identity used for key comparisons; `None` for blank cells.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Self::Number(_) => Some(self.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

fn is_plain_decimal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let int_ok = !int.is_empty()
        && int.len() <= MAX_NUMERIC_DIGITS
        && int.bytes().all(|b| b.is_ascii_digit())
        && (int == "0" || !int.starts_with('0'));
    let frac_ok = frac.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
    int_ok && frac_ok
}

/// Ordered column names plus rows of cells.
///
/// Every row has exactly one cell per column. Column names are not
/// required to be unique until [`dedup_columns`](Frame::dedup_columns) runs;
/// name lookups resolve to the first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Append a row, padding with `Empty` or truncating to the frame width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of the named column, top to bottom
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Cell> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Rename every column called `from`; returns how many were renamed.
    pub fn rename_column(&mut self, from: &str, to: &str) -> usize {
        let mut renamed = 0;
        for col in self.columns.iter_mut().filter(|c| *c == from) {
            *col = to.to_string();
            renamed += 1;
        }
        renamed
    }

    /// Drop repeated column names, keeping the first occurrence.
    /// Returns the names of dropped columns.
    pub fn dedup_columns(&mut self) -> Vec<String> {
        let mut keep = Vec::with_capacity(self.columns.len());
        let mut dropped = Vec::new();
        for (i, name) in self.columns.iter().enumerate() {
            if self.columns[..i].contains(name) {
                dropped.push(name.clone());
            } else {
                keep.push(i);
            }
        }
        if dropped.is_empty() {
            return dropped;
        }
        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            *row = keep.iter().map(|&i| std::mem::take(&mut row[i])).collect();
        }
        dropped
    }

    /// Keep rows for which `keep` returns true; returns how many were dropped.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[Cell]) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Side-by-side concatenation by row position.
    ///
    /// Both frames must have the same number of rows.
    pub fn hconcat(self, other: Frame) -> Frame {
        debug_assert_eq!(self.rows.len(), other.rows.len(), "hconcat row mismatch");
        let mut columns = self.columns;
        columns.extend(other.columns);
        let rows = self
            .rows
            .into_iter()
            .zip(other.rows)
            .map(|(mut left, right)| {
                left.extend(right);
                left
            })
            .collect();
        Frame { columns, rows }
    }

    /// Stack `other` below `self`, aligning columns by name.
    ///
    /// The result has `self`'s columns followed by any of `other`'s not
    /// already present. Cells absent from either side are `Empty`.
    pub fn vconcat(self, other: Frame) -> Frame {
        let mut columns = self.columns;
        for name in &other.columns {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        let width = columns.len();

        let mut rows = self.rows;
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }

        let mapping: Vec<Option<usize>> = other
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // Repeated names in `other` map only their first occurrence
                if other.columns[..i].contains(name) {
                    return None;
                }
                columns.iter().position(|c| c == name)
            })
            .collect();
        rows.extend(other.rows.into_iter().map(|row| {
            let mut out = vec![Cell::Empty; width];
            for (cell, target) in row.into_iter().zip(&mapping) {
                if let Some(t) = target {
                    out[*t] = cell;
                }
            }
            out
        }));

        Frame { columns, rows }
    }

    /// Project onto exactly `names`, in order. Missing columns are `Empty`;
    /// columns not in `names` are dropped.
    pub fn conform<S: AsRef<str>>(&self, names: &[S]) -> Frame {
        let sources: Vec<Option<usize>> = names
            .iter()
            .map(|n| self.column_index(n.as_ref()))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| src.map(|i| row[i].clone()).unwrap_or_default())
                    .collect()
            })
            .collect();
        Frame {
            columns: names.iter().map(|n| n.as_ref().to_string()).collect(),
            rows,
        }
    }
}
