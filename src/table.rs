//! In-memory tabular abstraction shared by every pipeline stage.
//!
//! A [`Table`] is an ordered header list plus string-cell rows; an empty
//! (or whitespace-only) cell is the missing value. Raw snapshot files, the
//! unified long table and the filtered table are all `Table`s.

use std::path::Path;

use crate::error::Result;

/// A cell is missing when it is empty after trimming.
pub fn is_missing(cell: &str) -> bool {
    cell.trim().is_empty()
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Index of the first column with this exact header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the first column whose header satisfies the predicate.
    pub fn find_column<F: Fn(&str) -> bool>(&self, pred: F) -> Option<usize> {
        self.headers.iter().position(|h| pred(h))
    }

    /// Indices of all columns whose headers satisfy the predicate, in
    /// header order.
    pub fn find_columns<F: Fn(&str) -> bool>(&self, pred: F) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| pred(h))
            .map(|(i, _)| i)
            .collect()
    }

    /// Append a column. `values` must be one value per existing row.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// New table holding only the rows the predicate keeps.
    pub fn filter_rows<F: Fn(&[String]) -> bool>(&self, keep: F) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }

    /// Parse a CSV document. Ragged rows are padded/truncated to the header
    /// width rather than rejected; source files are not under our control.
    pub fn from_csv_str(data: &str) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(|c| c.to_string()).collect());
        }
        Ok(table)
    }

    /// Parse CSV bytes, falling back from UTF-8 to Latin-1 when the bytes
    /// do not decode.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Table> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Table::from_csv_str(text),
            Err(_) => {
                let text: String = bytes.iter().map(|&b| b as char).collect();
                Table::from_csv_str(&text)
            }
        }
    }

    /// Read a CSV file, with the same encoding fallback as
    /// [`Table::from_csv_bytes`].
    pub fn read_csv(path: &Path) -> Result<Table> {
        let bytes = std::fs::read(path)?;
        Table::from_csv_bytes(&bytes)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Concatenate tables, aligning columns by header name. The unified
    /// header list is the union in first-seen order; cells absent from a
    /// source table are missing. When a table carries duplicate header
    /// names the first non-missing value for the unified column wins.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut headers: Vec<String> = Vec::new();
        for table in &tables {
            for header in &table.headers {
                if !headers.iter().any(|h| h == header) {
                    headers.push(header.clone());
                }
            }
        }

        let mut out = Table::new(headers);
        for table in tables {
            let mapping: Vec<usize> = table
                .headers
                .iter()
                .map(|h| out.headers.iter().position(|u| u == h).unwrap_or_default())
                .collect();
            for row in table.rows {
                let mut unified = vec![String::new(); out.headers.len()];
                for (j, value) in row.into_iter().enumerate() {
                    if j >= mapping.len() {
                        break;
                    }
                    let target = &mut unified[mapping[j]];
                    if target.is_empty() {
                        *target = value;
                    }
                }
                out.rows.push(unified);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let table = Table::from_csv_str("A,B\n1,2\n3,4\n").unwrap();
        assert_eq!(table.headers(), &["A".to_string(), "B".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][0], "3");
    }

    #[test]
    fn pads_ragged_rows() {
        let table = Table::from_csv_str("A,B,C\n1,2\n").unwrap();
        assert_eq!(table.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn concat_aligns_columns_by_name() {
        let a = Table::from_csv_str("A,B\n1,2\n").unwrap();
        let b = Table::from_csv_str("B,C\n5,6\n").unwrap();
        let unified = Table::concat(vec![a, b]);
        assert_eq!(
            unified.headers(),
            &["A".to_string(), "B".to_string(), "C".to_string()]
        );
        assert_eq!(unified.rows()[0], vec!["1", "2", ""]);
        assert_eq!(unified.rows()[1], vec!["", "5", "6"]);
    }

    #[test]
    fn latin1_bytes_decode_via_fallback() {
        // "Café" with a Latin-1 encoded e-acute (0xE9) is invalid UTF-8.
        let bytes = b"Name\nCaf\xe9\n";
        let table = Table::from_csv_bytes(bytes).unwrap();
        assert_eq!(table.rows()[0][0], "Caf\u{e9}");
    }

    #[test]
    fn missing_means_blank_after_trim() {
        assert!(is_missing(""));
        assert!(is_missing("   "));
        assert!(!is_missing("0"));
    }
}
