// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delimited-text workbook reader (CSV / TSV) built on the `csv` crate.

use pagewright_core::error::{PagewrightError, Result};
use tracing::{debug, instrument};

use crate::traits::WorkbookReader;

/// Reads a delimited-text file as a single-sheet workbook.
///
/// Rows may have differing cell counts. Every row is kept, including the first
/// one; there is no header handling.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedWorkbookReader {
    delimiter: u8,
}

impl DelimitedWorkbookReader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn comma() -> Self {
        Self::new(b',')
    }

    pub fn tab() -> Self {
        Self::new(b'\t')
    }
}

impl WorkbookReader for DelimitedWorkbookReader {
    fn name(&self) -> &str {
        "delimited-text"
    }

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn read_first_sheet(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record.map_err(|err| {
                PagewrightError::UnreadableWorkbook(format!("malformed delimited text: {err}"))
            })?;
            rows.push(
                record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .collect(),
            );
        }

        debug!(rows = rows.len(), "delimited workbook read");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ragged_rows_in_order() {
        let data = b"Item,Qty,Price\nApples,3\n\"Pears, green\",1,0.40\n";
        let rows = DelimitedWorkbookReader::comma().read_first_sheet(data).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Item", "Qty", "Price"]);
        assert_eq!(rows[1], vec!["Apples", "3"]);
        assert_eq!(rows[2][0], "Pears, green");
    }

    #[test]
    fn tab_delimiter() {
        let rows = DelimitedWorkbookReader::tab()
            .read_first_sheet(b"a\tb\nc\td\n")
            .unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn empty_input_has_no_rows() {
        let rows = DelimitedWorkbookReader::comma().read_first_sheet(b"").unwrap();
        assert!(rows.is_empty());
    }
}
