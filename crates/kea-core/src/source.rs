//! CSV row loading
//!
//! Turns a CSV stream into the header list and `RawRow`s the parser consumes.
//! Reads are flexible: bank exports frequently have ragged rows, and a short
//! row should surface as a per-row parse warning downstream, not an abort.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::models::RawRow;

/// Read headers and rows from any CSV reader.
pub fn rows_from_reader<R: Read>(filename: &str, reader: R) -> Result<(Vec<String>, Vec<RawRow>)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cells: Vec<(String, String)> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                (
                    header.clone(),
                    record.get(i).unwrap_or_default().to_string(),
                )
            })
            .collect();
        rows.push(RawRow::new(filename, cells));
    }

    debug!(filename, rows = rows.len(), "Loaded CSV rows");
    Ok((headers, rows))
}

/// Read headers and rows from a CSV file on disk.
pub fn rows_from_path(path: &Path) -> Result<(Vec<String>, Vec<RawRow>)> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let file = File::open(path)?;
    rows_from_reader(&filename, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_headers_and_rows() {
        let data = "Date,Particulars,Amount\n15/05/2024,Uber Eats,-22.40\n16/05/2024,Salary,1500.00\n";
        let (headers, rows) = rows_from_reader("asb.csv", data.as_bytes()).unwrap();

        assert_eq!(headers, vec!["Date", "Particulars", "Amount"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Particulars"), Some("Uber Eats"));
        assert_eq!(rows[0].source_file, "asb.csv");
    }

    #[test]
    fn test_short_rows_pad_with_empty() {
        let data = "Date,Particulars,Amount\n15/05/2024,Lonely row\n";
        let (_, rows) = rows_from_reader("x.csv", data.as_bytes()).unwrap();
        assert_eq!(rows[0].get("Amount"), Some(""));
    }

    #[test]
    fn test_values_are_trimmed() {
        let data = "Date,Amount\n 15/05/2024 ,  -5.00 \n";
        let (_, rows) = rows_from_reader("x.csv", data.as_bytes()).unwrap();
        assert_eq!(rows[0].get("Date"), Some("15/05/2024"));
    }
}
