// ============================================================
// TABLE LOADERS
// ============================================================
// CSV and XLSX survey exports into a ResponseTable

mod csv_parser;
mod xlsx_reader;

use std::path::Path;

use crate::domain::error::{AppError, Result};
use crate::domain::survey::ResponseTable;

pub use csv_parser::CsvParser;
pub use xlsx_reader::read_first_sheet;

/// Loads a survey table, picking the reader from the file extension.
pub fn load_table(path: &Path) -> Result<ResponseTable> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" | "tsv" | "txt" => CsvParser::new().parse_file(path),
        "xlsx" | "xlsm" => read_first_sheet(path),
        other => Err(AppError::ValidationError(format!(
            "Unsupported survey file type: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.CSV");
        std::fs::write(&path, "ความคิดเห็น\nดีมาก\n").unwrap();
        assert_eq!(load_table(&path).unwrap().row_count(), 1);

        assert!(matches!(
            load_table(&dir.path().join("survey.pdf")),
            Err(AppError::ValidationError(_))
        ));
    }
}
