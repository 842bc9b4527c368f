// ============================================================
// XLSX READER
// ============================================================
// First worksheet of a spreadsheet export as a response table

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use tracing::debug;

use crate::domain::error::AppError;
use crate::domain::survey::{Cell, ResponseTable};

pub fn read_first_sheet(path: &Path) -> Result<ResponseTable, AppError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        AppError::ParseError(format!("Failed to open Excel file {}: {}", path.display(), e))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::InputEmpty("No worksheet found".to_string()))?
        .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| AppError::InputEmpty("Worksheet has no header row".to_string()))?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(to_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Cell::is_empty))
        .collect();

    debug!(columns = headers.len(), rows = rows.len(), "Parsed XLSX");
    Ok(ResponseTable::new(headers, rows))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::String(value) => Cell::from_raw(value),
        other => Cell::from_raw(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_cells_are_typed() {
        assert_eq!(to_cell(&Data::Int(4)), Cell::Number(4.0));
        assert_eq!(to_cell(&Data::Float(3.5)), Cell::Number(3.5));
        assert_eq!(to_cell(&Data::String("5".to_string())), Cell::Number(5.0));
        assert_eq!(
            to_cell(&Data::String("ดีมาก".to_string())),
            Cell::Text("ดีมาก".to_string())
        );
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn missing_workbook_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_first_sheet(&dir.path().join("missing.xlsx"));
        assert!(matches!(result, Err(AppError::ParseError(_))));
    }
}
