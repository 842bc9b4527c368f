// ============================================================
// CSV PARSER
// ============================================================
// Survey exports: delimiter sniffing and Thai codepage fallback

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_874;
use tracing::{debug, warn};

use crate::domain::error::AppError;
use crate::domain::survey::ResponseTable;

const UTF8_BOM: &str = "\u{feff}";
const SNIFF_LINES: usize = 10;

/// Reads a survey CSV into a [`ResponseTable`]
#[derive(Debug, Default)]
pub struct CsvParser {
    /// Delimiter character; sniffed from content when `None`
    delimiter: Option<u8>,
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn parse_file(&self, path: &Path) -> Result<ResponseTable, AppError> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.parse_content(&decode(&bytes))
    }

    /// First record is the header row; rows that are entirely blank are dropped.
    pub fn parse_content(&self, content: &str) -> Result<ResponseTable, AppError> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(|header| header.is_empty()) {
            return Err(AppError::InputEmpty("CSV has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            let row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            rows.push(row);
        }

        debug!(
            delimiter = %(delimiter as char),
            columns = headers.len(),
            rows = rows.len(),
            "Parsed CSV"
        );
        Ok(ResponseTable::from_strings(headers, rows))
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<&str> = content.lines().take(SNIFF_LINES).collect();
        if sample_lines.is_empty() {
            return b',';
        }

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;
        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Frequent and consistent across lines
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;
            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }
        best_delimiter
    }
}

/// UTF-8 when valid, otherwise Windows-874 (Thai)
pub(crate) fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, had_errors) = WINDOWS_874.decode(bytes);
            if had_errors {
                warn!("Input is neither UTF-8 nor Windows-874; some characters were replaced");
            }
            content.into_owned()
        }
    }
}
