//! Line splitting, header normalization and record construction

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{CsvError, RequiredColumn};

/// Description used when a row supplies none
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Assertion used when a row supplies none
pub const DEFAULT_ASSERTION: &str = "No assertion/expected result provided";

/// Header fragments the importer understands; anything else draws a warning
pub const KNOWN_HEADER_PATTERNS: [&str; 12] = [
    "test_id",
    "id",
    "test_title",
    "title",
    "name",
    "test_description",
    "description",
    "desc",
    "assertion",
    "expected",
    "result",
    "steps",
];

/// A parsed CSV row prior to being persisted as a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub test_id: String,
    pub test_title: String,
    pub test_description: String,
    pub assertion: String,
}

/// Canonical field a header maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    TestId,
    Title,
    Description,
    Assertion,
    /// Folded into the assertion when no assertion column supplied one
    Steps,
    Ignored,
}

/// Classify a header by the alias rules (case-insensitive, surrounding
/// whitespace ignored)
pub fn classify_header(header: &str) -> ColumnKind {
    let h = header.trim().to_lowercase();
    if h.contains("test_id") || h == "id" {
        ColumnKind::TestId
    } else if h.contains("test_title") || h == "title" || h == "name" {
        ColumnKind::Title
    } else if h.contains("test_description") || h == "description" || h == "desc" {
        ColumnKind::Description
    } else if h == "assertion" || h.contains("expected") || h.contains("result") {
        ColumnKind::Assertion
    } else if h == "steps" {
        ColumnKind::Steps
    } else {
        ColumnKind::Ignored
    }
}

fn is_recognized_header(header: &str) -> bool {
    let h = header.to_lowercase();
    KNOWN_HEADER_PATTERNS.iter().any(|pattern| h.contains(pattern))
}

/// Split one CSV line into trimmed fields.
///
/// Commas inside double quotes do not split, and `""` inside a quoted field
/// is a literal quote. Quotes themselves are removed.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    values.push(current.trim().to_string());

    values
}

/// Non-fatal findings from header validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderReport {
    /// Headers that match no known alias; their columns are ignored
    pub unrecognized: Vec<String>,
}

impl HeaderReport {
    /// User-facing warning lines (empty when every header was recognized)
    pub fn warnings(&self) -> Vec<String> {
        if self.unrecognized.is_empty() {
            Vec::new()
        } else {
            vec![format!(
                "Extra headers found (will be ignored): {}",
                self.unrecognized.join(", ")
            )]
        }
    }
}

/// Check that the header row names a test id and a title column.
///
/// Unrecognized headers are collected in the returned report, not rejected.
pub fn validate_headers(headers: &[String]) -> Result<HeaderReport, CsvError> {
    let kinds: Vec<ColumnKind> = headers.iter().map(|h| classify_header(h)).collect();

    if !kinds.contains(&ColumnKind::TestId) {
        return Err(CsvError::MissingRequiredColumn(RequiredColumn::Id));
    }
    if !kinds.contains(&ColumnKind::Title) {
        return Err(CsvError::MissingRequiredColumn(RequiredColumn::Title));
    }

    let unrecognized: Vec<String> = headers
        .iter()
        .filter(|h| !is_recognized_header(h))
        .cloned()
        .collect();

    if !unrecognized.is_empty() {
        warn!(headers = %unrecognized.join(", "), "Extra CSV headers will be ignored");
    }

    Ok(HeaderReport { unrecognized })
}

/// Map one row onto a [`Record`] using the header alias rules.
///
/// Later columns overwrite earlier ones of the same kind. A `steps` column
/// only fills the assertion when nothing has filled it yet. Missing cells
/// read as empty.
pub fn build_record(headers: &[String], values: &[String]) -> Result<Record, CsvError> {
    let mut test_id = String::new();
    let mut test_title = String::new();
    let mut test_description = String::new();
    let mut assertion = String::new();

    for (index, header) in headers.iter().enumerate() {
        let value = values.get(index).map(String::as_str).unwrap_or("");
        match classify_header(header) {
            ColumnKind::TestId => test_id = value.to_string(),
            ColumnKind::Title => test_title = value.to_string(),
            ColumnKind::Description => test_description = value.to_string(),
            ColumnKind::Assertion => assertion = value.to_string(),
            ColumnKind::Steps => {
                if assertion.is_empty() {
                    assertion = format!("Steps: {}", value);
                }
            }
            ColumnKind::Ignored => {}
        }
    }

    if test_id.trim().is_empty() {
        return Err(CsvError::MissingField(RequiredColumn::Id));
    }
    if test_title.trim().is_empty() {
        return Err(CsvError::MissingField(RequiredColumn::Title));
    }
    if test_description.is_empty() {
        test_description = DEFAULT_DESCRIPTION.to_string();
    }
    if assertion.is_empty() {
        assertion = DEFAULT_ASSERTION.to_string();
    }

    Ok(Record {
        test_id,
        test_title,
        test_description,
        assertion,
    })
}

/// Parsed file plus its non-fatal header warnings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsv {
    pub records: Vec<Record>,
    pub warnings: Vec<String>,
}

/// Parse a whole CSV document, keeping header warnings
pub fn parse_csv(text: &str) -> Result<ParsedCsv, CsvError> {
    // Spreadsheet "CSV UTF-8" exports start with a byte-order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(CsvError::EmptyInput);
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(CsvError::InsufficientRows);
    }

    let headers = parse_csv_line(lines[0]);
    let report = validate_headers(&headers)?;

    let mut records = Vec::with_capacity(lines.len() - 1);
    for (index, line) in lines[1..].iter().enumerate() {
        let values = parse_csv_line(line);
        let record =
            build_record(&headers, &values).map_err(|e| CsvError::at_line(index + 2, e))?;
        if !record.test_id.trim().is_empty() {
            records.push(record);
        }
    }

    if records.is_empty() {
        return Err(CsvError::NoValidRecords);
    }

    debug!(records = records.len(), columns = headers.len(), "Parsed CSV");

    Ok(ParsedCsv {
        records,
        warnings: report.warnings(),
    })
}

/// Parse a whole CSV document into records
///
/// Fails on blank input, a missing data row, a missing required column, a
/// bad row (reported with its line number), or when no row survives.
pub fn parse_csv_text(text: &str) -> Result<Vec<Record>, CsvError> {
    parse_csv(text).map(|parsed| parsed.records)
}
