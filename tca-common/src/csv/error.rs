//! CSV pipeline errors
//!
//! Messages are shown to the user verbatim, so they are phrased for people
//! editing a spreadsheet rather than for developers.

use std::fmt;

use thiserror::Error;

/// A column every CSV import must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredColumn {
    Id,
    Title,
}

impl RequiredColumn {
    /// Column name used in "missing column" messages
    pub fn column_label(self) -> &'static str {
        match self {
            RequiredColumn::Id => "Test ID",
            RequiredColumn::Title => "Title",
        }
    }

    /// Example header names accepted for this column
    pub fn alias_hint(self) -> &'static str {
        match self {
            RequiredColumn::Id => "test_id, id, etc.",
            RequiredColumn::Title => "test_title, title, name, etc.",
        }
    }
}

impl fmt::Display for RequiredColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredColumn::Id => f.write_str("Test ID"),
            RequiredColumn::Title => f.write_str("Test Title"),
        }
    }
}

/// CSV parse failures; all are fatal to the parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    /// Blank input
    #[error("CSV file is empty")]
    EmptyInput,

    /// Fewer than a header row and one data row
    #[error("CSV must have at least a header row and one data row")]
    InsufficientRows,

    /// No header matched a required column
    #[error("CSV must contain a {} column ({})", .0.column_label(), .0.alias_hint())]
    MissingRequiredColumn(RequiredColumn),

    /// A data row left a required field empty
    #[error("{0} is required")]
    MissingField(RequiredColumn),

    /// Every data row was dropped
    #[error("No valid test data found in CSV")]
    NoValidRecords,

    /// Row-level failure with its line number (header is line 1)
    #[error("Error parsing line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<CsvError>,
    },
}

impl CsvError {
    /// Wrap a row-level error with the line it came from
    pub fn at_line(line: usize, source: CsvError) -> Self {
        CsvError::Line {
            line,
            source: Box::new(source),
        }
    }
}
