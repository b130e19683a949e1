//! CSV ingestion pipeline
//!
//! Turns a user-supplied CSV file into validated [`Record`]s:
//! - [`parse_csv_line`]: quote-aware field splitting for one line
//! - [`validate_headers`]: alias-tolerant required-column check
//! - [`build_record`]: header-to-field mapping with defaults
//! - [`parse_csv_text`]: the whole file, with per-line error context
//! - [`generate_template`]: canonical header row plus two example rows
//! - [`validate_file`]: pre-upload checks that accumulate errors and warnings
//!
//! Quoted fields may contain commas and `""` escapes but not newlines; every
//! record is a single line.

mod error;
mod parser;
mod template;
mod validation;

pub use error::{CsvError, RequiredColumn};
pub use parser::{
    build_record, classify_header, parse_csv, parse_csv_line, parse_csv_text, validate_headers,
    ColumnKind, HeaderReport, ParsedCsv, Record, DEFAULT_ASSERTION, DEFAULT_DESCRIPTION,
    KNOWN_HEADER_PATTERNS,
};
pub use template::{generate_template, TEMPLATE_FILE_NAME, TEMPLATE_HEADERS};
pub use validation::{validate_file, LARGE_IMPORT_THRESHOLD, MAX_CSV_FILE_SIZE};
