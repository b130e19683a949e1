//! Pre-upload CSV file validation

use std::collections::HashSet;

use tracing::debug;

use super::parser::parse_csv;
use crate::human_size::format_file_size;
use crate::models::UploadedFile;
use crate::validation::ValidationResult;

/// Largest accepted CSV upload (5 MiB)
pub const MAX_CSV_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Record count above which a "consider splitting" warning is raised
pub const LARGE_IMPORT_THRESHOLD: usize = 100;

/// Validate a CSV upload.
///
/// Extension, size, parseability, record count and duplicate test ids are
/// checked independently and all findings are returned together. Only a
/// parse failure skips the checks that need parsed records.
pub fn validate_file(file: &UploadedFile) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !file.name.to_lowercase().ends_with(".csv") {
        errors.push("File must be a CSV file (.csv extension)".to_string());
    }

    let size = file.size();
    if size > MAX_CSV_FILE_SIZE {
        errors.push(format!(
            "File size must be less than {}",
            format_file_size(MAX_CSV_FILE_SIZE)
        ));
    }
    if size == 0 {
        errors.push("File is empty".to_string());
    }

    match parse_csv(&file.text()) {
        Ok(parsed) => {
            warnings.extend(parsed.warnings);

            let count = parsed.records.len();
            if count > LARGE_IMPORT_THRESHOLD {
                warnings.push(format!(
                    "Large number of tests detected ({}). Consider splitting into smaller files.",
                    count
                ));
            }

            let duplicates = duplicate_test_ids(parsed.records.iter().map(|r| r.test_id.as_str()));
            if !duplicates.is_empty() {
                errors.push(format!("Duplicate test IDs found: {}", duplicates.join(", ")));
            }
        }
        Err(e) => errors.push(format!("Failed to parse CSV: {}", e)),
    }

    let result = ValidationResult::from_parts(errors, warnings);
    debug!(
        file = %file.name,
        size = %format_file_size(size),
        valid = result.is_valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validated CSV upload"
    );
    result
}

/// Distinct ids that occur more than once, in order of their second sighting
fn duplicate_test_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}
