//! Upload validation result shared by CSV and video checks

use serde::Serialize;

/// Outcome of validating an uploaded file
///
/// Errors block the upload, warnings are advisory. Checks accumulate into
/// one result rather than stopping at the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Build a result; `is_valid` is true exactly when `errors` is empty
    pub fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
