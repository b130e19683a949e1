//! Human-readable file size formatting
//!
//! Provides consistent size display for uploaded CSV and video files and
//! for size-limit messages.

/// Unit labels, base 1024
const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Step between units
const STEP: f64 = 1024.0;

/// Format a byte count as a human-readable size.
///
/// The unit is the largest one that keeps the value at or above 1, capped
/// at TB. The value is rounded to two decimals and trailing zeros are
/// dropped.
///
/// # Examples
///
/// ```
/// use tca_common::human_size::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(512), "512 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// Round to two decimals and strip trailing zeros (`1.50` → `1.5`, `2.00` → `2`)
fn trim_decimals(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
