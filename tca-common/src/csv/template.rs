//! Downloadable CSV template
//!
//! The template doubles as the schema documentation for imports: the
//! canonical header row followed by two example rows.

/// Suggested file name when the template is saved
pub const TEMPLATE_FILE_NAME: &str = "test_template.csv";

/// Canonical header row
pub const TEMPLATE_HEADERS: [&str; 4] = ["test_id", "test_title", "test_description", "assertion"];

const EXAMPLE_ROWS: [&str; 2] = [
    "LOGIN_001,Valid Login Test,Test successful login with valid credentials,User should be redirected to dashboard",
    "LOGIN_002,Invalid Login Test,Test login with invalid credentials,Error message should be displayed",
];

/// Template text, lines joined with `\n` and no trailing newline
pub fn generate_template() -> String {
    let mut lines = Vec::with_capacity(1 + EXAMPLE_ROWS.len());
    lines.push(TEMPLATE_HEADERS.join(","));
    lines.extend(EXAMPLE_ROWS.iter().map(|row| row.to_string()));
    lines.join("\n")
}
