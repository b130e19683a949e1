//! Sample suites and tests
//!
//! Used only when storage holds nothing yet, and as the last fallback when
//! looking a suite up by id.

use chrono::{DateTime, TimeZone, Utc};
use tca_common::{Suite, Test, TestType};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn suite(id: &str, name: &str, created_at: DateTime<Utc>) -> Suite {
    Suite {
        id: id.to_string(),
        suite_name: name.to_string(),
        created_at,
        updated_at: created_at,
        test_count: 0,
    }
}

fn test(
    id: &str,
    suite_id: &str,
    (test_id, title, description, assertion): (&str, &str, &str, &str),
    test_type: TestType,
    created_at: DateTime<Utc>,
) -> Test {
    Test {
        id: id.to_string(),
        suite_id: suite_id.to_string(),
        test_id: test_id.to_string(),
        test_title: title.to_string(),
        test_description: description.to_string(),
        assertion: assertion.to_string(),
        test_type,
        created_at,
        updated_at: created_at,
        video_file: None,
        video_url: None,
        transcription_status: None,
    }
}

/// Sample suites, with `test_count` left at zero (counts are derived)
pub fn sample_suites() -> Vec<Suite> {
    vec![
        suite("suite-1", "Login Flow Tests", at(2024, 1, 15, 10, 30)),
        suite("suite-2", "E-commerce Checkout", at(2024, 1, 14, 14, 20)),
        suite("suite-3", "API Endpoint Tests", at(2024, 1, 13, 9, 15)),
    ]
}

/// Sample tests belonging to [`sample_suites`]
pub fn sample_tests() -> Vec<Test> {
    vec![
        test(
            "test-1-1",
            "suite-1",
            (
                "LOGIN_001",
                "Valid Login",
                "Test successful login with valid credentials",
                "User should be redirected to dashboard",
            ),
            TestType::Manual,
            at(2024, 1, 15, 10, 35),
        ),
        test(
            "test-1-2",
            "suite-1",
            (
                "LOGIN_002",
                "Invalid Login",
                "Test login with invalid credentials",
                "Error message should be displayed",
            ),
            TestType::Manual,
            at(2024, 1, 15, 10, 40),
        ),
        test(
            "test-2-1",
            "suite-2",
            (
                "CHECKOUT_001",
                "Add to Cart",
                "Test adding product to cart",
                "Product should appear in cart",
            ),
            TestType::Csv,
            at(2024, 1, 14, 14, 25),
        ),
        test(
            "test-3-1",
            "suite-3",
            (
                "API_001",
                "GET Users Endpoint",
                "Test GET /api/users endpoint",
                "Should return 200 status with users array",
            ),
            TestType::Video,
            at(2024, 1, 13, 9, 20),
        ),
    ]
}
