//! # Test-Case Authoring Common Library
//!
//! Shared code for the authoring tool including:
//! - Suite and test models (persisted JSON layout)
//! - CSV ingestion pipeline (parsing, header normalization, validation, template)
//! - Video upload validation
//! - Configuration loading and root folder resolution
//! - Utility functions (ids, timestamps, human-readable sizes)

pub mod config;
pub mod csv;
pub mod error;
pub mod human_size;
pub mod models;
pub mod time;
pub mod uuid_utils;
pub mod validation;
pub mod video;

pub use error::{Error, Result};
pub use models::{Suite, Test, TestType, TranscriptionStatus};
pub use validation::ValidationResult;
