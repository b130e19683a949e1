//! Suite and test models
//!
//! Field names match the persisted JSON layout (`suite_name`, `created_at`,
//! `type`, ...), so these structs are serialized as-is into the store.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::csv::Record;
use crate::time::{now, touched_after, unix_millis};
use crate::uuid_utils;
use crate::video::strip_extension;

/// Placeholder description for a freshly uploaded video test
pub const VIDEO_PENDING_DESCRIPTION: &str = "Video test case - transcription pending";

/// Placeholder assertion for a freshly uploaded video test
pub const VIDEO_PENDING_ASSERTION: &str = "To be determined from video transcription";

/// A named grouping of tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    pub id: String,
    pub suite_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived from the test collection whenever suites are read
    #[serde(default)]
    pub test_count: usize,
}

impl Suite {
    /// Create a new, empty suite with a fresh id
    pub fn new(suite_name: impl Into<String>) -> Self {
        let timestamp = now();
        Self {
            id: uuid_utils::suite_id(),
            suite_name: suite_name.into(),
            created_at: timestamp,
            updated_at: timestamp,
            test_count: 0,
        }
    }

    /// Merge a patch over this suite and refresh `updated_at`
    pub fn apply(&mut self, patch: SuitePatch) {
        if let Some(name) = patch.suite_name {
            self.suite_name = name;
        }
        self.updated_at = touched_after(self.updated_at);
    }
}

/// Provenance of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Manual,
    Csv,
    Video,
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TestType::Manual => "manual",
            TestType::Csv => "csv",
            TestType::Video => "video",
        };
        f.write_str(label)
    }
}

/// State of the external transcription job attached to a video test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionStatus {
    Processing,
    Completed,
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TranscriptionStatus::Processing => "processing",
            TranscriptionStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// One test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub id: String,
    pub suite_id: String,
    /// User-facing mnemonic, unique only by convention
    pub test_id: String,
    pub test_title: String,
    pub test_description: String,
    pub assertion: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_file: Option<String>,
    /// Preview handle owned by the video collaborator; never persisted
    #[serde(skip)]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription_status: Option<TranscriptionStatus>,
}

impl Test {
    fn blank(suite_id: &str, test_type: TestType) -> Self {
        let timestamp = now();
        Self {
            id: uuid_utils::test_id(),
            suite_id: suite_id.to_string(),
            test_id: String::new(),
            test_title: String::new(),
            test_description: String::new(),
            assertion: String::new(),
            test_type,
            created_at: timestamp,
            updated_at: timestamp,
            video_file: None,
            video_url: None,
            transcription_status: None,
        }
    }

    /// Build a manually authored test; a blank `test_id` becomes `TEST_<millis>`
    pub fn manual(suite_id: &str, input: TestInput) -> Self {
        let test_id = if input.test_id.trim().is_empty() {
            format!("TEST_{}", unix_millis())
        } else {
            input.test_id
        };
        Self {
            test_id,
            test_title: input.test_title,
            test_description: input.test_description,
            assertion: input.assertion,
            ..Self::blank(suite_id, TestType::Manual)
        }
    }

    /// Build a test from a parsed CSV record
    pub fn from_record(suite_id: &str, record: Record) -> Self {
        Self {
            test_id: record.test_id,
            test_title: record.test_title,
            test_description: record.test_description,
            assertion: record.assertion,
            ..Self::blank(suite_id, TestType::Csv)
        }
    }

    /// Build a pending video test; transcription is left to an external job
    pub fn video(suite_id: &str, upload: VideoUpload) -> Self {
        Self {
            test_id: format!("VIDEO_{}", unix_millis()),
            test_title: strip_extension(&upload.file_name).to_string(),
            test_description: VIDEO_PENDING_DESCRIPTION.to_string(),
            assertion: VIDEO_PENDING_ASSERTION.to_string(),
            video_file: Some(upload.file_name),
            video_url: upload.preview_url,
            transcription_status: Some(TranscriptionStatus::Processing),
            ..Self::blank(suite_id, TestType::Video)
        }
    }

    /// Overwrite the supplied fields and refresh `updated_at`
    ///
    /// `id`, `suite_id`, `type` and `created_at` are never changed.
    pub fn apply(&mut self, update: TestUpdate) {
        if let Some(test_id) = update.test_id {
            self.test_id = test_id;
        }
        if let Some(title) = update.test_title {
            self.test_title = title;
        }
        if let Some(description) = update.test_description {
            self.test_description = description;
        }
        if let Some(assertion) = update.assertion {
            self.assertion = assertion;
        }
        self.updated_at = touched_after(self.updated_at);
    }
}

/// Input for creating a suite
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSuite {
    pub suite_name: String,
}

/// Mutable suite fields; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuitePatch {
    pub suite_name: Option<String>,
}

/// Manual test entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestInput {
    #[serde(default)]
    pub test_id: String,
    pub test_title: String,
    #[serde(default)]
    pub test_description: String,
    #[serde(default)]
    pub assertion: String,
}

/// Mutable test fields; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestUpdate {
    pub test_id: Option<String>,
    pub test_title: Option<String>,
    pub test_description: Option<String>,
    pub assertion: Option<String>,
}

/// What the video collaborator hands over: a file name and, optionally,
/// the preview URL it created
#[derive(Debug, Clone, Default)]
pub struct VideoUpload {
    pub file_name: String,
    pub preview_url: Option<String>,
}

impl VideoUpload {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            preview_url: None,
        }
    }
}

/// A user-selected file: its name and raw content
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Content decoded as UTF-8 (invalid sequences replaced)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}
