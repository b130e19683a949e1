//! Suite and test catalog
//!
//! The data-access layer over a [`KeyValueStore`]. Both collections are
//! loaded together on first access and mirrored in memory; every mutation
//! works on a copy, persists the changed collection and only then commits
//! the copy to the mirror, so a failed write leaves the mirror untouched.
//!
//! Each operation first awaits its configured latency, then runs to
//! completion under the mirror lock. Separate operations are not isolated
//! from each other beyond that: the later write wins.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use tca_common::config::LatencyConfig;
use tca_common::csv::parse_csv_text;
use tca_common::models::{NewSuite, SuitePatch, TestInput, TestUpdate, UploadedFile, VideoUpload};
use tca_common::{Error, Result, Suite, Test};

use crate::bootstrap::{sample_suites, sample_tests};
use crate::kv::KeyValueStore;

/// Store key holding the suite collection
pub const SUITES_KEY: &str = "authoring-textui-suites";

/// Store key holding the flat test collection
pub const TESTS_KEY: &str = "authoring-textui-tests";

#[derive(Debug, Clone, Default)]
struct Collections {
    suites: Vec<Suite>,
    tests: Vec<Test>,
}

impl Collections {
    fn has_suite(&self, suite_id: &str) -> bool {
        self.suites.iter().any(|s| s.id == suite_id)
    }

    fn require_suite(&self, suite_id: &str) -> Result<()> {
        if self.has_suite(suite_id) {
            Ok(())
        } else {
            Err(Error::SuiteNotFound(suite_id.to_string()))
        }
    }
}

/// Outcome of reading one collection from the store
enum Stored<T> {
    Present(Vec<T>),
    Absent,
    Unreadable,
}

/// Copy of `suites` with every `test_count` recomputed from `tests`
fn with_counts(suites: &[Suite], tests: &[Test]) -> Vec<Suite> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for test in tests {
        *counts.entry(test.suite_id.as_str()).or_default() += 1;
    }
    suites
        .iter()
        .map(|suite| Suite {
            test_count: counts.get(suite.id.as_str()).copied().unwrap_or(0),
            ..suite.clone()
        })
        .collect()
}

/// Trimmed `value`, or `InvalidInput` naming `field` when blank
fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidInput(format!("{} is required", field)))
    } else {
        Ok(trimmed.to_string())
    }
}

fn required_if_set(field: &str, value: Option<String>) -> Result<Option<String>> {
    value.map(|v| required(field, &v)).transpose()
}

/// Suite/test data-access layer
pub struct Catalog {
    store: Arc<dyn KeyValueStore>,
    latency: LatencyConfig,
    cache: Mutex<Option<Collections>>,
}

impl Catalog {
    pub fn new(store: Arc<dyn KeyValueStore>, latency: LatencyConfig) -> Self {
        Self {
            store,
            latency,
            cache: Mutex::new(None),
        }
    }

    // ========================================================================
    // Suites
    // ========================================================================

    /// All suites with `test_count` derived from the test collection
    ///
    /// Seeds the sample data on a fresh store. Derived counts are returned,
    /// never written back.
    pub async fn list_suites(&self) -> Result<Vec<Suite>> {
        tokio::time::sleep(self.latency.read()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());
        Ok(with_counts(&collections.suites, &collections.tests))
    }

    /// Create an empty suite
    pub async fn create_suite(&self, input: NewSuite) -> Result<Suite> {
        let suite_name = required("Suite name", &input.suite_name)?;
        tokio::time::sleep(self.latency.write()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());

        let suite = Suite::new(suite_name);
        let mut suites = collections.suites.clone();
        suites.push(suite.clone());
        self.persist_suites(&suites, &collections.tests)?;
        collections.suites = suites;

        info!(suite_id = %suite.id, suite_name = %suite.suite_name, "Created suite");
        Ok(suite)
    }

    /// Merge `patch` into the suite and refresh its `updated_at`
    pub async fn update_suite(&self, id: &str, patch: SuitePatch) -> Result<Suite> {
        let patch = SuitePatch {
            suite_name: required_if_set("Suite name", patch.suite_name)?,
        };
        tokio::time::sleep(self.latency.write()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());

        let index = collections
            .suites
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::SuiteNotFound(id.to_string()))?;

        let mut suites = collections.suites.clone();
        suites[index].apply(patch);
        self.persist_suites(&suites, &collections.tests)?;
        collections.suites = suites;

        let updated = first(
            with_counts(&collections.suites[index..=index], &collections.tests),
            id,
        )?;
        info!(suite_id = %id, suite_name = %updated.suite_name, "Updated suite");
        Ok(updated)
    }

    /// Remove the suite and every test in it; returns the remaining suites
    pub async fn delete_suite(&self, id: &str) -> Result<Vec<Suite>> {
        tokio::time::sleep(self.latency.write()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());
        collections.require_suite(id)?;

        let suites: Vec<Suite> = collections
            .suites
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        let tests: Vec<Test> = collections
            .tests
            .iter()
            .filter(|t| t.suite_id != id)
            .cloned()
            .collect();
        let removed_tests = collections.tests.len() - tests.len();

        self.persist_tests(&tests)?;
        self.persist_suites(&suites, &tests)?;
        collections.suites = suites;
        collections.tests = tests;

        info!(suite_id = %id, removed_tests, "Deleted suite");
        Ok(with_counts(&collections.suites, &collections.tests))
    }

    /// Look a suite up in memory, then in the store, then in the sample set
    pub async fn get_suite_by_id(&self, id: &str) -> Result<Suite> {
        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());

        if let Some(suite) = collections.suites.iter().find(|s| s.id == id) {
            return first(with_counts(std::slice::from_ref(suite), &collections.tests), id);
        }

        if let Stored::Present(suites) = self.read_collection::<Suite>(SUITES_KEY) {
            if let Some(suite) = suites.iter().find(|s| s.id == id) {
                debug!(suite_id = %id, "Suite found in store only");
                return first(with_counts(std::slice::from_ref(suite), &collections.tests), id);
            }
        }

        if let Some(suite) = sample_suites().into_iter().find(|s| s.id == id) {
            debug!(suite_id = %id, "Suite found in sample data only");
            return first(with_counts(&[suite], &collections.tests), id);
        }

        Err(Error::SuiteNotFound(id.to_string()))
    }

    // ========================================================================
    // Tests
    // ========================================================================

    /// Tests belonging to `suite_id`; empty for an unknown suite
    pub async fn list_tests_by_suite(&self, suite_id: &str) -> Result<Vec<Test>> {
        tokio::time::sleep(self.latency.read()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());
        Ok(collections
            .tests
            .iter()
            .filter(|t| t.suite_id == suite_id)
            .cloned()
            .collect())
    }

    pub async fn get_test_by_id(&self, id: &str) -> Result<Test> {
        tokio::time::sleep(self.latency.read()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());
        collections
            .tests
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Error::TestNotFound(id.to_string()))
    }

    /// Add one manually authored test
    pub async fn add_manual_test(&self, suite_id: &str, input: TestInput) -> Result<Test> {
        let input = TestInput {
            test_title: required("Test title", &input.test_title)?,
            ..input
        };
        tokio::time::sleep(self.latency.write()).await;

        let test = Test::manual(suite_id, input);
        self.append_tests(suite_id, vec![test.clone()]).await?;

        info!(suite_id, id = %test.id, test_id = %test.test_id, "Added manual test");
        Ok(test)
    }

    /// Parse `file` as CSV and add one test per record
    ///
    /// CSV errors are returned unchanged so their message can be shown as-is.
    pub async fn add_csv_tests(&self, suite_id: &str, file: UploadedFile) -> Result<Vec<Test>> {
        tokio::time::sleep(self.latency.csv_import()).await;

        let records = parse_csv_text(&file.text())?;
        let tests: Vec<Test> = records
            .into_iter()
            .map(|record| Test::from_record(suite_id, record))
            .collect();
        self.append_tests(suite_id, tests.clone()).await?;

        info!(suite_id, file = %file.name, imported = tests.len(), "Imported CSV tests");
        Ok(tests)
    }

    /// Add a video test awaiting transcription
    pub async fn add_video_test(&self, suite_id: &str, upload: VideoUpload) -> Result<Test> {
        required("Video file name", &upload.file_name)?;
        tokio::time::sleep(self.latency.video_upload()).await;

        let test = Test::video(suite_id, upload);
        self.append_tests(suite_id, vec![test.clone()]).await?;

        info!(
            suite_id,
            id = %test.id,
            video_file = test.video_file.as_deref().unwrap_or_default(),
            "Added video test"
        );
        Ok(test)
    }

    /// Overwrite the supplied fields of a test
    pub async fn update_test(&self, id: &str, update: TestUpdate) -> Result<Test> {
        let update = TestUpdate {
            test_title: required_if_set("Test title", update.test_title)?,
            ..update
        };
        tokio::time::sleep(self.latency.write()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());

        let index = collections
            .tests
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TestNotFound(id.to_string()))?;

        let mut tests = collections.tests.clone();
        tests[index].apply(update);
        let updated = tests[index].clone();
        self.persist_tests(&tests)?;
        collections.tests = tests;

        info!(id, test_id = %updated.test_id, "Updated test");
        Ok(updated)
    }

    pub async fn delete_test(&self, id: &str) -> Result<()> {
        tokio::time::sleep(self.latency.write()).await;

        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());

        if !collections.tests.iter().any(|t| t.id == id) {
            return Err(Error::TestNotFound(id.to_string()));
        }
        let tests: Vec<Test> = collections
            .tests
            .iter()
            .filter(|t| t.id != id)
            .cloned()
            .collect();
        self.persist_tests(&tests)?;
        collections.tests = tests;

        info!(id, "Deleted test");
        Ok(())
    }

    // ========================================================================
    // Storage
    // ========================================================================

    async fn append_tests(&self, suite_id: &str, new_tests: Vec<Test>) -> Result<()> {
        let mut guard = self.cache.lock().await;
        let collections = guard.get_or_insert_with(|| self.load_collections());
        collections.require_suite(suite_id)?;

        let mut tests = collections.tests.clone();
        tests.extend(new_tests);
        self.persist_tests(&tests)?;
        collections.tests = tests;
        Ok(())
    }

    fn load_collections(&self) -> Collections {
        let stored_suites = self.read_collection::<Suite>(SUITES_KEY);
        let stored_tests = self.read_collection::<Test>(TESTS_KEY);
        let suites_from_store = matches!(stored_suites, Stored::Present(_));

        let suites = match stored_suites {
            Stored::Present(suites) => suites,
            Stored::Absent => {
                let suites = sample_suites();
                self.seed(SUITES_KEY, &suites);
                suites
            }
            Stored::Unreadable => sample_suites(),
        };

        let tests = match stored_tests {
            Stored::Present(tests) => tests,
            // Sample tests only make sense next to the sample suites
            Stored::Absent if suites_from_store => Vec::new(),
            Stored::Absent => {
                let tests = sample_tests();
                self.seed(TESTS_KEY, &tests);
                tests
            }
            Stored::Unreadable => sample_tests(),
        };

        debug!(suites = suites.len(), tests = tests.len(), "Loaded collections");
        Collections { suites, tests }
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Stored<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Stored::Absent,
            Err(e) => {
                let err = Error::StoreUnavailable(format!("reading {}: {}", key, e));
                warn!(key, error = %err, "Using sample data");
                return Stored::Unreadable;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Stored::Present(items),
            Err(e) => {
                let err = Error::StoreUnavailable(format!("decoding {}: {}", key, e));
                warn!(key, error = %err, "Using sample data");
                Stored::Unreadable
            }
        }
    }

    fn seed<T: Serialize>(&self, key: &str, items: &[T]) {
        match self.write_collection(key, items) {
            Ok(()) => info!(key, count = items.len(), "Seeded sample data"),
            Err(e) => warn!(key, error = %e, "Failed to persist sample data"),
        }
    }

    fn persist_suites(&self, suites: &[Suite], tests: &[Test]) -> Result<()> {
        self.write_collection(SUITES_KEY, &with_counts(suites, tests))
    }

    fn persist_tests(&self, tests: &[Test]) -> Result<()> {
        self.write_collection(TESTS_KEY, tests)
    }

    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw)?;
        Ok(())
    }
}

fn first(mut suites: Vec<Suite>, id: &str) -> Result<Suite> {
    suites
        .pop()
        .ok_or_else(|| Error::SuiteNotFound(id.to_string()))
}
