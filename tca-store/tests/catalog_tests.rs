//! Catalog behavior across stores, restarts and failure modes

use std::sync::Arc;

use tca_common::config::LatencyConfig;
use tca_common::csv::{generate_template, CsvError, RequiredColumn};
use tca_common::models::{
    NewSuite, SuitePatch, TestInput, TestUpdate, UploadedFile, VideoUpload,
    VIDEO_PENDING_ASSERTION, VIDEO_PENDING_DESCRIPTION,
};
use tca_common::{Error, Suite, Test, TestType, TranscriptionStatus};
use tca_store::{
    Catalog, JsonFileStore, KeyValueStore, MemoryStore, StoreError, SUITES_KEY, TESTS_KEY,
};

fn memory_catalog() -> Catalog {
    Catalog::new(Arc::new(MemoryStore::new()), LatencyConfig::none())
}

fn suite_input(name: &str) -> NewSuite {
    NewSuite {
        suite_name: name.to_string(),
    }
}

fn manual(test_id: &str, title: &str) -> TestInput {
    TestInput {
        test_id: test_id.to_string(),
        test_title: title.to_string(),
        test_description: "Description".to_string(),
        assertion: "Assertion".to_string(),
    }
}

/// Store whose reads and writes always fail
struct UnreachableStore;

impl KeyValueStore for UnreachableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        )))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
}

// ============================================================================
// Suites
// ============================================================================

#[tokio::test]
async fn test_fresh_store_lists_sample_suites_with_counts() {
    let catalog = memory_catalog();
    let suites = catalog.list_suites().await.unwrap();

    let summary: Vec<(&str, usize)> = suites
        .iter()
        .map(|s| (s.suite_name.as_str(), s.test_count))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Login Flow Tests", 2),
            ("E-commerce Checkout", 1),
            ("API Endpoint Tests", 1),
        ]
    );
}

#[tokio::test]
async fn test_created_suite_is_listed_with_zero_tests() {
    let catalog = memory_catalog();
    let created = catalog.create_suite(suite_input("X")).await.unwrap();
    assert!(created.id.starts_with("suite-"));
    assert_eq!(created.created_at, created.updated_at);

    let suites = catalog.list_suites().await.unwrap();
    let listed = suites.iter().find(|s| s.id == created.id).unwrap();
    assert_eq!(listed.suite_name, "X");
    assert_eq!(listed.test_count, 0);
}

#[tokio::test]
async fn test_blank_suite_name_is_rejected() {
    let catalog = memory_catalog();
    let err = catalog.create_suite(suite_input("   ")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_rename_suite_refreshes_updated_at() {
    let catalog = memory_catalog();
    let created = catalog.create_suite(suite_input("Old")).await.unwrap();

    let renamed = catalog
        .update_suite(
            &created.id,
            SuitePatch {
                suite_name: Some("New".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.suite_name, "New");
    assert_eq!(renamed.created_at, created.created_at);
    assert!(renamed.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_missing_suite_errors() {
    let catalog = memory_catalog();

    let err = catalog
        .update_suite("suite-missing", SuitePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SuiteNotFound(ref id) if id == "suite-missing"));

    let err = catalog.delete_suite("suite-missing").await.unwrap_err();
    assert!(err.is_not_found());

    let err = catalog.get_suite_by_id("suite-missing").await.unwrap_err();
    assert!(matches!(err, Error::SuiteNotFound(_)));
}

#[tokio::test]
async fn test_delete_suite_cascades_to_tests() {
    let catalog = memory_catalog();
    let suite = catalog.create_suite(suite_input("Cascade")).await.unwrap();
    let test = catalog
        .add_manual_test(&suite.id, manual("C_1", "First"))
        .await
        .unwrap();

    let listed = catalog.list_tests_by_suite(&suite.id).await.unwrap();
    assert_eq!(listed, vec![test.clone()]);

    let remaining = catalog.delete_suite(&suite.id).await.unwrap();
    assert!(remaining.iter().all(|s| s.id != suite.id));
    assert!(catalog.list_tests_by_suite(&suite.id).await.unwrap().is_empty());
    assert!(matches!(
        catalog.get_test_by_id(&test.id).await,
        Err(Error::TestNotFound(_))
    ));

    // Other suites keep their tests
    let login = remaining.iter().find(|s| s.id == "suite-1").unwrap();
    assert_eq!(login.test_count, 2);
}

#[tokio::test]
async fn test_get_suite_by_id_derives_count() {
    let catalog = memory_catalog();
    let suite = catalog.get_suite_by_id("suite-1").await.unwrap();
    assert_eq!(suite.suite_name, "Login Flow Tests");
    assert_eq!(suite.test_count, 2);
}

#[tokio::test]
async fn test_get_suite_by_id_falls_back_to_sample_suite() {
    let catalog = memory_catalog();
    catalog.delete_suite("suite-3").await.unwrap();

    let suite = catalog.get_suite_by_id("suite-3").await.unwrap();
    assert_eq!(suite.suite_name, "API Endpoint Tests");
    // Its tests went with it
    assert_eq!(suite.test_count, 0);
    assert!(catalog.list_tests_by_suite("suite-3").await.unwrap().is_empty());
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_manual_test_is_listed_and_counted() {
    let catalog = memory_catalog();
    let suite = catalog.create_suite(suite_input("Manual")).await.unwrap();
    let test = catalog
        .add_manual_test(&suite.id, manual("", "Generated id"))
        .await
        .unwrap();

    assert_eq!(test.test_type, TestType::Manual);
    assert!(test.id.starts_with("test-"));
    assert!(test.test_id.starts_with("TEST_"));

    let listed = catalog.list_tests_by_suite(&suite.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    let counted = catalog.get_suite_by_id(&suite.id).await.unwrap();
    assert_eq!(counted.test_count, 1);
}

#[tokio::test]
async fn test_adding_to_unknown_suite_fails() {
    let catalog = memory_catalog();
    let err = catalog
        .add_manual_test("suite-nope", manual("A", "B"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SuiteNotFound(_)));

    let err = catalog
        .add_video_test("suite-nope", VideoUpload::new("clip.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SuiteNotFound(_)));
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let catalog = memory_catalog();
    let err = catalog
        .add_manual_test("suite-1", manual("A", " "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_list_tests_for_unknown_suite_is_empty() {
    let catalog = memory_catalog();
    assert!(catalog.list_tests_by_suite("suite-nope").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_csv_import_creates_csv_tests() {
    let catalog = memory_catalog();
    let suite = catalog.create_suite(suite_input("Imported")).await.unwrap();
    let file = UploadedFile::new("template.csv", generate_template().into_bytes());

    let created = catalog.add_csv_tests(&suite.id, file).await.unwrap();
    let ids: Vec<_> = created.iter().map(|t| t.test_id.as_str()).collect();
    assert_eq!(ids, vec!["LOGIN_001", "LOGIN_002"]);
    assert!(created.iter().all(|t| t.test_type == TestType::Csv));
    assert!(created.iter().all(|t| t.suite_id == suite.id));
    assert_ne!(created[0].id, created[1].id);

    let suites = catalog.list_suites().await.unwrap();
    let imported = suites.iter().find(|s| s.id == suite.id).unwrap();
    assert_eq!(imported.test_count, 2);
}

#[tokio::test]
async fn test_csv_import_error_is_propagated_unchanged() {
    let catalog = memory_catalog();
    let file = UploadedFile::new("bad.csv", "title,assertion\nx,y\n".as_bytes());

    let err = catalog.add_csv_tests("suite-1", file).await.unwrap_err();
    match err {
        Error::Csv(csv) => {
            assert_eq!(csv, CsvError::MissingRequiredColumn(RequiredColumn::Id));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(catalog.list_tests_by_suite("suite-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_video_test_is_pending_transcription() {
    let catalog = memory_catalog();
    let test = catalog
        .add_video_test(
            "suite-3",
            VideoUpload {
                file_name: "users-endpoint.webm".into(),
                preview_url: Some("blob:local".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(test.test_type, TestType::Video);
    assert!(test.test_id.starts_with("VIDEO_"));
    assert_eq!(test.test_title, "users-endpoint");
    assert_eq!(test.test_description, VIDEO_PENDING_DESCRIPTION);
    assert_eq!(test.assertion, VIDEO_PENDING_ASSERTION);
    assert_eq!(test.video_file.as_deref(), Some("users-endpoint.webm"));
    assert_eq!(test.video_url.as_deref(), Some("blob:local"));
    assert_eq!(test.transcription_status, Some(TranscriptionStatus::Processing));
}

#[tokio::test]
async fn test_update_test_changes_only_patched_fields() {
    let catalog = memory_catalog();
    let original = catalog
        .add_manual_test("suite-2", manual("CHK_9", "Before"))
        .await
        .unwrap();

    let updated = catalog
        .update_test(
            &original.id,
            TestUpdate {
                assertion: Some("After".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.assertion, "After");
    assert_eq!(updated.test_title, original.test_title);
    assert_eq!(updated.test_id, original.test_id);
    assert_eq!(updated.test_description, original.test_description);
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.suite_id, original.suite_id);
    assert_eq!(updated.test_type, original.test_type);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > updated.created_at);

    assert_eq!(catalog.get_test_by_id(&original.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_and_delete_missing_test() {
    let catalog = memory_catalog();
    let err = catalog
        .update_test("test-missing", TestUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TestNotFound(_)));

    let err = catalog.delete_test("test-missing").await.unwrap_err();
    assert!(matches!(err, Error::TestNotFound(_)));
}

#[tokio::test]
async fn test_delete_test_updates_count() {
    let catalog = memory_catalog();
    catalog.delete_test("test-1-1").await.unwrap();

    let suite = catalog.get_suite_by_id("suite-1").await.unwrap();
    assert_eq!(suite.test_count, 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_changes_survive_restart_on_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let (suite, test) = {
        let catalog = Catalog::new(
            Arc::new(JsonFileStore::open(&path).unwrap()),
            LatencyConfig::none(),
        );
        let suite = catalog.create_suite(suite_input("Durable")).await.unwrap();
        let test = catalog
            .add_manual_test(&suite.id, manual("D_1", "Kept"))
            .await
            .unwrap();
        catalog.delete_suite("suite-2").await.unwrap();
        (suite, test)
    };

    let reopened = Catalog::new(
        Arc::new(JsonFileStore::open(&path).unwrap()),
        LatencyConfig::none(),
    );
    let suites = reopened.list_suites().await.unwrap();
    let ids: Vec<_> = suites.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["suite-1", "suite-3", suite.id.as_str()]);

    let tests = reopened.list_tests_by_suite(&suite.id).await.unwrap();
    assert_eq!(tests, vec![test]);
    assert!(reopened.list_tests_by_suite("suite-2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_persisted_layout_uses_expected_keys() {
    let store = Arc::new(MemoryStore::new());
    let catalog = Catalog::new(store.clone(), LatencyConfig::none());
    let suite = catalog.create_suite(suite_input("Layout")).await.unwrap();
    catalog
        .add_manual_test(&suite.id, manual("L_1", "Layout test"))
        .await
        .unwrap();

    let suites: Vec<Suite> =
        serde_json::from_str(&store.get(SUITES_KEY).unwrap().unwrap()).unwrap();
    assert!(suites.iter().any(|s| s.id == suite.id));

    let raw_tests = store.get(TESTS_KEY).unwrap().unwrap();
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw_tests).unwrap();
    let stored = values.iter().find(|v| v["test_id"] == "L_1").unwrap();
    assert_eq!(stored["type"], "manual");
    assert_eq!(stored["suite_id"], suite.id.as_str());

    let tests: Vec<Test> = serde_json::from_str(&raw_tests).unwrap();
    assert_eq!(tests.len(), 5);
}

#[tokio::test]
async fn test_stored_count_is_not_trusted() {
    let store = Arc::new(MemoryStore::new());
    let mut suite = Suite::new("Inflated");
    suite.test_count = 99;
    store
        .set(SUITES_KEY, &serde_json::to_string(&vec![suite.clone()]).unwrap())
        .unwrap();
    store.set(TESTS_KEY, "[]").unwrap();

    let catalog = Catalog::new(store.clone(), LatencyConfig::none());
    let suites = catalog.list_suites().await.unwrap();
    assert_eq!(suites[0].test_count, 0);

    // Reads leave the stored value alone
    let raw: Vec<Suite> = serde_json::from_str(&store.get(SUITES_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(raw[0].test_count, 99);
}

#[tokio::test]
async fn test_unreadable_store_serves_sample_data() {
    let catalog = Catalog::new(Arc::new(UnreachableStore), LatencyConfig::none());

    let suites = catalog.list_suites().await.unwrap();
    assert_eq!(suites.len(), 3);
    assert_eq!(catalog.list_tests_by_suite("suite-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_write_leaves_mirror_unchanged() {
    let catalog = Catalog::new(Arc::new(UnreachableStore), LatencyConfig::none());

    let err = catalog.create_suite(suite_input("Lost")).await.unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)));

    let suites = catalog.list_suites().await.unwrap();
    assert!(suites.iter().all(|s| s.suite_name != "Lost"));
}

#[tokio::test]
async fn test_concurrent_creates_are_all_kept() {
    let catalog = Arc::new(memory_catalog());
    let mut handles = Vec::new();
    for i in 0..8 {
        let catalog = catalog.clone();
        handles.push(tokio::spawn(async move {
            catalog
                .create_suite(suite_input(&format!("Parallel {}", i)))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let suites = catalog.list_suites().await.unwrap();
    assert_eq!(suites.len(), 3 + 8);
}

#[tokio::test(start_paused = true)]
async fn test_operations_wait_for_configured_latency() {
    let latency = LatencyConfig {
        read_ms: 100,
        write_ms: 300,
        csv_import_ms: 1000,
        video_upload_ms: 2000,
    };
    let catalog = Catalog::new(Arc::new(MemoryStore::new()), latency);

    let start = tokio::time::Instant::now();
    catalog.list_suites().await.unwrap();
    assert!(start.elapsed() >= std::time::Duration::from_millis(100));

    let start = tokio::time::Instant::now();
    catalog
        .add_video_test("suite-1", VideoUpload::new("clip.mp4"))
        .await
        .unwrap();
    assert!(start.elapsed() >= std::time::Duration::from_millis(2000));
}
