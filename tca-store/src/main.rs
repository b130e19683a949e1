//! tca - test-case authoring from the command line
//!
//! Manages suites and tests in a JSON store under the resolved root folder,
//! imports tests from CSV files and registers video uploads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tca_common::config::{
    LatencyConfig, LoggingConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use tca_common::csv::{generate_template, validate_file, TEMPLATE_FILE_NAME};
use tca_common::human_size::format_file_size;
use tca_common::models::{NewSuite, SuitePatch, TestInput, TestUpdate, UploadedFile, VideoUpload};
use tca_common::video::{mime_type_for, supported_video_formats, validate_video_file};
use tca_common::{Suite, Test, ValidationResult};
use tca_store::cli::{Cli, Command, CsvCommand, SuiteCommand, TestCommand, TestFields};
use tca_store::{Catalog, JsonFileStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, origin) = TomlConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    info!("Starting tca v{}", env!("CARGO_PKG_VERSION"));
    origin.log();

    let Cli {
        root_folder,
        no_latency,
        command,
        ..
    } = cli;

    match command {
        Command::Csv(command) => run_csv(command),
        Command::Suites(command) => {
            let catalog = open_catalog(root_folder, no_latency, &config)?;
            run_suites(&catalog, command).await
        }
        Command::Tests(command) => {
            let catalog = open_catalog(root_folder, no_latency, &config)?;
            run_tests(&catalog, command).await
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn open_catalog(
    root_folder: Option<PathBuf>,
    no_latency: bool,
    config: &TomlConfig,
) -> Result<Catalog> {
    let root_folder = RootFolderResolver::new(root_folder, config).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let store = JsonFileStore::open(initializer.store_path())?;
    info!("Store path: {}", store.path().display());

    let latency = if no_latency {
        LatencyConfig::none()
    } else {
        config.latency
    };
    Ok(Catalog::new(Arc::new(store), latency))
}

// ============================================================================
// Suites
// ============================================================================

async fn run_suites(catalog: &Catalog, command: SuiteCommand) -> Result<()> {
    match command {
        SuiteCommand::List => {
            let suites = catalog.list_suites().await?;
            if suites.is_empty() {
                println!("No suites yet. Create one with `tca suites create <name>`.");
            }
            for suite in &suites {
                print_suite(suite);
            }
        }
        SuiteCommand::Create { name } => {
            let suite = catalog.create_suite(NewSuite { suite_name: name }).await?;
            println!("Created suite {}", suite.id);
            print_suite(&suite);
        }
        SuiteCommand::Rename { id, name } => {
            let patch = SuitePatch {
                suite_name: Some(name),
            };
            let suite = catalog.update_suite(&id, patch).await?;
            print_suite(&suite);
        }
        SuiteCommand::Show { id } => {
            let suite = catalog.get_suite_by_id(&id).await?;
            print_suite(&suite);
            for test in catalog.list_tests_by_suite(&id).await? {
                print_test_line(&test);
            }
        }
        SuiteCommand::Delete { id } => {
            let remaining = catalog.delete_suite(&id).await?;
            println!("Deleted suite {} ({} suites left)", id, remaining.len());
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

async fn run_tests(catalog: &Catalog, command: TestCommand) -> Result<()> {
    match command {
        TestCommand::List { suite_id } => {
            let tests = catalog.list_tests_by_suite(&suite_id).await?;
            if tests.is_empty() {
                println!("No tests in {}", suite_id);
            }
            for test in &tests {
                print_test_line(test);
            }
        }
        TestCommand::Show { id } => {
            let test = catalog.get_test_by_id(&id).await?;
            print_test(&test);
        }
        TestCommand::Add { suite_id, fields } => {
            let input = TestInput {
                test_id: fields.test_id.unwrap_or_default(),
                test_title: fields.title.unwrap_or_default(),
                test_description: fields.description.unwrap_or_default(),
                assertion: fields.assertion.unwrap_or_default(),
            };
            let test = catalog.add_manual_test(&suite_id, input).await?;
            print_test(&test);
        }
        TestCommand::Import { suite_id, file } => {
            let upload = UploadedFile::from_path(&file)?;
            let validation = validate_file(&upload);
            report(&validation);
            if !validation.is_valid {
                bail!("{} failed validation", upload.name);
            }

            let size = upload.size();
            let name = upload.name.clone();
            let tests = catalog.add_csv_tests(&suite_id, upload).await?;
            println!(
                "Imported {} tests from {} ({})",
                tests.len(),
                name,
                format_file_size(size)
            );
            for test in &tests {
                print_test_line(test);
            }
        }
        TestCommand::Video { suite_id, file } => {
            let upload = video_upload(&file)?;
            let test = catalog.add_video_test(&suite_id, upload).await?;
            print_test(&test);
        }
        TestCommand::Update { id, fields } => {
            let test = catalog.update_test(&id, test_update(fields)).await?;
            print_test(&test);
        }
        TestCommand::Delete { id } => {
            catalog.delete_test(&id).await?;
            println!("Deleted test {}", id);
        }
    }
    Ok(())
}

fn test_update(fields: TestFields) -> TestUpdate {
    TestUpdate {
        test_id: fields.test_id,
        test_title: fields.title,
        test_description: fields.description,
        assertion: fields.assertion,
    }
}

fn video_upload(path: &Path) -> Result<VideoUpload> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    let size = std::fs::metadata(path)
        .with_context(|| format!("reading {}", path.display()))?
        .len();
    let mime_type = mime_type_for(&file_name).unwrap_or_else(|| {
        eprintln!("Accepted video files: {}", supported_video_formats());
        "application/octet-stream"
    });

    let validation = validate_video_file(&file_name, mime_type, size);
    report(&validation);
    if !validation.is_valid {
        bail!("{} failed validation", file_name);
    }
    println!("Uploading {} ({})", file_name, format_file_size(size));

    Ok(VideoUpload::new(file_name))
}

// ============================================================================
// CSV
// ============================================================================

fn run_csv(command: CsvCommand) -> Result<()> {
    match command {
        CsvCommand::Template { output } => {
            let template = generate_template();
            match output {
                Some(path) => {
                    std::fs::write(&path, &template)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote template to {}", path.display());
                }
                None => {
                    info!("Template suggested file name: {}", TEMPLATE_FILE_NAME);
                    println!("{}", template);
                }
            }
        }
        CsvCommand::Validate { file } => {
            let upload = UploadedFile::from_path(&file)?;
            let validation = validate_file(&upload);
            report(&validation);
            if !validation.is_valid {
                bail!("{} failed validation", upload.name);
            }
            println!("{} is ready to import ({})", upload.name, format_file_size(upload.size()));
        }
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn report(validation: &ValidationResult) {
    for error in &validation.errors {
        eprintln!("error: {}", error);
    }
    for warning in &validation.warnings {
        eprintln!("warning: {}", warning);
    }
}

fn print_suite(suite: &Suite) {
    println!(
        "{}  {}  ({} tests, updated {})",
        suite.id,
        suite.suite_name,
        suite.test_count,
        suite.updated_at.format("%Y-%m-%d %H:%M")
    );
}

fn print_test_line(test: &Test) {
    println!(
        "  {}  [{}] {}  {}",
        test.id, test.test_type, test.test_id, test.test_title
    );
}

fn print_test(test: &Test) {
    println!("{} ({})", test.test_title, test.id);
    println!("  Suite:       {}", test.suite_id);
    println!("  Test ID:     {}", test.test_id);
    println!("  Type:        {}", test.test_type);
    println!("  Description: {}", test.test_description);
    println!("  Assertion:   {}", test.assertion);
    if let Some(video_file) = &test.video_file {
        println!("  Video:       {}", video_file);
    }
    if let Some(status) = test.transcription_status {
        println!("  Transcript:  {}", status);
    }
}
