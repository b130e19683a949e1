//! Command-line definitions for the `tca` binary

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Author, organize and import test cases grouped into suites
#[derive(Parser, Debug)]
#[command(name = "tca", version, about, long_about = None)]
pub struct Cli {
    /// Root folder holding the store file
    #[arg(long, global = true, value_name = "DIR")]
    pub root_folder: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip the simulated backend latency
    #[arg(long, global = true)]
    pub no_latency: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage suites
    #[command(subcommand)]
    Suites(SuiteCommand),

    /// Manage tests within suites
    #[command(subcommand)]
    Tests(TestCommand),

    /// CSV template and pre-import checks
    #[command(subcommand)]
    Csv(CsvCommand),
}

#[derive(Subcommand, Debug)]
pub enum SuiteCommand {
    /// List suites with their test counts
    List,

    /// Create an empty suite
    Create { name: String },

    /// Rename a suite
    Rename { id: String, name: String },

    /// Show one suite
    Show { id: String },

    /// Delete a suite and all of its tests
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TestCommand {
    /// List the tests of a suite
    List { suite_id: String },

    /// Show one test
    Show { id: String },

    /// Add a manually authored test
    Add {
        suite_id: String,
        #[command(flatten)]
        fields: TestFields,
    },

    /// Import tests from a CSV file
    Import { suite_id: String, file: PathBuf },

    /// Add a video test awaiting transcription
    Video { suite_id: String, file: PathBuf },

    /// Change fields of an existing test
    Update {
        id: String,
        #[command(flatten)]
        fields: TestFields,
    },

    /// Delete one test
    Delete { id: String },
}

/// Editable test fields; omitted flags leave the value unchanged
#[derive(Args, Debug, Default, Clone)]
pub struct TestFields {
    /// User-facing test id (generated when omitted on add)
    #[arg(long)]
    pub test_id: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Expected result
    #[arg(long)]
    pub assertion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CsvCommand {
    /// Print the import template, or write it to a file
    Template {
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check a CSV file without importing it
    Validate { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suite_create() {
        let cli = Cli::try_parse_from(["tca", "suites", "create", "Smoke"]).unwrap();
        match cli.command {
            Command::Suites(SuiteCommand::Create { name }) => assert_eq!(name, "Smoke"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.no_latency);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tca",
            "tests",
            "list",
            "suite-1",
            "--root-folder",
            "/tmp/tca",
            "--no-latency",
        ])
        .unwrap();
        assert_eq!(cli.root_folder, Some(PathBuf::from("/tmp/tca")));
        assert!(cli.no_latency);
    }

    #[test]
    fn test_parse_test_add_fields() {
        let cli = Cli::try_parse_from([
            "tca",
            "tests",
            "add",
            "suite-1",
            "--title",
            "Valid Login",
            "--assertion",
            "Dashboard shown",
        ])
        .unwrap();
        match cli.command {
            Command::Tests(TestCommand::Add { suite_id, fields }) => {
                assert_eq!(suite_id, "suite-1");
                assert_eq!(fields.title.as_deref(), Some("Valid Login"));
                assert_eq!(fields.assertion.as_deref(), Some("Dashboard shown"));
                assert_eq!(fields.test_id, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_csv_template_output() {
        let cli = Cli::try_parse_from(["tca", "csv", "template", "-o", "out.csv"]).unwrap();
        match cli.command {
            Command::Csv(CsvCommand::Template { output }) => {
                assert_eq!(output, Some(PathBuf::from("out.csv")))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["tca", "suites"]).is_err());
    }
}
