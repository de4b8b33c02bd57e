//! Tests for argument parsing and exit codes

use clap::{CommandFactory, Parser};

use seqtree::cli::args::{Cli, Commands, ConfigCommands};
use seqtree::cli::commands::execute_command;
use seqtree::cli::error::CliError;
use seqtree::exitcode;
use seqtree::infrastructure::InfraError;

#[test]
fn verify_cli() {
    Cli::command().debug_assert();
}

#[test]
fn given_repeated_debug_flags_when_parsing_then_counts_them() {
    let cli = Cli::try_parse_from(["seqtree", "-d", "-d", "tree", "t.toml"]).unwrap();
    assert_eq!(cli.debug, 2);
    assert!(matches!(cli.command, Some(Commands::Tree { .. })));
}

#[test]
fn given_simulate_options_when_parsing_then_all_captured() {
    let cli = Cli::try_parse_from([
        "seqtree", "simulate", "--seed", "3", "--depth", "2", "--length", "10",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Simulate {
            seed,
            depth,
            children,
            length,
            ..
        }) => {
            assert_eq!(seed, Some(3));
            assert_eq!(depth, Some(2));
            assert_eq!(children, None);
            assert_eq!(length, Some(10));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn given_config_path_when_parsing_then_subcommand_selected() {
    let cli = Cli::try_parse_from(["seqtree", "config", "path"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommands::Path
        })
    ));
}

#[test]
fn given_no_command_when_executing_then_usage_error() {
    let cli = Cli::try_parse_from(["seqtree"]).unwrap();
    let err = execute_command(&cli).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_missing_document_when_reconstructing_then_io_exit_code() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    let project = dir.path().to_string_lossy().to_string();
    let missing = missing.to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "seqtree",
        "-C",
        project.as_str(),
        "reconstruct",
        missing.as_str(),
        "X",
    ])
    .unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::IOERR);
}

#[test]
fn given_missing_project_dir_when_executing_then_usage_exit_code() {
    let dir = tempfile::TempDir::new().unwrap();
    let project = dir.path().join("nowhere").to_string_lossy().to_string();
    let cli = Cli::try_parse_from(["seqtree", "-C", project.as_str(), "config", "path"]).unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)), "{err:?}");
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_malformed_fasta_root_when_reconstructing_then_data_exit_code() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("root.fa"), "ATGC\n>late header\nGG\n").unwrap();
    let doc = dir.path().join("lineage.toml");
    std::fs::write(&doc, "[root]\nfasta = \"root.fa\"\n").unwrap();
    let project = dir.path().to_string_lossy().to_string();
    let doc = doc.to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "seqtree",
        "-C",
        project.as_str(),
        "reconstruct",
        doc.as_str(),
        "root",
    ])
    .unwrap();

    let err = execute_command(&cli).unwrap_err();

    match &err {
        CliError::Infra(InfraError::Format { path, .. }) => assert!(path.ends_with("root.fa")),
        other => panic!("expected format error, got {other:?}"),
    }
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}
