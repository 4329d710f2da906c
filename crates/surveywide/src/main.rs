#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use surveywide::cli::app::{Cli, LoggingArgs};
use surveywide::cli::commands;
use surveywide::error::WideFormatError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_INPUT_SCHEMA_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

const LOG_ENV_VAR: &str = "SURVEYWIDE_LOG";

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    if let Err(error) = init_tracing(&cli.logging) {
        eprintln!("surveywide: {error:#}");
        return EXIT_RUNTIME_FAILURE;
    }

    match execute(&cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            eprintln!("surveywide: failed (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let home_dir = std::env::var_os("HOME").map(PathBuf::from);
    let cwd = std::env::current_dir()?;
    commands::generate::run(&cli.generate, home_dir.as_deref(), &cwd)
}

fn init_tracing(logging: &LoggingArgs) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<WideFormatError>() {
        Some(failure) if failure.is_input_schema_failure() => EXIT_INPUT_SCHEMA_FAILURE,
        _ => EXIT_RUNTIME_FAILURE,
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}
