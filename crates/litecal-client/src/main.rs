//! litecal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use litecal_core::tracing::{TracingConfig, init_tracing};

use litecal_client::cli::{Cli, Command, ConfigAction};
use litecal_client::commands;
use litecal_client::config::ClientConfig;
use litecal_client::error::{ClientError, ClientResult};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let (config, config_path) = match cli.config {
        Some(ref path) => (
            ClientConfig::load_from(path).map_err(ClientError::Config)?,
            path.clone(),
        ),
        None => (
            ClientConfig::load().map_err(ClientError::Config)?,
            ClientConfig::default_path(),
        ),
    };

    init_logging(&cli, &config);

    match cli.command {
        Command::Canonicalize {
            input,
            payload,
            export,
            json,
        } => commands::canonicalize::canonicalize(
            input.as_deref(),
            payload.as_deref(),
            export.as_deref(),
            json,
            &config,
        ),
        Command::Show {
            input,
            max_title_length,
            json,
        } => commands::canonicalize::show(input.as_deref(), max_title_length, json, &config),
        Command::Decode { payload, fields } => {
            commands::payload::decode(payload.as_deref(), fields)
        }
        Command::Validate { payload } => commands::payload::run_validate(payload.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}

fn init_logging(cli: &Cli, config: &ClientConfig) {
    let tracing_config = TracingConfig::for_cli(cli.debug || config.debug, cli.log_json);
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }
}
