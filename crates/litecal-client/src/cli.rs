//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// litecal - Turn extracted event details into a calendar entry
#[derive(Debug, Parser)]
#[command(name = "litecal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "LITECAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Canonicalize extracted event fields and print the calendar payload
    Canonicalize {
        /// JSON file with the extracted fields (`-` or omitted for stdin)
        input: Option<PathBuf>,

        /// Payload supplied upstream; used if it decodes to a valid document
        #[arg(long)]
        payload: Option<String>,

        /// Write the calendar document into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the confirmation card for extracted event fields
    Show {
        /// JSON file with the extracted fields (`-` or omitted for stdin)
        input: Option<PathBuf>,

        /// Maximum title length (truncated with ellipsis)
        #[arg(long)]
        max_title_length: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Decode a payload and print the calendar document
    Decode {
        /// Base64 payload or data URL (`-` or omitted for stdin)
        payload: Option<String>,

        /// Print the event fields as JSON instead of the document
        #[arg(long)]
        fields: bool,
    },

    /// Check that a payload decodes to a valid calendar document
    Validate {
        /// Base64 payload or data URL (`-` or omitted for stdin)
        payload: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn canonicalize_with_every_flag() {
        let cli = Cli::try_parse_from([
            "litecal",
            "--debug",
            "canonicalize",
            "event.json",
            "--payload",
            "QkVHSU4=",
            "--export",
            "out",
            "--json",
        ])
        .unwrap();

        assert!(cli.debug);
        match cli.command {
            Command::Canonicalize {
                input,
                payload,
                export,
                json,
            } => {
                assert_eq!(input, Some(PathBuf::from("event.json")));
                assert_eq!(payload.as_deref(), Some("QkVHSU4="));
                assert_eq!(export, Some(PathBuf::from("out")));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn input_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["litecal", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Show {
                input: None,
                max_title_length: None,
                json: false
            }
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["litecal", "validate", "Zm9v", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Validate { payload: Some(ref p) } if p == "Zm9v"));
    }

    #[test]
    fn config_subcommands() {
        let cli = Cli::try_parse_from(["litecal", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["litecal"]).is_err());
    }
}
