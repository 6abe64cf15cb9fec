//! CLI module for Upkeep
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the analysis API server
//! - `classify` - Run the keyword classifier on a text
//! - `urgency` - Rate a text with the rule-based urgency classifier
//! - `strategies` - Show every task's fallback chain
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with rule-based strategies only
//! upkeep serve --offline
//!
//! # Triage a tenant message
//! upkeep classify "water leaking from the bathroom ceiling"
//!
//! # Generate shell completions
//! upkeep completions bash > ~/.bash_completion.d/upkeep
//! ```

pub mod classify;
pub mod completions;
pub mod config;
pub mod output;
pub mod serve;
pub mod strategies;

pub use classify::{handle_classify, handle_urgency};
pub use completions::handle_completions;
pub use config::handle_config_init;
pub use strategies::handle_strategies;

use crate::classifier::Locale;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Upkeep - Maintenance photo analysis API
#[derive(Parser, Debug)]
#[command(
    name = "upkeep",
    version,
    about = "Property-maintenance photo analysis with provider fallback chains"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the analysis API server
    Serve(ServeArgs),
    /// Classify a maintenance text with the keyword tables
    Classify(ClassifyArgs),
    /// Rate the urgency of a maintenance text (1-4)
    Urgency(UrgencyArgs),
    /// List the fallback chain of every task
    Strategies(StrategiesArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "upkeep.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "UPKEEP_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "UPKEEP_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "UPKEEP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable every provider; all tasks use rule-based strategies
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Text to classify (caption or tenant message)
    pub text: String,

    /// Keyword table locale (en, es)
    #[arg(short = 'L', long, default_value = "en")]
    pub locale: Locale,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UrgencyArgs {
    /// Text to rate
    pub text: String,

    /// Rule locale (en, es)
    #[arg(short = 'L', long, default_value = "en")]
    pub locale: Locale,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct StrategiesArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "upkeep.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "upkeep.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["upkeep", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("upkeep.toml"));
                assert!(!args.offline);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_offline_with_port() {
        let cli = Cli::try_parse_from(["upkeep", "serve", "--offline", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert!(args.offline);
                assert_eq!(args.port, Some(9000));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_classify_locale() {
        let cli =
            Cli::try_parse_from(["upkeep", "classify", "fuga en el baño", "-L", "es"]).unwrap();
        match cli.command {
            Commands::Classify(args) => {
                assert_eq!(args.text, "fuga en el baño");
                assert_eq!(args.locale, Locale::Es);
                assert!(!args.json);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_locale() {
        let result = Cli::try_parse_from(["upkeep", "urgency", "leak", "--locale", "fr"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_strategies_json() {
        let cli = Cli::try_parse_from(["upkeep", "strategies", "--json"]).unwrap();
        match cli.command {
            Commands::Strategies(args) => assert!(args.json),
            _ => panic!("Expected Strategies command"),
        }
    }
}
