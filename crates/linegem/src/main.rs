// SPDX-FileCopyrightText: 2026 Linegem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! linegem - a LINE chat bot that answers text and image questions with Gemini.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linegem_config::LinegemConfig;

/// linegem - a LINE chat bot backed by Gemini.
#[derive(Parser, Debug)]
#[command(name = "linegem", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server (default).
    Serve,
    /// Validate the configuration and print it with secrets redacted.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => linegem_config::load_and_validate_path(path),
        None => linegem_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            linegem_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => match render_config(&config) {
            Ok(rendered) => {
                eprintln!("linegem: configuration is valid");
                print!("{rendered}");
            }
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
    }
}

/// Renders the effective configuration as TOML with secrets masked.
fn render_config(config: &LinegemConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&config.redacted())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::parse_from(["linegem"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_parses_check_config_with_path() {
        let cli = Cli::parse_from(["linegem", "check-config", "--config", "/tmp/l.toml"]);
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/l.toml")));
    }

    #[test]
    fn rendered_config_hides_secrets() {
        let mut config = LinegemConfig::default();
        config.gemini.api_key = Some("AIza-secret".into());
        config.line.channel_secret = Some("shh".into());

        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("AIza-secret"));
        assert!(!rendered.contains("shh"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("callsign"));
    }
}
