//! Sermon CLI
//!
//! Command-line interface for generating, editing and presenting sermon
//! outlines.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sermon_core::Config;

mod commands;
mod output;
mod present;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "sermon")]
#[command(about = "Generate, edit and present sermon outlines")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an outline for a passage
    #[command(alias = "gen")]
    Generate {
        /// Passage reference, e.g. "Êxodo 40:34-38"
        passage: String,
        /// Supporting document (.txt, .md, .html)
        #[arg(short, long, value_name = "FILE")]
        supporting: Option<PathBuf>,
        /// Save the outline to the repository
        #[arg(long)]
        save: bool,
        /// Also generate presentation data (implies --save)
        #[arg(long)]
        prepare: bool,
    },
    /// List saved sermons
    #[command(alias = "ls")]
    List,
    /// Show a saved sermon
    Show {
        id: i64,
        /// Show the presentation rewrite instead of the source outline
        #[arg(short, long)]
        presentation: bool,
    },
    /// Replace one text field of a saved sermon
    Edit {
        id: i64,
        /// Field path, e.g. development.1.argument
        path: String,
        /// New value (\n for line breaks)
        value: String,
    },
    /// List the editable field paths of a sermon
    Fields { id: i64 },
    /// Delete a saved sermon
    #[command(alias = "rm")]
    Delete { id: i64 },
    /// Generate and store presentation data
    Prepare { id: i64 },
    /// Show the speaking schedule
    Timeline { id: i64 },
    /// Open presentation mode with the speaker timer
    Present { id: i64 },
    /// Show or set the display theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ThemeCommands {
    /// Show the current theme
    Show,
    /// Select a theme (classic, dark, sepia)
    Set { name: String },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key, e.g. repository.collection
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // The presentation view owns the terminal and logs to a file instead
    if !matches!(cli.command, Commands::Present { .. }) {
        init_logging();
    }

    if let Err(e) = run(cli, &output).await {
        if output.is_json() {
            println!(
                "{}",
                serde_json::json!({"status": "error", "message": format!("{:#}", e)})
            );
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands must work even when the file is broken
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, output);
    }

    let config = Config::load_with_cli_override(config_path)?;

    match cli.command {
        Commands::Generate {
            passage,
            supporting,
            save,
            prepare,
        } => {
            let options = commands::generate::GenerateOptions {
                supporting,
                save: save || prepare,
                prepare,
            };
            commands::generate::generate(&config, passage, options, output).await
        }
        Commands::List => commands::sermon::list(&config, output).await,
        Commands::Show { id, presentation } => {
            commands::sermon::show(&config, id, presentation, output).await
        }
        Commands::Edit { id, path, value } => {
            commands::sermon::edit(&config, id, &path, &value, output).await
        }
        Commands::Fields { id } => commands::sermon::fields(&config, id, output).await,
        Commands::Delete { id } => commands::sermon::delete(&config, id, output).await,
        Commands::Prepare { id } => commands::sermon::prepare(&config, id, output).await,
        Commands::Timeline { id } => commands::sermon::timeline(&config, id, output).await,
        Commands::Present { id } => present::run(config, id).await,
        Commands::Theme { command } => match command {
            Some(ThemeCommands::Show) | None => commands::theme::show(&config, output),
            Some(ThemeCommands::Set { name }) => commands::theme::set(&config, &name, output),
        },
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Stderr logging controlled by SERMON_LOG (default: warn)
fn init_logging() {
    let level = std::env::var("SERMON_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::try_new(format!(
        "sermon_core={},sermon_cli={}",
        level, level
    ))
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
