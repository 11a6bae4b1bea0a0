//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use sermon_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
///
/// API keys are never printed, only whether they are set.
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "log_file": config.log_file,
                    "repository": {
                        "base_url": config.repository.base_url,
                        "collection": config.repository.collection,
                        "api_key_set": config.repository.api_key.is_some(),
                    },
                    "generation": {
                        "base_url": config.generation.base_url,
                        "model": config.generation.model,
                        "api_key_set": config.generation.api_key.is_some(),
                        "max_supporting_chars": config.generation.max_supporting_chars,
                        "timeout_secs": config.generation.timeout_secs,
                    },
                    "timer": config.timer,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            let not_set = || "(not set)".to_string();
            let secret = |key: &Option<String>| {
                if key.is_some() {
                    "(set)".to_string()
                } else {
                    not_set()
                }
            };

            println!("Configuration:");
            println!("  data_dir:     {}", config.data_dir.display());
            println!(
                "  log_file:     {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(not_set)
            );
            println!();
            println!("[repository]");
            println!("  base_url:     {}", config.repository.base_url);
            println!(
                "  collection:   {}",
                config.repository.collection.clone().unwrap_or_else(not_set)
            );
            println!("  api_key:      {}", secret(&config.repository.api_key));
            println!();
            println!("[generation]");
            println!("  base_url:     {}", config.generation.base_url);
            println!("  model:        {}", config.generation.model);
            println!("  api_key:      {}", secret(&config.generation.api_key));
            println!(
                "  max_supporting_chars: {}",
                config.generation.max_supporting_chars
            );
            println!("  timeout_secs: {}", config.generation.timeout_secs);
            println!();
            println!("[timer]");
            println!(
                "  minutes:      total {}, introduction {}, point {}, conclusion {}",
                config.timer.total_minutes,
                config.timer.introduction_minutes,
                config.timer.point_minutes,
                config.timer.conclusion_minutes
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    config.set(&key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key.ends_with("api_key") && !value.is_empty() {
        "********"
    } else {
        value.as_str()
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}
