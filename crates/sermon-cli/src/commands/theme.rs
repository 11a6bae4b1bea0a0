//! Theme command handlers

use anyhow::Result;

use sermon_core::{Config, Theme, ThemeStore};

use crate::output::Output;

/// Show the current theme and the available ones
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let current = ThemeStore::new(&config.data_dir).load();

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "theme": current,
                "available": Theme::ALL,
            })
        );
    } else if output.is_quiet() {
        println!("{}", current);
    } else {
        for theme in Theme::ALL {
            let marker = if theme == current { "*" } else { " " };
            println!("{} {}", marker, theme);
        }
    }
    Ok(())
}

/// Persist a new theme
pub fn set(config: &Config, name: &str, output: &Output) -> Result<()> {
    let theme: Theme = name.parse()?;
    ThemeStore::new(&config.data_dir).save(theme)?;
    output.success(&format!("Theme set to {}", theme));
    Ok(())
}
