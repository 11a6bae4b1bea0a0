//! Display theme selection
//!
//! The selected theme lives in a small `theme` file in the data directory,
//! separate from the remote collection. Hosts read it once at startup and
//! pass the [`Theme`] to the renderer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// File name of the persisted selection
pub const THEME_FILE: &str = "theme";

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Unknown theme '{0}'. Available themes: classic, dark, sepia")]
    Unknown(String),

    #[error("Failed to save theme to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Dark,
    Sepia,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Classic, Theme::Dark, Theme::Sepia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Dark => "dark",
            Theme::Sepia => "sepia",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ThemeError::Unknown(name.to_string()))
    }
}

/// Reads and writes the persisted theme
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(THEME_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme, or the default when absent or invalid
    pub fn load(&self) -> Theme {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return Theme::default();
        };
        content.parse().unwrap_or_else(|e| {
            warn!("Ignoring stored theme: {}", e);
            Theme::default()
        })
    }

    pub fn save(&self, theme: Theme) -> Result<(), ThemeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ThemeError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, theme.as_str()).map_err(|source| ThemeError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" Sepia\n".parse::<Theme>().unwrap(), Theme::Sepia);
        assert!(matches!(
            "neon".parse::<Theme>(),
            Err(ThemeError::Unknown(name)) if name == "neon"
        ));
        assert_eq!(Theme::default(), Theme::Classic);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path());

        assert_eq!(store.load(), Theme::Classic);
        store.save(Theme::Sepia).unwrap();
        assert_eq!(store.load(), Theme::Sepia);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "sepia");
    }

    #[test]
    fn test_invalid_stored_value_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(dir.path());
        std::fs::write(store.path(), "solarized").unwrap();
        assert_eq!(store.load(), Theme::Classic);
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::new(&dir.path().join("nested"));
        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load(), Theme::Dark);
    }
}
