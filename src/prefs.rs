//! Persisted presentation preference.
//!
//! The page this exporter was built around keeps a theme toggle whose value
//! survives across visits. That is modeled here as process-wide state with
//! explicit init (read the persisted value at startup) and explicit
//! mutation (write on toggle). It has no relation to the export pipeline's
//! correctness: capture backends take the theme through [`crate::ExportConfig`],
//! and only the CLI consults the store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Presentation theme used for the rendered region's palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// The persisted preference set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
}

impl Preferences {
    /// Read preferences from `path`. A missing file yields the defaults;
    /// an unreadable one is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| Error::ConfigError(format!("preference file is invalid: {}", e))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(Error::ConfigError(format!(
                "preference file is unreadable: {}",
                err
            ))),
        }
    }

    /// Write preferences to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("preference encoding failed: {}", e)))?;
        std::fs::write(path, text)
            .map_err(|e| Error::ConfigError(format!("preference file is unwritable: {}", e)))
    }
}

struct Store {
    path: Option<PathBuf>,
    prefs: Preferences,
}

static STORE: OnceLock<Mutex<Store>> = OnceLock::new();

fn store() -> &'static Mutex<Store> {
    STORE.get_or_init(|| {
        Mutex::new(Store {
            path: None,
            prefs: Preferences::default(),
        })
    })
}

/// Initialize the process-wide store from a preference file. Called once at
/// startup; a later call replaces the stored values wholesale.
pub fn init(path: &Path) -> Result<()> {
    let prefs = Preferences::load(path)?;
    if let Ok(mut guard) = store().lock() {
        guard.path = Some(path.to_path_buf());
        guard.prefs = prefs;
    }
    Ok(())
}

/// The currently active preferences.
pub fn current() -> Preferences {
    store()
        .lock()
        .map(|guard| guard.prefs.clone())
        .unwrap_or_default()
}

/// Toggle the theme: update the process-wide value and write it through to
/// the preference file when one was configured.
pub fn set_theme(theme: Theme) -> Result<()> {
    let mut guard = store()
        .lock()
        .map_err(|_| Error::ConfigError("preference store is poisoned".into()))?;
    guard.prefs.theme = theme;
    if let Some(path) = guard.path.clone() {
        guard.prefs.save(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let prefs = Preferences {
            theme: Theme::Dark,
        };
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded.theme, Theme::Dark);
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        match Preferences::load(&path) {
            Err(Error::ConfigError(_)) => {}
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
