//! Runtime configuration, layered from an optional TOML file and `MEET_*`
//! environment variables over built-in defaults.

use std::path::{Path, PathBuf};

use meet_core::event::Theme;
use serde::Deserialize;

/// Deserialised from `meet.toml` and the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path:           PathBuf,
  /// Delay between the last edit and the autosave write.
  pub autosave_debounce_ms: u64,
  /// Page that share links point at; the `#k=` fragment is appended.
  pub share_base_url:       String,
  /// Theme reported when none has been chosen yet.
  pub default_theme:        Theme,
}

impl AppConfig {
  /// Load `file` (if it exists) and the `MEET_*` environment on top of the
  /// defaults.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    let settings = config::Config::builder()
      .set_default("store_path", "~/.local/share/monthly-meet/meet.sqlite")?
      .set_default("autosave_debounce_ms", 350)?
      .set_default("share_base_url", "https://monthly-meet.app/")?
      .set_default("default_theme", "light")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("MEET"))
      .build()?;

    let mut cfg: Self = settings.try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn debounce(&self) -> std::time::Duration {
    std::time::Duration::from_millis(self.autosave_debounce_ms)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
