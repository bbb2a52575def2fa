//! Server configuration: built-in defaults, then the TOML file, then
//! `ASSETS_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Longest session lifetime accepted from configuration: one year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Runtime server configuration.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// HMAC secret used to sign session tokens. Has no default.
  pub auth_secret:     String,
  pub token_ttl_hours: i64,
}

impl std::fmt::Debug for ServerConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServerConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("store_path", &self.store_path)
      .field("token_ttl_hours", &self.token_ttl_hours)
      .finish_non_exhaustive()
  }
}

impl ServerConfig {
  /// Load from `path` (optional) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8080)?
      .set_default("store_path", "assets.db")?
      .set_default("token_ttl_hours", 24)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ASSETS"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    anyhow::ensure!(!cfg.auth_secret.is_empty(), "auth_secret must not be empty");
    anyhow::ensure!(cfg.token_ttl_hours > 0, "token_ttl_hours must be positive");
    anyhow::ensure!(
      cfg.token_ttl_hours <= MAX_TOKEN_TTL_HOURS,
      "token_ttl_hours must be at most {MAX_TOKEN_TTL_HOURS}"
    );

    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write_config(contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("assets-server-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.toml", contents.len()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn file_values_override_defaults() {
    let path = write_config("auth_secret = \"s3cret\"\nport = 9000\n");
    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.token_ttl_hours, 24);
    assert_eq!(cfg.store_path, PathBuf::from("assets.db"));
    assert_eq!(cfg.address(), "0.0.0.0:9000");
  }

  #[test]
  fn empty_secret_is_rejected() {
    let path = write_config("auth_secret = \"\"\n");
    assert!(ServerConfig::load(&path).is_err());
  }

  #[test]
  fn oversized_ttl_is_rejected() {
    let path = write_config("auth_secret = \"long-lived\"\ntoken_ttl_hours = 9999999999\n");
    let err = ServerConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("token_ttl_hours"), "{err}");
  }

  #[test]
  fn ttl_of_one_year_is_accepted() {
    let path = write_config("auth_secret = \"yearly\"\ntoken_ttl_hours = 8760\n");
    assert_eq!(ServerConfig::load(&path).unwrap().token_ttl_hours, MAX_TOKEN_TTL_HOURS);
  }

  #[test]
  fn relative_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("data/assets.db")), PathBuf::from("data/assets.db"));
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/assets.db")), PathBuf::from(home).join("assets.db"));
  }
}
