use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Items-per-page choices offered by the table views.
pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  /// Initial items per page
  #[serde(default = "default_page_size")]
  pub page_size: u32,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the dashboard API (the `/api/...` routes live under it)
  pub url: String,
  /// Store context token sent with every request
  pub context: Option<String>,
  /// Request timeout; none when unset
  pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Values fetched within this window are not refetched on revisit
  #[serde(default = "default_dedupe_interval_ms")]
  pub dedupe_interval_ms: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      dedupe_interval_ms: default_dedupe_interval_ms(),
    }
  }
}

impl CacheConfig {
  pub fn dedupe_interval(&self) -> Duration {
    Duration::from_millis(self.dedupe_interval_ms)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
  /// Where CSV exports are written (defaults to the download directory)
  pub directory: Option<PathBuf>,
}

impl ExportConfig {
  pub fn directory(&self) -> PathBuf {
    self
      .directory
      .clone()
      .or_else(dirs::download_dir)
      .unwrap_or_else(|| PathBuf::from("."))
  }
}

fn default_page_size() -> u32 {
  PAGE_SIZES[0]
}

fn default_dedupe_interval_ms() -> u64 {
  2000
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./promodash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/promodash/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/promodash/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("promodash.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("promodash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if !PAGE_SIZES.contains(&config.page_size) {
      return Err(eyre!(
        "page_size must be one of {:?}, got {}",
        PAGE_SIZES,
        config.page_size
      ));
    }
    Ok(config)
  }

  /// Get the API token from the environment, if one is set.
  ///
  /// Checks PROMODASH_API_TOKEN.
  pub fn api_token() -> Option<String> {
    std::env::var("PROMODASH_API_TOKEN")
      .ok()
      .filter(|t| !t.is_empty())
  }

  /// Header title: configured title, else the API host.
  pub fn display_title(&self) -> &str {
    self
      .title
      .as_deref()
      .unwrap_or_else(|| extract_domain(&self.api.url))
  }
}

/// Host part of a URL, without scheme or path.
pub fn extract_domain(url: &str) -> &str {
  let rest = url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url);
  rest.split('/').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config() {
    let config = Config::parse("api:\n  url: http://localhost:3000\n").unwrap();
    assert_eq!(config.api.url, "http://localhost:3000");
    assert_eq!(config.api.context, None);
    assert_eq!(config.page_size, 10);
    assert_eq!(config.cache.dedupe_interval(), Duration::from_secs(2));
    assert_eq!(config.display_title(), "localhost:3000");
  }

  #[test]
  fn test_parse_full_config() {
    let yaml = r#"
api:
  url: https://admin.example.com/dashboard
  context: stores/abc123
  timeout_secs: 30
title: Acme Store
page_size: 50
cache:
  dedupe_interval_ms: 500
export:
  directory: /tmp/exports
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.api.context.as_deref(), Some("stores/abc123"));
    assert_eq!(config.api.timeout_secs, Some(30));
    assert_eq!(config.page_size, 50);
    assert_eq!(config.cache.dedupe_interval(), Duration::from_millis(500));
    assert_eq!(config.export.directory(), PathBuf::from("/tmp/exports"));
    assert_eq!(config.display_title(), "Acme Store");
  }

  #[test]
  fn test_rejects_unknown_page_size() {
    assert!(Config::parse("api:\n  url: http://x\npage_size: 7\n").is_err());
  }

  #[test]
  fn test_extract_domain() {
    assert_eq!(
      extract_domain("https://admin.example.com/dashboard"),
      "admin.example.com"
    );
    assert_eq!(extract_domain("http://localhost:8080"), "localhost:8080");
  }
}
