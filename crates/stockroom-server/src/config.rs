//! Server configuration.
//!
//! Loaded from `--config`, else `stockroom.toml` in the working directory,
//! else defaults. `STOCKROOM_*` environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use stockroom_commerce::Currency;
use stockroom_db::BackendKind;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stockroom.toml";

/// Full server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener and page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Products per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Display currency for prices.
    #[serde(default)]
    pub currency: Currency,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            page_size: default_page_size(),
            currency: Currency::default(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_page_size() -> usize {
    6
}

/// Datastore selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Only used by the sqlite backend.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://stockroom.db".to_string()
}

/// Uploaded image storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory images are written to.
    #[serde(default = "default_media_dir")]
    pub dir: PathBuf,

    /// URL prefix images are served under.
    #[serde(default = "default_media_base_url")]
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: default_media_dir(),
            base_url: default_media_base_url(),
        }
    }
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_media_base_url() -> String {
    "/media".to_string()
}

/// Login session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_session_ttl(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_cookie_name() -> String {
    "stockroom_sid".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl AppConfig {
    /// Load config from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().map(|ext| ext == "json").unwrap_or(false) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Resolve the file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STOCKROOM_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup("STOCKROOM_BIND") {
            self.server.bind = bind;
        }
        if let Some(backend) = lookup("STOCKROOM_BACKEND") {
            self.storage.backend = backend
                .parse()
                .with_context(|| format!("STOCKROOM_BACKEND: {}", backend))?;
        }
        if let Some(url) = lookup("STOCKROOM_DATABASE_URL") {
            self.storage.database_url = url;
        }
        if let Some(dir) = lookup("STOCKROOM_MEDIA_DIR") {
            self.media.dir = PathBuf::from(dir);
        }
        if let Some(base_url) = lookup("STOCKROOM_MEDIA_BASE_URL") {
            self.media.base_url = base_url;
        }
        if let Some(ttl) = lookup("STOCKROOM_SESSION_TTL_SECS") {
            self.session.ttl_secs = ttl
                .trim()
                .parse()
                .with_context(|| format!("STOCKROOM_SESSION_TTL_SECS: {}", ttl))?;
        }
        if let Some(json) = lookup("STOCKROOM_LOG_JSON") {
            self.logging.json = matches!(json.trim(), "1" | "true" | "yes" | "on");
        }
        if let Some(code) = lookup("STOCKROOM_CURRENCY") {
            self.server.currency = code
                .parse()
                .map_err(|e: String| anyhow::anyhow!("STOCKROOM_CURRENCY: {}", e))?;
        }
        if let Some(size) = lookup("STOCKROOM_PAGE_SIZE") {
            self.server.page_size = size
                .trim()
                .parse()
                .with_context(|| format!("STOCKROOM_PAGE_SIZE: {}", size))?;
        }
        Ok(())
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.page_size == 0 {
            bail!("server.page_size must be at least 1");
        }
        if self.session.cookie_name.trim().is_empty() {
            bail!("session.cookie_name is required");
        }
        if !self.media.base_url.starts_with('/') {
            bail!("media.base_url must start with '/'");
        }
        Ok(())
    }
}
