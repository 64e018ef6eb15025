//! Client configuration.
//!
//! Replaces the values the server used to hide in page markup (festival and
//! user ids, localized labels) with an explicit object. Values come from a
//! TOML file first, then from `FESTIVAL_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::chronicle::upload::{UploadMode, UploadPolicy};
use crate::chronicle::{Acknowledge, ChronicleFile, LinkBuilder, LinkStyle, PathLayout};
use crate::error::{FestivalError, FestivalResult};

/// Default server URL.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Delay between two notification polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Shortest accepted delay between two polls.
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Hover time before a user popover is fetched.
pub const DEFAULT_POPOVER_DELAY_MS: u64 = 250;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_UPLOAD_PATH: &str = "/chronicle/upload";

pub const DEFAULT_UPLOAD_PARALLELISM: usize = 2;

/// Largest accepted chronicle file (1 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".png", ".gif"];

/// Localized UI labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Prompt shown inside the empty upload area.
    pub hint: String,
    pub copy: String,
    pub delete: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            hint: "Drop files here to upload".to_string(),
            copy: "Copy".to_string(),
            delete: "Delete".to_string(),
        }
    }
}

/// Festival client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub festival_id: Option<String>,
    pub user_id: Option<String>,
    /// Session cookie forwarded verbatim on every request.
    pub cookie: Option<String>,
    pub poll_interval_secs: u64,
    pub popover_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub link_style: LinkStyle,
    pub path_layout: PathLayout,
    pub acknowledge: Acknowledge,
    pub upload_mode: UploadMode,
    pub upload_path: String,
    pub upload_parallelism: usize,
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub labels: Labels,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            festival_id: None,
            user_id: None,
            cookie: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            popover_delay_ms: DEFAULT_POPOVER_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            link_style: LinkStyle::default(),
            path_layout: PathLayout::default(),
            acknowledge: Acknowledge::default(),
            upload_mode: UploadMode::default(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            upload_parallelism: DEFAULT_UPLOAD_PARALLELISM,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            labels: Labels::default(),
        }
    }
}

impl Config {
    /// Default config file location (`~/.config/festival/config.toml` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("festival").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present, otherwise built-in defaults. Environment overrides
    /// are applied last.
    pub fn load(path: Option<&Path>) -> FestivalResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> FestivalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> FestivalResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `FESTIVAL_*` overrides through the given lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("FESTIVAL_URL") {
            self.base_url = url;
        }
        if let Some(id) = lookup("FESTIVAL_ID") {
            self.festival_id = Some(id);
        }
        if let Some(id) = lookup("FESTIVAL_USER") {
            self.user_id = Some(id);
        }
        if let Some(cookie) = lookup("FESTIVAL_COOKIE") {
            self.cookie = Some(cookie);
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(MIN_POLL_INTERVAL_SECS))
    }

    pub fn popover_delay(&self) -> Duration {
        Duration::from_millis(self.popover_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Link builder for the configured style and path layout.
    pub fn link_builder(&self) -> LinkBuilder {
        LinkBuilder::new(self.link_style, self.path_layout)
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.allowed_extensions.clone(), self.max_upload_bytes)
    }

    /// Festival and user id of the chronicle being edited.
    ///
    /// Fails when either is missing or blank.
    pub fn chronicle_owner(&self) -> FestivalResult<(&str, &str)> {
        let festival_id = required(&self.festival_id, "festival_id")?;
        let user_id = required(&self.user_id, "user_id")?;
        Ok((festival_id, user_id))
    }

    /// Reference to a file in the configured user's chronicle.
    pub fn chronicle_file(&self, file_name: &str) -> FestivalResult<ChronicleFile> {
        let (festival_id, user_id) = self.chronicle_owner()?;
        Ok(ChronicleFile::new(file_name, festival_id, user_id))
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> FestivalResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FestivalError::config(format!("{} is not set", name)))
}
