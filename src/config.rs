//! Client configuration loaded from TOML files and environment variables.
//!
//! Precedence: explicit path > `MENUKIT_CONFIG` > `~/.config/menukit.toml` >
//! `./menukit.toml` > environment > defaults. For each setting the first
//! source that provides it wins.

use crate::domain::describe_kind;
use crate::errors::{SdkError, SdkResult};
use crate::query::MAX_LIMIT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CURSOR_TTL_SECS: u64 = 3600;
pub const DEFAULT_BULK_ERROR_DETAIL_LIMIT: usize = 100;
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Page size overrides keyed by entity kind, e.g. `items = 50`.
    pub default_limits: BTreeMap<String, usize>,
    pub cursor_ttl_secs: u64,
    /// Bulk failures past this count are reported without details.
    pub bulk_error_detail_limit: usize,
    /// Capacity of the domain event channel.
    pub event_buffer: usize,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_limits: BTreeMap::new(),
            cursor_ttl_secs: DEFAULT_CURSOR_TTL_SECS,
            bulk_error_detail_limit: DEFAULT_BULK_ERROR_DETAIL_LIMIT,
            event_buffer: DEFAULT_EVENT_BUFFER,
            log_dir: None,
            log_level: None,
        }
    }
}

// Every key optional so files can be layered.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    default_limits: Option<BTreeMap<String, usize>>,
    cursor_ttl_secs: Option<u64>,
    bulk_error_detail_limit: Option<usize>,
    event_buffer: Option<usize>,
    log_dir: Option<PathBuf>,
    log_level: Option<String>,
}

impl PartialConfig {
    fn fill_from(&mut self, other: Self) {
        if self.default_limits.is_none() {
            self.default_limits = other.default_limits;
        }
        if self.cursor_ttl_secs.is_none() {
            self.cursor_ttl_secs = other.cursor_ttl_secs;
        }
        if self.bulk_error_detail_limit.is_none() {
            self.bulk_error_detail_limit = other.bulk_error_detail_limit;
        }
        if self.event_buffer.is_none() {
            self.event_buffer = other.event_buffer;
        }
        if self.log_dir.is_none() {
            self.log_dir = other.log_dir;
        }
        if self.log_level.is_none() {
            self.log_level = other.log_level;
        }
    }

    fn finish(self) -> ClientConfig {
        let d = ClientConfig::default();
        ClientConfig {
            default_limits: self.default_limits.unwrap_or(d.default_limits),
            cursor_ttl_secs: self.cursor_ttl_secs.unwrap_or(d.cursor_ttl_secs),
            bulk_error_detail_limit: self.bulk_error_detail_limit.unwrap_or(d.bulk_error_detail_limit),
            event_buffer: self.event_buffer.unwrap_or(d.event_buffer),
            log_dir: self.log_dir,
            log_level: self.log_level,
        }
    }
}

fn parse_partial(src: &str, origin: &Path) -> SdkResult<PartialConfig> {
    toml::from_str(src).map_err(|e| SdkError::Config(format!("{}: {e}", origin.display())))
}

impl ClientConfig {
    /// Parses one TOML document; missing keys take their defaults.
    pub fn from_toml_str(src: &str) -> SdkResult<Self> {
        let cfg = parse_partial(src, Path::new("<inline>"))?.finish();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads configuration from the standard locations.
    ///
    /// # Errors
    /// A file named by `explicit` or `MENUKIT_CONFIG` that is missing or malformed
    /// is an error; problems with the implicit locations are logged and skipped.
    pub fn load(explicit: Option<&Path>) -> SdkResult<Self> {
        let mut required = Vec::new();
        if let Some(p) = explicit {
            required.push(p.to_path_buf());
        }
        if let Ok(p) = std::env::var("MENUKIT_CONFIG") {
            required.push(PathBuf::from(p));
        }
        let mut optional = Vec::new();
        if let Some(dir) = dirs_next::config_dir() {
            optional.push(dir.join("menukit.toml"));
        }
        if let Ok(cur) = std::env::current_dir() {
            optional.push(cur.join("menukit.toml"));
        }
        Self::load_from(&required, &optional, |k| std::env::var(k).ok())
    }

    pub(crate) fn load_from(
        required: &[PathBuf],
        optional: &[PathBuf],
        env: impl Fn(&str) -> Option<String>,
    ) -> SdkResult<Self> {
        let mut acc = PartialConfig::default();
        for p in required {
            let src = std::fs::read_to_string(p)
                .map_err(|e| SdkError::Config(format!("{}: {e}", p.display())))?;
            acc.fill_from(parse_partial(&src, p)?);
            log::debug!("loaded config from {}", p.display());
        }
        for p in optional.iter().filter(|p| p.exists()) {
            match std::fs::read_to_string(p).map_err(SdkError::from).and_then(|s| parse_partial(&s, p)) {
                Ok(file) => {
                    acc.fill_from(file);
                    log::debug!("loaded config from {}", p.display());
                }
                Err(e) => log::warn!("ignoring config file: {e}"),
            }
        }
        if acc.cursor_ttl_secs.is_none() {
            if let Some(s) = env("MENUKIT_CURSOR_TTL_SECS") {
                let ttl = s
                    .parse()
                    .map_err(|_| SdkError::Config(format!("MENUKIT_CURSOR_TTL_SECS: not a number: {s}")))?;
                acc.cursor_ttl_secs = Some(ttl);
            }
        }
        if acc.log_level.is_none() {
            acc.log_level = env("MENUKIT_LOG_LEVEL");
        }
        if acc.log_dir.is_none() {
            acc.log_dir = env("MENUKIT_LOG_DIR").map(PathBuf::from);
        }
        let cfg = acc.finish();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SdkResult<()> {
        for (kind, &limit) in &self.default_limits {
            if describe_kind(kind).is_none() {
                return Err(SdkError::Config(format!("default_limits: unknown entity kind '{kind}'")));
            }
            if limit == 0 || limit > MAX_LIMIT {
                return Err(SdkError::Config(format!("default_limits.{kind}: {limit} is out of range")));
            }
        }
        if self.cursor_ttl_secs == 0 {
            return Err(SdkError::Config("cursor_ttl_secs must be positive".into()));
        }
        if self.event_buffer == 0 {
            return Err(SdkError::Config("event_buffer must be positive".into()));
        }
        Ok(())
    }

    /// Page size used when a query for `kind` sets no limit.
    #[must_use]
    pub fn default_limit_for(&self, kind: &str, fallback: usize) -> usize {
        self.default_limits.get(kind).copied().unwrap_or(fallback)
    }
}
