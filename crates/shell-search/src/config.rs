//! Provider configuration.
//!
//! There are no configuration files; a handful of environment variables
//! override the defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Any value keeps the process alive indefinitely.
pub const PERSIST_ENV: &str = "SHELL_SEARCH_PROVIDER_PERSIST";
/// Socket address for the HTTP transport.
pub const ADDR_ENV: &str = "SHELL_SEARCH_PROVIDER_ADDR";
/// `omit` or `fail`, see [`UnresolvedPolicy`].
pub const UNRESOLVED_ENV: &str = "SHELL_SEARCH_PROVIDER_UNRESOLVED";

pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12);
pub const DEFAULT_ICON_SIZE: u32 = 128;

/// What to do with identifiers that resolve to no resource during a
/// metadata request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Leave them out of the reply and log a warning.
    #[default]
    Omit,
    /// Fail the whole request.
    FailBatch,
}

impl UnresolvedPolicy {
    pub fn parse(value: &str) -> ProviderResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "omit" => Ok(Self::Omit),
            "fail" | "fail_batch" => Ok(Self::FailBatch),
            other => Err(ProviderError::InvalidConfig(format!(
                "{UNRESOLVED_ENV} must be `omit` or `fail`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Disable idle shutdown.
    pub persist: bool,
    /// Idle time with no outstanding work before the process exits.
    pub inactivity_timeout: Duration,
    /// Edge length of the generic icon rendered for results without one.
    pub icon_size: u32,
    /// Directory searched by the engine, usually the home directory.
    pub search_root: PathBuf,
    pub bind_addr: SocketAddr,
    pub unresolved: UnresolvedPolicy,
    pub walk_max_depth: usize,
    pub walk_batch_size: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            persist: false,
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            icon_size: DEFAULT_ICON_SIZE,
            search_root: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            unresolved: UnresolvedPolicy::default(),
            walk_max_depth: 12,
            walk_batch_size: 64,
        }
    }
}

impl ProviderConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> ProviderResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ProviderResult<Self> {
        let mut config = Self {
            persist: lookup(PERSIST_ENV).is_some(),
            ..Self::default()
        };

        if let Some(addr) = lookup(ADDR_ENV) {
            config.bind_addr = addr.parse().map_err(|error| {
                ProviderError::InvalidConfig(format!("{ADDR_ENV}={addr}: {error}"))
            })?;
        }
        if let Some(policy) = lookup(UNRESOLVED_ENV) {
            config.unresolved = UnresolvedPolicy::parse(&policy)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// URI of the search root, used as the query location.
    pub fn search_location(&self) -> ProviderResult<Url> {
        Url::from_directory_path(&self.search_root).map_err(|()| {
            ProviderError::InvalidConfig(format!(
                "search root must be an absolute path: {}",
                self.search_root.display()
            ))
        })
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if self.icon_size == 0 {
            return Err(ProviderError::InvalidConfig("icon_size must be > 0".into()));
        }
        if self.walk_batch_size == 0 {
            return Err(ProviderError::InvalidConfig(
                "walk_batch_size must be > 0".into(),
            ));
        }
        self.search_location().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ProviderConfig::from_lookup(lookup(&[])).expect("config");
        assert!(!config.persist);
        assert_eq!(config.inactivity_timeout, Duration::from_secs(12));
        assert_eq!(config.icon_size, 128);
        assert_eq!(config.unresolved, UnresolvedPolicy::Omit);
    }

    #[test]
    fn persist_toggle_accepts_any_value() {
        let config = ProviderConfig::from_lookup(lookup(&[(PERSIST_ENV, "")])).expect("config");
        assert!(config.persist);
    }

    #[test]
    fn parses_address_and_policy() {
        let config = ProviderConfig::from_lookup(lookup(&[
            (ADDR_ENV, "127.0.0.1:4711"),
            (UNRESOLVED_ENV, "FAIL"),
        ]))
        .expect("config");
        assert_eq!(config.bind_addr.port(), 4711);
        assert_eq!(config.unresolved, UnresolvedPolicy::FailBatch);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ProviderConfig::from_lookup(lookup(&[(ADDR_ENV, "nowhere")])).is_err());
        assert!(ProviderConfig::from_lookup(lookup(&[(UNRESOLVED_ENV, "drop")])).is_err());

        let config = ProviderConfig {
            search_root: PathBuf::from("relative/dir"),
            ..ProviderConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
