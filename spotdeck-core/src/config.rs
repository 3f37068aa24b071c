//! Panel configuration.
//!
//! Loaded from a TOML file named by `--config <path>` or `SPOTDECK_CONFIG`.
//! Without either, the built-in defaults apply. Every field of a file is
//! required; unknown fields are rejected.

use crate::error::ConfigError;
use crate::Category;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Freshness policy for one resource category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachePolicy {
    /// Hard maximum age before a refetch is mandatory.
    pub ttl_secs: u64,
    /// Passes that may be served from cache before a refetch, regardless of age.
    pub grace_passes: u32,
}

impl CachePolicy {
    pub const fn new(ttl_secs: u64, grace_passes: u32) -> Self {
        Self {
            ttl_secs,
            grace_passes,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct CacheTable {
    pub instances: CachePolicy,
    pub spot_requests: CachePolicy,
    pub images: CachePolicy,
    pub key_pairs: CachePolicy,
    pub security_groups: CachePolicy,
    pub spot_prices: CachePolicy,
}

impl CacheTable {
    pub fn policy(&self, category: Category) -> CachePolicy {
        match category {
            Category::Instances => self.instances,
            Category::SpotRequests => self.spot_requests,
            Category::Images => self.images,
            Category::KeyPairs => self.key_pairs,
            Category::SecurityGroups => self.security_groups,
            Category::SpotPrices => self.spot_prices,
        }
    }
}

impl Default for CacheTable {
    fn default() -> Self {
        Self {
            instances: CachePolicy::new(60, 3),
            spot_requests: CachePolicy::new(60, 3),
            images: CachePolicy::new(3_600, 30),
            key_pairs: CachePolicy::new(3_600, 60),
            security_groups: CachePolicy::new(3_600, 60),
            // Price history is the slowest query; keep it longer.
            spot_prices: CachePolicy::new(900, 15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    pub region: String,
    pub profile: Option<String>,
    /// Must match exactly one key pair in the account. The default expects a
    /// dedicated pair named `spotdeck`; set this when launching with another.
    pub key_pair_pattern: String,
    pub security_group_pattern: String,
    pub instance_type_pattern: String,
    /// Owner filter for image lookups (`self` for the operator's own images).
    pub image_owner: String,
    /// Multiplier applied to the cheapest observed average to form a bid.
    pub bid_multiplier: f64,
    /// Price history lookback, at most [`MAX_PRICE_WINDOW_HOURS`].
    pub price_window_hours: u64,
    pub product_description: String,
    pub max_offers: usize,
    pub snapshot_prefix: String,
    pub refresh_interval_ms: u64,
    pub busy_delay_ms: u64,
    pub request_timeout_ms: u64,
    pub log_path: PathBuf,
    pub cache: CacheTable,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            profile: None,
            key_pair_pattern: "^spotdeck$".to_string(),
            security_group_pattern: "^default$".to_string(),
            instance_type_pattern: r"^(t1|m1|m3|c1|c3)\.".to_string(),
            image_owner: "self".to_string(),
            bid_multiplier: 1.1,
            price_window_hours: 6,
            product_description: "Linux/UNIX".to_string(),
            max_offers: 12,
            snapshot_prefix: "spotdeck".to_string(),
            refresh_interval_ms: 20_000,
            busy_delay_ms: 150,
            request_timeout_ms: 30_000,
            log_path: PathBuf::from("spotdeck.log"),
            cache: CacheTable::default(),
        }
    }
}

/// The provider keeps about ninety days of spot price history.
pub const MAX_PRICE_WINDOW_HOURS: u64 = 24 * 90;

/// Compiled selection patterns.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub key_pair: Regex,
    pub security_group: Regex,
    pub instance_type: Regex,
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| invalid(field, e.to_string()))
}

impl PanelConfig {
    /// Load from `--config` / `SPOTDECK_CONFIG`, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match config_path_from_args().or_else(config_path_from_env) {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: PanelConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(invalid("region", "must not be empty"));
        }
        if self.image_owner.trim().is_empty() {
            return Err(invalid("image_owner", "must not be empty"));
        }
        if self.product_description.trim().is_empty() {
            return Err(invalid("product_description", "must not be empty"));
        }
        if !self.bid_multiplier.is_finite() || self.bid_multiplier < 1.0 {
            return Err(invalid("bid_multiplier", "must be >= 1.0"));
        }
        if self.price_window_hours == 0 || self.price_window_hours > MAX_PRICE_WINDOW_HOURS {
            return Err(invalid(
                "price_window_hours",
                format!("must be between 1 and {}", MAX_PRICE_WINDOW_HOURS),
            ));
        }
        if self.max_offers == 0 {
            return Err(invalid("max_offers", "must be > 0"));
        }
        if self.snapshot_prefix.trim().is_empty()
            || self.snapshot_prefix.chars().any(char::is_whitespace)
        {
            return Err(invalid(
                "snapshot_prefix",
                "must be non-empty and contain no whitespace",
            ));
        }
        if self.refresh_interval_ms == 0 {
            return Err(invalid("refresh_interval_ms", "must be > 0"));
        }
        if self.busy_delay_ms >= self.refresh_interval_ms {
            return Err(invalid(
                "busy_delay_ms",
                "must be shorter than refresh_interval_ms",
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(invalid("log_path", "must not be empty"));
        }
        for category in Category::all() {
            let policy = self.cache.policy(*category);
            if policy.ttl_secs == 0 {
                return Err(invalid(format!("cache.{}.ttl_secs", category), "must be > 0"));
            }
            if policy.grace_passes == 0 {
                return Err(invalid(
                    format!("cache.{}.grace_passes", category),
                    "must be > 0",
                ));
            }
        }
        self.selectors()?;
        Ok(())
    }

    pub fn selectors(&self) -> Result<Selectors, ConfigError> {
        Ok(Selectors {
            key_pair: compile("key_pair_pattern", &self.key_pair_pattern)?,
            security_group: compile("security_group_pattern", &self.security_group_pattern)?,
            instance_type: compile("instance_type_pattern", &self.instance_type_pattern)?,
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn busy_delay(&self) -> Duration {
        Duration::from_millis(self.busy_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("SPOTDECK_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::KeyPair;
    use crate::selection::select_key_pair;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(PanelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_low_multiplier() {
        let config = PanelConfig {
            bid_multiplier: 0.9,
            ..PanelConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "bid_multiplier"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_huge_price_window() {
        for hours in [MAX_PRICE_WINDOW_HOURS + 1, 3_000_000_000, u64::MAX] {
            let config = PanelConfig {
                price_window_hours: hours,
                ..PanelConfig::default()
            };
            match config.validate() {
                Err(ConfigError::InvalidValue { field, .. }) => {
                    assert_eq!(field, "price_window_hours")
                }
                other => panic!("expected InvalidValue for {}, got {:?}", hours, other),
            }
        }

        let widest = PanelConfig {
            price_window_hours: MAX_PRICE_WINDOW_HOURS,
            ..PanelConfig::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn test_default_key_pattern_picks_dedicated_pair() {
        let selectors = PanelConfig::default().selectors().unwrap();
        let pairs: Vec<KeyPair> = ["laptop", "spotdeck", "spotdeck-old", "deploy"]
            .iter()
            .map(|n| KeyPair { name: n.to_string() })
            .collect();
        let chosen = select_key_pair(&selectors.key_pair, &pairs).unwrap();
        assert_eq!(chosen.name, "spotdeck");
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let config = PanelConfig {
            key_pair_pattern: "([".to_string(),
            ..PanelConfig::default()
        };
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "key_pair_pattern"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_grace() {
        let mut config = PanelConfig::default();
        config.cache.images.grace_passes = 0;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "cache.images.grace_passes")
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_busy_delay_must_fit_interval() {
        let config = PanelConfig {
            refresh_interval_ms: 100,
            busy_delay_ms: 100,
            ..PanelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let config = PanelConfig::default();
        let encoded = toml::to_string(&config).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(encoded.as_bytes()).unwrap();

        let loaded = PanelConfig::from_path(file.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.cache.policy(Category::SpotPrices).ttl_secs, 900);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut encoded = toml::to_string(&PanelConfig::default()).unwrap();
        encoded = format!("colour = \"blue\"\n{}", encoded);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(encoded.as_bytes()).unwrap();
        assert!(matches!(
            PanelConfig::from_path(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
