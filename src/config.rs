//! Runtime settings.
//!
//! Loaded from an optional TOML file layered under `ARBX__`-prefixed
//! environment variables (`__` separates nesting levels), e.g.
//! `ARBX__PROFIT_THRESHOLD=2.5` or `ARBX__TELEGRAM__BOT_TOKEN=...`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use crate::engine::matcher::MatcherConfig;

pub const ENV_PREFIX: &str = "ARBX";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Bitfinex,
    Gemini,
    Hyperliquid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueSettings {
    pub kind: VenueKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub symbol: String,
    /// Overrides the venue's public API base url.
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: i64,
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    pub max_tx_volume: Decimal,
    #[serde(default)]
    pub min_tx_volume: Decimal,
    #[serde(default)]
    pub profit_threshold: Decimal,
    #[serde(default)]
    pub percent_threshold: Decimal,
    #[serde(default = "default_max_book_depth")]
    pub max_book_depth: usize,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default)]
    pub venues: BTreeMap<String, VenueSettings>,
    #[serde(default)]
    pub telegram: TelegramSettings,
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval_secs() -> u64 {
    5
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

fn default_max_book_depth() -> usize {
    25
}

fn default_metrics_port() -> u16 {
    9000
}

impl Settings {
    /// Reads `path` (if it exists) and the environment.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false));
        Self::finish(builder)
            .with_context(|| format!("loading settings from {}", path.display()))
    }

    /// Parses settings from TOML text, still honouring the environment.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));
        Self::finish(builder)
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> anyhow::Result<Self> {
        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_tx_volume > Decimal::ZERO, "max_tx_volume must be positive");
        ensure!(self.min_tx_volume >= Decimal::ZERO, "min_tx_volume must not be negative");
        ensure!(self.profit_threshold >= Decimal::ZERO, "profit_threshold must not be negative");
        ensure!(self.percent_threshold >= Decimal::ZERO, "percent_threshold must not be negative");
        ensure!(self.refresh_interval_secs > 0, "refresh_interval_secs must be positive");
        ensure!(self.fetch_timeout_secs > 0, "fetch_timeout_secs must be positive");
        ensure!(self.max_book_depth > 0, "max_book_depth must be positive");
        for (name, venue) in &self.venues {
            ensure!(!venue.symbol.trim().is_empty(), "venue {name} has an empty symbol");
        }
        if self.telegram.enabled {
            ensure!(!self.telegram.bot_token.is_empty(), "telegram is enabled without a bot_token");
        }

        let enabled = self.enabled_venues().count();
        if enabled < 2 {
            warn!(enabled, "Fewer than two venues enabled, no pair can ever cross");
        }
        Ok(())
    }

    pub fn enabled_venues(&self) -> impl Iterator<Item = (&String, &VenueSettings)> {
        self.venues.iter().filter(|(_, v)| v.enabled)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig::new(self.max_tx_volume)
            .with_min_tx_volume(self.min_tx_volume)
            .with_profit_threshold(self.profit_threshold)
            .with_percent_threshold(self.percent_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
        refresh_interval_secs = 3
        max_tx_volume = "1.5"
        profit_threshold = 2
        percent_threshold = "0.1"

        [venues.bitfinex]
        kind = "bitfinex"
        symbol = "btcusd"

        [venues.gemini]
        kind = "gemini"
        symbol = "btcusd"
        enabled = false
    "#;

    #[test]
    fn test_parse_sample() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();
        assert_eq!(settings.refresh_interval(), Duration::from_secs(3));
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(settings.max_book_depth, 25);

        let matcher = settings.matcher_config();
        assert_eq!(matcher.max_tx_volume, dec!(1.5));
        assert_eq!(matcher.profit_threshold, dec!(2));
        assert_eq!(matcher.percent_threshold, dec!(0.1));
        assert_eq!(matcher.min_tx_volume, Decimal::ZERO);

        assert_eq!(settings.venues.len(), 2);
        assert_eq!(settings.venues["bitfinex"].kind, VenueKind::Bitfinex);
        assert!(settings.venues["bitfinex"].enabled);
        let enabled: Vec<&String> = settings.enabled_venues().map(|(name, _)| name).collect();
        assert_eq!(enabled, vec!["bitfinex"]);
        assert!(!settings.telegram.enabled);
    }

    #[test]
    fn test_volume_cap_is_required() {
        assert!(Settings::from_toml_str("profit_threshold = 1").is_err());
    }

    #[test]
    fn test_rejects_non_positive_cap() {
        let err = Settings::from_toml_str(r#"max_tx_volume = "0""#).unwrap_err();
        assert!(err.to_string().contains("max_tx_volume"));
    }

    #[test]
    fn test_telegram_needs_token() {
        let toml = r#"
            max_tx_volume = 1
            [telegram]
            enabled = true
            chat_id = 42
        "#;
        assert!(Settings::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_environment() {
        // nothing sets ARBX__MAX_TX_VOLUME in the test environment
        assert!(Settings::load(Path::new("does/not/exist.toml")).is_err());
    }
}
