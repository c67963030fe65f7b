use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{CoreError, Holding, MissingHoldingPolicy, Symbol};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portfolio: Portfolio,
    pub engine: Engine,
    pub provider: Provider,
    pub logging: Logging,
}

/// The symbols to look at, the purchase date, and how many shares are owned.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    /// The tickers selected when none are given on the command line.
    pub tickers: Vec<Symbol>,
    /// The "date purchased": prices are fetched from this date until today.
    pub start_date: NaiveDate,
    /// The most tickers a single request may select.
    pub max_selections: usize,
    /// The quantity assumed for a selected ticker with no explicit holding.
    pub default_quantity: u32,
    /// Explicit per-ticker quantities.
    pub holdings: Holding,
}

/// Parameters for the PnL engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Engine {
    /// What scaling does with a ranked symbol that has no quantity.
    pub missing_holding: MissingHoldingPolicy,
}

/// Where prices come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Provider {
    pub kind: ProviderKind,
    /// Root URL of the Yahoo Finance chart API.
    pub base_url: String,
    pub timeout_secs: u64,
    /// A wide CSV of prices, used when `kind` is `csv`.
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for Portfolio {
    fn default() -> Self {
        let tickers = ["AAPL", "GOOGL", "MSFT", "AMZN", "META"]
            .iter()
            .filter_map(|t| Symbol::new(t).ok())
            .collect();
        Self {
            tickers,
            start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            max_selections: 8,
            default_quantity: 2,
            holdings: Holding::default(),
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 30,
            csv_path: None,
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "tickerpnl.log".to_string(),
        }
    }
}

impl Config {
    /// Checks the relationships between settings that deserialization alone cannot.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ConfigError> {
        self.portfolio.validate_selection(&self.portfolio.tickers)?;

        if self.portfolio.start_date > today {
            return Err(ConfigError::ValidationError(format!(
                "portfolio.start_date {} is in the future",
                self.portfolio.start_date
            )));
        }
        if self.portfolio.default_quantity == 0 {
            return Err(ConfigError::ValidationError(
                "portfolio.default_quantity must be at least 1".to_string(),
            ));
        }
        if self.engine.missing_holding == MissingHoldingPolicy::DefaultQuantity(0) {
            return Err(ConfigError::ValidationError(
                "engine.missing_holding default_quantity must be at least 1".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.provider.kind == ProviderKind::Csv && self.provider.csv_path.is_none() {
            return Err(ConfigError::ValidationError(
                "provider.csv_path is required when provider.kind is \"csv\"".to_string(),
            ));
        }
        Ok(())
    }
}

impl Portfolio {
    /// Checks a ticker selection against the selection rules.
    pub fn validate_selection(&self, tickers: &[Symbol]) -> Result<(), ConfigError> {
        if tickers.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one ticker must be selected".to_string(),
            ));
        }
        if tickers.len() > self.max_selections {
            return Err(ConfigError::ValidationError(format!(
                "{} tickers selected but at most {} are allowed",
                tickers.len(),
                self.max_selections
            )));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = tickers.iter().find(|t| !seen.insert(*t)) {
            return Err(ConfigError::ValidationError(format!(
                "ticker {} is selected twice",
                duplicate
            )));
        }
        Ok(())
    }

    /// Builds the holding for a selection.
    ///
    /// Every selected ticker starts at `default_quantity`; tickers listed under
    /// `holdings` use their configured quantity instead.
    pub fn resolve_holding(
        &self,
        tickers: &[Symbol],
        default_quantity: u32,
    ) -> Result<Holding, CoreError> {
        let mut holding = Holding::uniform(tickers, default_quantity)?;
        for (symbol, quantity) in self.holdings.iter() {
            if tickers.contains(symbol) {
                holding.set(symbol.clone(), quantity)?;
            }
        }
        Ok(holding)
    }
}
