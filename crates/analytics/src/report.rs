use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{PnlEntry, Symbol};
use serde::Serialize;
use std::collections::BTreeMap;

/// Purchase and current price of one symbol, read from the first and last
/// rows of a price table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryQuote {
    pub symbol: Symbol,
    pub purchase_price: f64,
    pub current_price: f64,
}

/// The outcome of a per-share PnL computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerSharePnl {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Price change per share, only for symbols with both boundary prices.
    pub pnl: BTreeMap<Symbol, f64>,
    /// Boundary prices in table column order, for the same symbols as `pnl`.
    pub quotes: Vec<BoundaryQuote>,
    /// One `MissingPrice` per excluded symbol, in table column order.
    pub issues: Vec<AnalyticsError>,
}

impl PerSharePnl {
    pub fn excluded_symbols(&self) -> Vec<&Symbol> {
        self.issues.iter().filter_map(AnalyticsError::symbol).collect()
    }
}

/// Per-share PnL multiplied by the quantity held, in the input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScaledPnl {
    pub entries: Vec<PnlEntry>,
    /// The quantity each entry was scaled by, parallel to `entries`.
    pub quantities: Vec<u32>,
    /// One `MissingHolding` per symbol dropped from `entries`.
    pub issues: Vec<AnalyticsError>,
}

/// The standardized result of running the whole PnL pipeline.
///
/// This is what the presentation layer renders: per-share figures ranked best
/// to worst, a profit/loss flag per symbol, the same figures scaled by the
/// holding, and their sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlReport {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub quotes: Vec<BoundaryQuote>,
    pub per_share: Vec<PnlEntry>,
    pub positive: BTreeMap<Symbol, bool>,
    pub scaled: Vec<PnlEntry>,
    pub quantities: Vec<u32>,
    pub total: f64,
    /// Every symbol that was excluded somewhere along the pipeline, and why.
    pub issues: Vec<AnalyticsError>,
}

impl PnlReport {
    pub fn is_profitable(&self, symbol: &Symbol) -> bool {
        self.positive.get(symbol).copied().unwrap_or(false)
    }

    pub fn quote(&self, symbol: &Symbol) -> Option<&BoundaryQuote> {
        self.quotes.iter().find(|q| &q.symbol == symbol)
    }
}
