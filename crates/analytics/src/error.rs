use core_types::{Boundary, Symbol};
use serde::Serialize;
use thiserror::Error;

/// Conditions the PnL engine can run into.
///
/// Only `EmptyTable` aborts a computation. The per-symbol variants are
/// collected alongside the result so the rest of the symbols still get
/// their figures.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalyticsError {
    #[error("Price table is not computable: {rows} rows and {columns} columns")]
    EmptyTable { rows: usize, columns: usize },

    #[error("No {boundary} price for '{symbol}', its PnL is undefined")]
    MissingPrice { symbol: Symbol, boundary: Boundary },

    #[error("No quantity declared for '{symbol}'")]
    MissingHolding { symbol: Symbol },
}

impl AnalyticsError {
    /// The symbol a per-symbol condition refers to.
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            AnalyticsError::EmptyTable { .. } => None,
            AnalyticsError::MissingPrice { symbol, .. } => Some(symbol),
            AnalyticsError::MissingHolding { symbol } => Some(symbol),
        }
    }
}
