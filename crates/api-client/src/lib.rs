use crate::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PriceTable, Symbol};
use futures::future::join_all;

pub mod csv_file;
pub mod error;
pub mod responses;
pub mod yahoo;
// --- Public API ---
pub use csv_file::CsvPriceFile;
pub use yahoo::YahooClient;

/// Daily prices of a single symbol, oldest first.
pub type PriceSeries = Vec<(NaiveDate, f64)>;

/// The generic, abstract interface for a source of historical prices.
/// This trait is the contract the CLI uses, allowing the underlying source
/// (remote API or local file) to be swapped out.
#[async_trait]
pub trait PriceTableProvider: Send + Sync {
    /// A short name for logs and error messages.
    fn name(&self) -> &'static str;

    /// Fetches the daily adjusted closes of one symbol for `start <= date < end`.
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError>;

    /// Fetches every symbol concurrently and joins them into one table.
    ///
    /// Columns follow the order of `symbols`. See [`collect_table`] for how
    /// unknown symbols are treated.
    async fn fetch_price_table(
        &self,
        symbols: &[Symbol],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ApiError> {
        let fetches = symbols
            .iter()
            .map(|symbol| async move { (symbol.clone(), self.fetch_history(symbol, start, end).await) });
        let results = join_all(fetches).await;
        collect_table(results)
    }
}

/// Joins per-symbol fetch results into a price table.
///
/// A symbol the source does not know becomes an all-missing column, so that
/// the PnL engine reports it instead of the whole request failing. Any other
/// error aborts the table.
pub fn collect_table(
    results: Vec<(Symbol, Result<PriceSeries, ApiError>)>,
) -> Result<PriceTable, ApiError> {
    let series = results
        .into_iter()
        .map(|(symbol, result)| match result {
            Ok(series) => Ok((symbol, series)),
            Err(ApiError::SymbolNotFound(_)) => {
                tracing::warn!(%symbol, "Symbol not found, keeping an empty column.");
                Ok((symbol, Vec::new()))
            }
            Err(e) => Err(e),
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(PriceTable::from_series(series)?)
}
