use crate::error::AnalyticsError;
use crate::report::{BoundaryQuote, PerSharePnl, PnlReport, ScaledPnl};
use core_types::{Boundary, Holding, MissingHoldingPolicy, PnlEntry, PriceTable, Symbol};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A stateless calculator for deriving profit-and-loss figures from a price table.
///
/// The first row of the table is treated as the purchase date and the last row
/// as the sale date. Nothing is retained between calls, so the same inputs
/// always produce the same outputs.
#[derive(Debug, Default, Clone)]
pub struct PnlEngine {
    missing_holding: MissingHoldingPolicy,
}

impl PnlEngine {
    pub fn new(missing_holding: MissingHoldingPolicy) -> Self {
        Self { missing_holding }
    }

    /// The main entry point, running the whole pipeline.
    ///
    /// # Arguments
    ///
    /// * `table` - Daily prices, one column per symbol.
    /// * `holding` - The quantity owned of each symbol.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PnlReport`, or `AnalyticsError::EmptyTable`
    /// when the table has no rows or no columns. Symbols that cannot be priced
    /// or scaled are listed in `PnlReport::issues` instead of failing the run.
    pub fn evaluate(
        &self,
        table: &PriceTable,
        holding: &Holding,
    ) -> Result<PnlReport, AnalyticsError> {
        let per_share = self.compute_per_share_pnl(table)?;
        let ranked = self.rank_descending(&per_share.pnl);
        let positive = self.classify_sign(&per_share.pnl);
        let scaled = self.scale_by_holdings(&ranked, holding);
        let total = self.total_pnl(&scaled.entries);

        let mut issues = per_share.issues;
        issues.extend(scaled.issues);

        tracing::info!(
            symbols = table.column_count(),
            priced = ranked.len(),
            excluded = issues.len(),
            total,
            "PnL evaluated."
        );

        Ok(PnlReport {
            first_date: per_share.first_date,
            last_date: per_share.last_date,
            quotes: per_share.quotes,
            per_share: ranked,
            positive,
            scaled: scaled.entries,
            quantities: scaled.quantities,
            total,
            issues,
        })
    }

    /// Computes the price change per share between the first and last rows.
    ///
    /// A symbol without a price on either boundary row is left out of the
    /// result and reported as `MissingPrice`. When both are missing the first
    /// boundary is reported.
    pub fn compute_per_share_pnl(&self, table: &PriceTable) -> Result<PerSharePnl, AnalyticsError> {
        let (Some(first_date), Some(last_date)) = (table.first_date(), table.last_date()) else {
            return Err(empty_table(table));
        };
        if table.column_count() == 0 {
            return Err(empty_table(table));
        }

        let last_row = table.row_count() - 1;
        let mut pnl = BTreeMap::new();
        let mut quotes = Vec::with_capacity(table.column_count());
        let mut issues = Vec::new();

        for symbol in table.symbols() {
            let purchase = table.price(0, symbol);
            let current = table.price(last_row, symbol);

            match (purchase, current) {
                (Some(purchase_price), Some(current_price)) => {
                    pnl.insert(symbol.clone(), current_price - purchase_price);
                    quotes.push(BoundaryQuote {
                        symbol: symbol.clone(),
                        purchase_price,
                        current_price,
                    });
                }
                (None, _) => issues.push(missing_price(symbol, Boundary::First)),
                (Some(_), None) => issues.push(missing_price(symbol, Boundary::Last)),
            }
        }

        tracing::debug!(
            %first_date,
            %last_date,
            priced = pnl.len(),
            excluded = issues.len(),
            "Per-share PnL computed."
        );

        Ok(PerSharePnl {
            first_date,
            last_date,
            pnl,
            quotes,
            issues,
        })
    }

    /// Orders PnL values from highest to lowest.
    ///
    /// Exactly equal values are ordered by symbol, ascending, so the result does
    /// not depend on the iteration order of the input. `-0.0` ties with `0.0`
    /// and NaN values sink to the end.
    pub fn rank_descending<'a, I>(&self, pnl: I) -> Vec<PnlEntry>
    where
        I: IntoIterator<Item = (&'a Symbol, &'a f64)>,
    {
        let mut ranked: Vec<PnlEntry> = pnl
            .into_iter()
            .map(|(symbol, value)| PnlEntry::new(symbol.clone(), *value))
            .collect();

        ranked.sort_by(|a, b| {
            descending(a.value, b.value).then_with(|| a.symbol.cmp(&b.symbol))
        });

        ranked
    }

    /// Flags each symbol as profitable (`true`) when its PnL is strictly positive.
    ///
    /// Zero is a loss/breakeven (`false`); there is no neutral state.
    pub fn classify_sign<'a, I>(&self, pnl: I) -> BTreeMap<Symbol, bool>
    where
        I: IntoIterator<Item = (&'a Symbol, &'a f64)>,
    {
        pnl.into_iter()
            .map(|(symbol, value)| (symbol.clone(), *value > 0.0))
            .collect()
    }

    /// Multiplies each per-share figure by the quantity held, keeping the input order.
    pub fn scale_by_holdings(&self, ranked: &[PnlEntry], holding: &Holding) -> ScaledPnl {
        let mut scaled = ScaledPnl::default();

        for entry in ranked {
            let quantity = match (holding.quantity(&entry.symbol), self.missing_holding) {
                (Some(quantity), _) => quantity,
                (None, MissingHoldingPolicy::DefaultQuantity(fallback)) => {
                    tracing::debug!(symbol = %entry.symbol, fallback, "Using default quantity.");
                    fallback
                }
                (None, MissingHoldingPolicy::Exclude) => {
                    tracing::warn!(symbol = %entry.symbol, "No quantity declared, symbol excluded.");
                    scaled.issues.push(AnalyticsError::MissingHolding {
                        symbol: entry.symbol.clone(),
                    });
                    continue;
                }
            };

            scaled
                .entries
                .push(PnlEntry::new(entry.symbol.clone(), entry.value * f64::from(quantity)));
            scaled.quantities.push(quantity);
        }

        scaled
    }

    /// Sums the scaled figures left to right. An empty sequence sums to zero.
    pub fn total_pnl(&self, scaled: &[PnlEntry]) -> f64 {
        scaled.iter().fold(0.0, |total, entry| total + entry.value)
    }
}

/// Highest value first, NaN last.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => zero_normalized(b).total_cmp(&zero_normalized(a)),
    }
}

fn zero_normalized(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn empty_table(table: &PriceTable) -> AnalyticsError {
    AnalyticsError::EmptyTable {
        rows: table.row_count(),
        columns: table.column_count(),
    }
}

fn missing_price(symbol: &Symbol, boundary: Boundary) -> AnalyticsError {
    tracing::warn!(%symbol, %boundary, "Boundary price missing, symbol excluded.");
    AnalyticsError::MissingPrice {
        symbol: symbol.clone(),
        boundary,
    }
}
