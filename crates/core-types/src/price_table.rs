use crate::error::CoreError;
use crate::structs::Symbol;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A date-by-symbol matrix of daily prices.
///
/// Rows follow the trading calendar in strictly increasing date order. Days the
/// market was closed are simply absent, so consecutive rows need not be
/// consecutive calendar days. Every cell is either a finite price or `None`
/// for "no trading data"; a missing price is never stored as zero.
///
/// A table is immutable once built. A new request builds a new table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<Symbol>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Builds a table from row-major cells, validating its invariants.
    ///
    /// Non-finite prices (NaN, infinities) are stored as missing.
    pub fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<Symbol>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, CoreError> {
        if dates.len() != rows.len() {
            return Err(CoreError::RowCountMismatch {
                dates: dates.len(),
                rows: rows.len(),
            });
        }

        for pair in dates.windows(2) {
            if pair[0] >= pair[1] {
                return Err(CoreError::UnorderedDates {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        for symbol in &symbols {
            if !seen.insert(symbol) {
                return Err(CoreError::DuplicateSymbol(symbol.to_string()));
            }
        }

        let rows = dates
            .iter()
            .zip(rows)
            .map(|(date, row)| {
                if row.len() != symbols.len() {
                    return Err(CoreError::RowWidthMismatch {
                        date: *date,
                        expected: symbols.len(),
                        actual: row.len(),
                    });
                }
                Ok(row
                    .into_iter()
                    .map(|cell| cell.filter(|price| price.is_finite()))
                    .collect())
            })
            .collect::<Result<Vec<Vec<Option<f64>>>, CoreError>>()?;

        Ok(Self {
            dates,
            symbols,
            rows,
        })
    }

    /// Outer-joins per-symbol price series onto the union of their dates.
    ///
    /// Columns appear in the order of `series`. A symbol with no observation on
    /// a given date gets a missing cell for that row, and a symbol with an
    /// empty series becomes an all-missing column. If a series repeats a date
    /// the later observation wins.
    pub fn from_series(series: Vec<(Symbol, Vec<(NaiveDate, f64)>)>) -> Result<Self, CoreError> {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(date, _)| *date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let index: BTreeMap<NaiveDate, usize> = dates
            .iter()
            .enumerate()
            .map(|(i, date)| (*date, i))
            .collect();

        let mut rows = vec![vec![None; series.len()]; dates.len()];
        let mut symbols = Vec::with_capacity(series.len());

        for (column, (symbol, points)) in series.into_iter().enumerate() {
            for (date, price) in points {
                // Every date came from some series, so the lookup always hits.
                if let Some(&row) = index.get(&date) {
                    rows[row][column] = Some(price);
                }
            }
            symbols.push(symbol);
        }

        Self::new(dates, symbols, rows)
    }

    /// Same as [`PriceTable::from_series`] with columns in symbol order.
    pub fn from_columns(
        columns: BTreeMap<Symbol, Vec<(NaiveDate, f64)>>,
    ) -> Result<Self, CoreError> {
        Self::from_series(columns.into_iter().collect())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[Option<f64>])> + '_ {
        self.dates
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_count(&self) -> usize {
        self.symbols.len()
    }

    /// A table is empty when it has no dates or no symbols.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.symbols.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn position(&self, symbol: &Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Price of `symbol` on the `row`-th date, if both exist and the cell is present.
    pub fn price(&self, row: usize, symbol: &Symbol) -> Option<f64> {
        let column = self.position(symbol)?;
        self.rows.get(row)?.get(column).copied().flatten()
    }

    /// All cells of one symbol in date order.
    pub fn column(&self, symbol: &Symbol) -> Option<Vec<Option<f64>>> {
        let column = self.position(symbol)?;
        Some(self.rows.iter().map(|row| row[column]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn builds_a_valid_table() {
        let table = PriceTable::new(
            vec![day(2), day(3)],
            vec![sym("A"), sym("B")],
            vec![vec![Some(10.0), Some(20.0)], vec![Some(15.0), None]],
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.first_date(), Some(day(2)));
        assert_eq!(table.last_date(), Some(day(3)));
        assert_eq!(table.price(1, &sym("A")), Some(15.0));
        assert_eq!(table.price(1, &sym("B")), None);
        assert_eq!(table.price(5, &sym("A")), None);
        assert_eq!(table.price(0, &sym("Z")), None);
        assert_eq!(table.column(&sym("B")), Some(vec![Some(20.0), None]));
    }

    #[test]
    fn rejects_dates_out_of_order() {
        let err = PriceTable::new(
            vec![day(3), day(3)],
            vec![sym("A")],
            vec![vec![Some(1.0)], vec![Some(2.0)]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::UnorderedDates {
                previous: day(3),
                next: day(3)
            }
        );
    }

    #[test]
    fn rejects_duplicate_symbols_and_ragged_rows() {
        let duplicate = PriceTable::new(
            vec![day(2)],
            vec![sym("A"), sym("a")],
            vec![vec![Some(1.0), Some(2.0)]],
        );
        assert_eq!(duplicate, Err(CoreError::DuplicateSymbol("A".to_string())));

        let ragged = PriceTable::new(vec![day(2)], vec![sym("A"), sym("B")], vec![vec![Some(1.0)]]);
        assert!(matches!(
            ragged,
            Err(CoreError::RowWidthMismatch { expected: 2, actual: 1, .. })
        ));

        let short = PriceTable::new(vec![day(2), day(3)], vec![sym("A")], vec![vec![Some(1.0)]]);
        assert_eq!(short, Err(CoreError::RowCountMismatch { dates: 2, rows: 1 }));
    }

    #[test]
    fn non_finite_prices_become_missing() {
        let table = PriceTable::new(
            vec![day(2)],
            vec![sym("A"), sym("B")],
            vec![vec![Some(f64::NAN), Some(f64::INFINITY)]],
        )
        .unwrap();
        assert_eq!(table.column(&sym("A")), Some(vec![None]));
        assert_eq!(table.column(&sym("B")), Some(vec![None]));
    }

    #[test]
    fn series_are_outer_joined_on_dates() {
        let table = PriceTable::from_series(vec![
            (sym("MSFT"), vec![(day(2), 100.0), (day(4), 110.0)]),
            (sym("AAPL"), vec![(day(3), 50.0), (day(4), 55.0)]),
            (sym("GONE"), vec![]),
        ])
        .unwrap();

        assert_eq!(table.dates(), &[day(2), day(3), day(4)]);
        let names: Vec<&str> = table.symbols().iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["MSFT", "AAPL", "GONE"]);
        assert_eq!(table.column(&sym("MSFT")), Some(vec![Some(100.0), None, Some(110.0)]));
        assert_eq!(table.column(&sym("AAPL")), Some(vec![None, Some(50.0), Some(55.0)]));
        assert_eq!(table.column(&sym("GONE")), Some(vec![None, None, None]));
    }

    #[test]
    fn columns_map_is_ordered_by_symbol() {
        let mut columns = BTreeMap::new();
        columns.insert(sym("B"), vec![(day(2), 1.0)]);
        columns.insert(sym("A"), vec![(day(2), 2.0)]);
        let table = PriceTable::from_columns(columns).unwrap();
        assert_eq!(table.symbols(), &[sym("A"), sym("B")]);
    }

    #[test]
    fn empty_tables_report_empty() {
        let no_rows = PriceTable::new(vec![], vec![sym("A")], vec![]).unwrap();
        assert!(no_rows.is_empty());
        assert_eq!(no_rows.first_date(), None);

        let no_columns = PriceTable::new(vec![day(2)], vec![], vec![vec![]]).unwrap();
        assert!(no_columns.is_empty());
    }
}
