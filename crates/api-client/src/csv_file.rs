use crate::error::ApiError;
use crate::{PriceSeries, PriceTableProvider};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PriceTable, Symbol};
use std::io;
use std::path::PathBuf;

const DATE_COLUMN: &str = "date";

/// A price source backed by a wide CSV file.
///
/// The header is `date` followed by one column per symbol; each record is one
/// trading day in ISO format (`2022-01-03`). An empty cell or `NaN` marks a
/// missing price. This is also the format `write_table` produces.
#[derive(Debug, Clone)]
pub struct CsvPriceFile {
    path: PathBuf,
}

impl CsvPriceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the whole file into a price table.
    pub fn load(&self) -> Result<PriceTable, ApiError> {
        let file = std::fs::File::open(&self.path)?;
        read_table(file)
    }
}

#[async_trait]
impl PriceTableProvider for CsvPriceFile {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        let table = self.load()?;
        select_series(&table, symbol, start, end)
    }

    /// Reads the file once rather than once per symbol.
    async fn fetch_price_table(
        &self,
        symbols: &[Symbol],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, ApiError> {
        let table = self.load()?;
        tracing::debug!(path = %self.path.display(), rows = table.row_count(), "Loaded price file.");

        let results = symbols
            .iter()
            .map(|symbol| (symbol.clone(), select_series(&table, symbol, start, end)))
            .collect();
        crate::collect_table(results)
    }
}

/// The present prices of `symbol` for `start <= date < end`.
fn select_series(
    table: &PriceTable,
    symbol: &Symbol,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, ApiError> {
    let column = table
        .column(symbol)
        .ok_or_else(|| ApiError::SymbolNotFound(symbol.to_string()))?;

    Ok(table
        .dates()
        .iter()
        .zip(column)
        .filter(|(date, _)| **date >= start && **date < end)
        .filter_map(|(date, price)| price.map(|p| (*date, p)))
        .collect())
}

/// Parses a wide CSV price table.
pub fn read_table<R: io::Read>(reader: R) -> Result<PriceTable, ApiError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(first) if first.eq_ignore_ascii_case(DATE_COLUMN) => {}
        other => {
            return Err(ApiError::InvalidData(format!(
                "first CSV column must be '{}', found {:?}",
                DATE_COLUMN, other
            )));
        }
    }
    let symbols = columns
        .map(Symbol::new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut dates = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let raw_date = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| ApiError::InvalidData(format!("bad date '{}': {}", raw_date, e)))?;

        let row = record
            .iter()
            .skip(1)
            .map(|cell| parse_price(cell, date))
            .collect::<Result<Vec<_>, _>>()?;

        dates.push(date);
        rows.push(row);
    }

    Ok(PriceTable::new(dates, symbols, rows)?)
}

fn parse_price(cell: &str, date: NaiveDate) -> Result<Option<f64>, ApiError> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| ApiError::InvalidData(format!("bad price '{}' on {}: {}", cell, date, e)))
}

/// Writes a price table in the same wide format `read_table` accepts.
pub fn write_table<W: io::Write>(table: &PriceTable, writer: W) -> Result<(), ApiError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(table.symbols().iter().map(Symbol::to_string));
    writer.write_record(&header)?;

    for (date, cells) in table.rows() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(cells.iter().map(|cell| cell.map(|p| p.to_string()).unwrap_or_default()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
