use crate::error::ApiError;
use crate::responses::ChartResponse;
use crate::{PriceSeries, PriceTableProvider};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use configuration::Provider;
use core_types::Symbol;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

const CHART_PATH: &str = "/v8/finance/chart";

/// A concrete implementation of the `PriceTableProvider` for Yahoo Finance.
///
/// Prices are the "Adj Close" series, adjusted for splits and dividend
/// distributions, falling back to the raw close when no adjusted series is
/// published for the symbol.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(settings: &Provider) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        // The chart API rejects requests without a browser-like user agent.
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) tickerpnl"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        format!("{}{}/{}", self.base_url, CHART_PATH, symbol)
    }
}

#[async_trait]
impl PriceTableProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        if start >= end {
            return Ok(Vec::new());
        }

        let period1 = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp();
        let period2 = end.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp();

        tracing::debug!(%symbol, %start, %end, "Fetching daily history from Yahoo.");

        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div|split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // Error bodies share the chart envelope, so parse before looking at the status.
        match parse_chart(symbol, &text) {
            Err(ApiError::Deserialization(e)) if !status.is_success() => Err(ApiError::ApiError(
                format!("HTTP {} for {}: {}", status, symbol, e),
            )),
            result => result,
        }
    }
}

/// Extracts the daily price series from a chart response body.
///
/// Timestamps are shifted into the exchange's local time before taking the
/// calendar date. Days with a `null` price are skipped, so they end up as
/// missing cells once the series is joined into a table.
pub fn parse_chart(symbol: &Symbol, body: &str) -> Result<PriceSeries, ApiError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(if error.code == "Not Found" {
            ApiError::SymbolNotFound(symbol.to_string())
        } else {
            ApiError::ApiError(format!("{}: {}", error.code, error.description))
        });
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(ApiError::SymbolNotFound(symbol.to_string()));
    };

    let prices = match result.indicators.adjclose.into_iter().next() {
        Some(adjusted) => adjusted.adjclose,
        None => {
            tracing::debug!(%symbol, "No adjusted closes published, using raw closes.");
            result
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default()
        }
    };

    if prices.len() != result.timestamp.len() {
        return Err(ApiError::InvalidData(format!(
            "{} timestamps but {} prices for {}",
            result.timestamp.len(),
            prices.len(),
            symbol
        )));
    }

    let offset = result.meta.gmtoffset;
    let mut series: PriceSeries = Vec::with_capacity(prices.len());
    for (timestamp, price) in result.timestamp.into_iter().zip(prices) {
        let Some(price) = price.filter(|p| p.is_finite()) else {
            continue;
        };
        let date = Utc
            .timestamp_opt(timestamp + offset, 0)
            .single()
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", timestamp)))?
            .date_naive();

        // Yahoo sometimes repeats the current session as a second row for today.
        match series.last_mut() {
            Some(last) if last.0 == date => last.1 = price,
            _ => series.push((date, price)),
        }
    }

    tracing::debug!(%symbol, rows = series.len(), "Parsed chart response.");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, d).unwrap()
    }

    const AAPL_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "symbol": "AAPL", "gmtoffset": -18000},
                "timestamp": [1641220200, 1641306600, 1641393000],
                "indicators": {
                    "quote": [{"close": [182.01, 179.70, 174.92]}],
                    "adjclose": [{"adjclose": [179.95, null, 172.94]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_adjusted_closes_and_skips_nulls() {
        let series = parse_chart(&sym("AAPL"), AAPL_BODY).unwrap();
        assert_eq!(series, vec![(day(1, 3), 179.95), (day(1, 5), 172.94)]);
    }

    #[test]
    fn falls_back_to_raw_close() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "X", "gmtoffset": 0},
            "timestamp": [1641220200],
            "indicators": {"quote": [{"close": [10.5]}]}
        }], "error": null}}"#;
        let series = parse_chart(&sym("X"), body).unwrap();
        assert_eq!(series, vec![(day(1, 3), 10.5)]);
    }

    #[test]
    fn range_without_trading_days_is_empty() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "AAPL", "gmtoffset": -18000},
            "indicators": {"quote": [{}], "adjclose": [{}]}
        }], "error": null}}"#;
        assert!(parse_chart(&sym("AAPL"), body).unwrap().is_empty());
    }

    #[test]
    fn not_found_maps_to_symbol_not_found() {
        let body = r#"{"chart": {"result": null, "error": {
            "code": "Not Found", "description": "No data found, symbol may be delisted"
        }}}"#;
        assert!(matches!(
            parse_chart(&sym("GONE"), body),
            Err(ApiError::SymbolNotFound(s)) if s == "GONE"
        ));
    }

    #[test]
    fn other_upstream_errors_are_reported() {
        let body = r#"{"chart": {"result": null, "error": {
            "code": "Bad Request", "description": "Invalid input - start date cannot be after end date"
        }}}"#;
        assert!(matches!(parse_chart(&sym("AAPL"), body), Err(ApiError::ApiError(_))));
    }

    #[test]
    fn mismatched_lengths_are_invalid() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "AAPL", "gmtoffset": 0},
            "timestamp": [1641220200, 1641306600],
            "indicators": {"adjclose": [{"adjclose": [1.0]}]}
        }], "error": null}}"#;
        assert!(matches!(parse_chart(&sym("AAPL"), body), Err(ApiError::InvalidData(_))));
    }

    #[test]
    fn garbage_is_a_deserialization_error() {
        assert!(matches!(
            parse_chart(&sym("AAPL"), "<html>nope</html>"),
            Err(ApiError::Deserialization(_))
        ));
    }

    #[test]
    fn chart_url_joins_base_and_symbol() {
        let settings = Provider {
            base_url: "http://localhost:9999/".to_string(),
            ..Provider::default()
        };
        let client = YahooClient::new(&settings).unwrap();
        assert_eq!(
            client.chart_url(&sym("msft")),
            "http://localhost:9999/v8/finance/chart/MSFT"
        );
    }
}
