use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A ticker symbol such as "AAPL".
///
/// Symbols are trimmed and upper-cased on construction so that "aapl " and
/// "AAPL" name the same column. Ordering is lexicographic, which is what the
/// ranking uses to break ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "symbol must not be empty".to_string(),
            ));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                format!("'{}' contains whitespace", raw.trim()),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One element of a ranked or scaled PnL sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlEntry {
    pub symbol: Symbol,
    pub value: f64,
}

impl PnlEntry {
    pub fn new(symbol: Symbol, value: f64) -> Self {
        Self { symbol, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalized() {
        let symbol = Symbol::new("  aapl ").unwrap();
        assert_eq!(symbol.as_str(), "AAPL");
        assert_eq!(symbol, "AAPL".parse::<Symbol>().unwrap());
    }

    #[test]
    fn empty_symbol_is_rejected() {
        assert!(matches!(
            Symbol::new("   "),
            Err(CoreError::InvalidInput(field, _)) if field == "symbol"
        ));
        assert!(Symbol::new("BRK B").is_err());
    }

    #[test]
    fn symbols_order_lexicographically() {
        let mut symbols = vec![
            Symbol::new("MSFT").unwrap(),
            Symbol::new("AAPL").unwrap(),
            Symbol::new("GOOGL").unwrap(),
        ];
        symbols.sort();
        let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["AAPL", "GOOGL", "MSFT"]);
    }

    #[test]
    fn symbol_deserializes_through_validation() {
        let symbol: Symbol = serde_json::from_str("\"meta\"").unwrap();
        assert_eq!(symbol.as_str(), "META");
        assert!(serde_json::from_str::<Symbol>("\"\"").is_err());
    }
}
