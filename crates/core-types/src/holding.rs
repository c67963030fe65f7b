use crate::error::CoreError;
use crate::structs::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The number of shares owned per symbol.
///
/// Every quantity is at least one. A holding is free to change between PnL
/// computations; the engine only ever borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Symbol, u32>", into = "BTreeMap<Symbol, u32>")]
pub struct Holding {
    quantities: BTreeMap<Symbol, u32>,
}

impl Holding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives every symbol the same quantity.
    pub fn uniform<'a, I>(symbols: I, quantity: u32) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = &'a Symbol>,
    {
        let mut holding = Self::new();
        for symbol in symbols {
            holding.set(symbol.clone(), quantity)?;
        }
        Ok(holding)
    }

    /// Sets the quantity for `symbol`, replacing any previous value.
    pub fn set(&mut self, symbol: Symbol, quantity: u32) -> Result<(), CoreError> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity(symbol.to_string()));
        }
        self.quantities.insert(symbol, quantity);
        Ok(())
    }

    pub fn quantity(&self, symbol: &Symbol) -> Option<u32> {
        self.quantities.get(symbol).copied()
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.quantities.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, u32)> + '_ {
        self.quantities.iter().map(|(symbol, quantity)| (symbol, *quantity))
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl TryFrom<BTreeMap<Symbol, u32>> for Holding {
    type Error = CoreError;

    fn try_from(quantities: BTreeMap<Symbol, u32>) -> Result<Self, Self::Error> {
        let mut holding = Holding::new();
        for (symbol, quantity) in quantities {
            holding.set(symbol, quantity)?;
        }
        Ok(holding)
    }
}

impl From<Holding> for BTreeMap<Symbol, u32> {
    fn from(holding: Holding) -> Self {
        holding.quantities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut holding = Holding::new();
        assert_eq!(
            holding.set(sym("AAPL"), 0),
            Err(CoreError::InvalidQuantity("AAPL".to_string()))
        );
        assert!(holding.is_empty());
    }

    #[test]
    fn set_replaces_previous_quantity() {
        let mut holding = Holding::new();
        holding.set(sym("AAPL"), 3).unwrap();
        holding.set(sym("AAPL"), 5).unwrap();
        assert_eq!(holding.quantity(&sym("AAPL")), Some(5));
        assert_eq!(holding.len(), 1);
    }

    #[test]
    fn uniform_covers_every_symbol() {
        let symbols = vec![sym("A"), sym("B")];
        let holding = Holding::uniform(&symbols, 2).unwrap();
        assert_eq!(holding.quantity(&sym("A")), Some(2));
        assert_eq!(holding.quantity(&sym("B")), Some(2));
        assert!(!holding.contains(&sym("C")));
        assert!(Holding::uniform(&symbols, 0).is_err());
    }

    #[test]
    fn deserialization_validates_quantities() {
        let holding: Holding = serde_json::from_str(r#"{"aapl": 3}"#).unwrap();
        assert_eq!(holding.quantity(&sym("AAPL")), Some(3));
        assert!(serde_json::from_str::<Holding>(r#"{"AAPL": 0}"#).is_err());
    }
}
