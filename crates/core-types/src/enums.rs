use serde::{Deserialize, Serialize};

/// Which edge of a price table's date axis a price was read from.
///
/// The first row acts as the purchase price and the last row as the sale
/// (current) price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    First,
    Last,
}

impl Boundary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Boundary::First => "first",
            Boundary::Last => "last",
        }
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What scaling does with a symbol that has no declared quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingHoldingPolicy {
    /// Drop the symbol from the scaled result and report it.
    #[default]
    Exclude,
    /// Scale the symbol by this quantity instead. Must be at least 1.
    DefaultQuantity(u32),
}
