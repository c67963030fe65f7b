pub mod enums;
pub mod error;
pub mod holding;
pub mod price_table;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Boundary, MissingHoldingPolicy};
pub use error::CoreError;
pub use holding::Holding;
pub use price_table::PriceTable;
pub use structs::{PnlEntry, Symbol};
