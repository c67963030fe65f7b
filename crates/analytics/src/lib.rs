//! # tickerpnl Analytics Engine
//!
//! This crate turns a table of historical prices into profit-and-loss figures.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of data
//!   providers or of how results are displayed. It depends only on `core-types`.
//! - **Stateless Calculation:** `PnlEngine` takes a `PriceTable` and a `Holding` as
//!   input and produces a `PnlReport` as output. No I/O, no shared state.
//! - **Per-Symbol Failures:** A symbol that cannot be priced or scaled is excluded
//!   and reported; the remaining symbols are still computed.
//!
//! ## Public API
//!
//! - `PnlEngine`: per-share PnL, ranking, sign classification, scaling and totals.
//! - `PnlReport`: the standardized result of the full pipeline.
//! - `AnalyticsError`: the conditions the engine reports.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::PnlEngine;
pub use error::AnalyticsError;
pub use report::{BoundaryQuote, PerSharePnl, PnlReport, ScaledPnl};
