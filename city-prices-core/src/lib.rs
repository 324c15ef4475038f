//! Core library for the `city-prices` CLI.
//!
//! This crate defines:
//! - Configuration & settings resolution
//! - The price provider abstraction and the Numbeo client
//! - Shared domain models (query, price items, reports)
//! - Plain-text rendering of a report
//!
//! It is used by `city-prices-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod presenter;
pub mod provider;

pub use config::{Config, Overrides, Settings};
pub use error::{ConfigError, FetchError};
pub use model::{CategoryGroup, PriceItem, PriceReport, Query};
pub use presenter::{format_price, group_by_category, render, render_json};
pub use provider::{PriceProvider, fetch, numbeo::NumbeoProvider};
