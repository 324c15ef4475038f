use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::{
    error::FetchError,
    model::{PriceReport, Query},
    provider::numbeo::NumbeoProvider,
};

pub mod numbeo;

/// A source of cost-of-living prices.
#[async_trait]
pub trait PriceProvider: Send + Sync + Debug {
    /// Issue exactly one request for `query` and decode the answer.
    async fn get_prices(&self, query: &Query) -> Result<PriceReport, FetchError>;
}

/// Fetch prices for `query` from the Numbeo API rooted at `base_url`.
pub async fn fetch(
    query: &Query,
    base_url: &str,
    timeout: Duration,
) -> Result<PriceReport, FetchError> {
    let provider = NumbeoProvider::new(base_url, timeout)?;
    provider.get_prices(query).await
}
