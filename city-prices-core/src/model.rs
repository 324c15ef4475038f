use chrono::NaiveDate;
use serde::Serialize;

/// One lookup against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub city: String,
    pub country: String,
    pub api_key: String,
}

impl Query {
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self { city: city.into(), country: country.into(), api_key: api_key.into() }
    }
}

/// A single priced good or service, e.g. "Meal, Inexpensive Restaurant".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceItem {
    pub name: String,
    pub category: String,
    pub average_price: f64,
    /// Lowest and highest reported prices, absent when the provider has too few samples.
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub currency: String,
    /// Number of user-submitted samples behind the statistics. Zero means no coverage.
    pub data_points: u32,
}

/// Parsed provider response for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceReport {
    pub city: Option<String>,
    pub country: Option<String>,
    pub currency: String,
    pub contributors: Option<u32>,
    pub last_updated: Option<NaiveDate>,
    pub items: Vec<PriceItem>,
}

impl PriceReport {
    /// An empty report in the given currency, without location metadata.
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            city: None,
            country: None,
            currency: currency.into(),
            contributors: None,
            last_updated: None,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Items sharing a category label, in the order they appeared in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup<'a> {
    pub name: &'a str,
    pub items: Vec<&'a PriceItem>,
}
