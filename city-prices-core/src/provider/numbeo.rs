use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, redirect::Policy};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::FetchError,
    model::{PriceItem, PriceReport, Query},
};

use super::PriceProvider;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_CATEGORY: &str = "Other";

/// Client for the Numbeo `city_prices` endpoint.
#[derive(Debug, Clone)]
pub struct NumbeoProvider {
    base_url: String,
    http: Client,
}

impl NumbeoProvider {
    /// `timeout` bounds the whole request, connect included.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .redirect(Policy::limited(5))
            .user_agent(concat!("city-prices/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { base_url, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/city_prices", self.base_url)
    }
}

#[async_trait]
impl PriceProvider for NumbeoProvider {
    async fn get_prices(&self, query: &Query) -> Result<PriceReport, FetchError> {
        let url = self.endpoint();
        tracing::debug!(%url, city = %query.city, country = %query.country, "requesting city prices");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("city", query.city.as_str()),
                ("country", query.country.as_str()),
                ("api_key", query.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(%status, bytes = body.len(), "received provider response");

        check_status(status, &body)?;

        let report = parse_report(&body)?;
        tracing::info!(items = report.items.len(), currency = %report.currency, "parsed price report");
        Ok(report)
    }
}

/// Map a non-2xx status onto the error taxonomy.
fn check_status(status: StatusCode, body: &str) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }

    let detail = format!("provider responded with HTTP {status}: {}", truncate_body(body));

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth(detail),
        StatusCode::NOT_FOUND => FetchError::NotFound(detail),
        _ => FetchError::Network(detail),
    })
}

/// Decode a `city_prices` body into a report.
pub fn parse_report(body: &str) -> Result<PriceReport, FetchError> {
    let parsed: NbResponse = serde_json::from_str(body)?;

    if let Some(message) = parsed.error.filter(|m| !m.trim().is_empty()) {
        return Err(classify_provider_error(message));
    }

    let currency = parsed
        .currency
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| FetchError::Parse("response is missing the currency code".into()))?;

    let prices = parsed
        .prices
        .ok_or_else(|| FetchError::Parse("response is missing the prices array".into()))?;

    let last_updated = match (parsed.year_last_update, parsed.month_last_update) {
        (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, 1),
        _ => None,
    };

    let items = prices
        .into_iter()
        .map(|p| p.into_item(&currency))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(odd) = items.iter().find(|i| i.currency != currency) {
        tracing::warn!(
            item = %odd.name,
            item_currency = %odd.currency,
            report_currency = %currency,
            "price item uses a different currency than the report"
        );
    }

    Ok(PriceReport {
        city: parsed.name,
        country: parsed.country,
        currency,
        contributors: parsed.contributors,
        last_updated,
        items,
    })
}

/// Numbeo reports some failures as `{"error": "..."}` with a 200 status.
/// Only a whole `key` word counts, so `api_key` matches and `Turkey` does not.
fn classify_provider_error(message: String) -> FetchError {
    let lower = message.to_lowercase();
    let mentions_key = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| matches!(word, "key" | "keys" | "apikey"));

    if mentions_key {
        FetchError::Auth(message)
    } else {
        FetchError::NotFound(message)
    }
}

#[derive(Debug, Deserialize)]
struct NbResponse {
    error: Option<String>,
    name: Option<String>,
    country: Option<String>,
    currency: Option<String>,
    contributors: Option<u32>,
    #[serde(rename = "monthLastUpdate")]
    month_last_update: Option<u32>,
    #[serde(rename = "yearLastUpdate")]
    year_last_update: Option<i32>,
    prices: Option<Vec<NbPrice>>,
}

#[derive(Debug, Deserialize)]
struct NbPrice {
    item_name: String,
    category_name: Option<String>,
    average_price: f64,
    lowest_price: Option<f64>,
    highest_price: Option<f64>,
    data_points: Option<u32>,
    currency: Option<String>,
}

impl NbPrice {
    fn into_item(self, report_currency: &str) -> Result<PriceItem, FetchError> {
        let prices = [
            ("average_price", Some(self.average_price)),
            ("lowest_price", self.lowest_price),
            ("highest_price", self.highest_price),
        ];
        for (field, value) in prices.into_iter().filter_map(|(f, v)| Some((f, v?))) {
            if !value.is_finite() || value < 0.0 {
                return Err(FetchError::Parse(format!(
                    "{field} of '{}' must be a non-negative number, got {value}",
                    self.item_name
                )));
            }
        }

        Ok(PriceItem {
            name: self.item_name,
            category: self
                .category_name
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            average_price: self.average_price,
            min_price: self.lowest_price,
            max_price: self.highest_price,
            currency: self.currency.unwrap_or_else(|| report_currency.to_string()),
            data_points: self.data_points.unwrap_or(0),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
