//! Pricing service client.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    domain::carts::models::{ItemId, OrderType},
    gateways::{GatewayError, http_client},
};

/// Fields requested from the catalogue when none are configured.
pub const DEFAULT_SELECT_FIELDS: [&str; 7] = [
    "id",
    "basePrice",
    "offerPrice",
    "maxQuantity",
    "deliveryDays",
    "title",
    "transferPrice",
];

/// Batch price lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub item_ids: Vec<ItemId>,
    pub order_type: OrderType,
}

/// Authoritative price and availability of one item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub id: ItemId,
    pub base_price: Decimal,
    pub offer_price: Decimal,
    #[serde(default)]
    pub max_quantity: Option<u32>,
    #[serde(default)]
    pub delivery_days: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub transfer_price: Option<Decimal>,
}

#[automock]
#[async_trait]
pub trait PricingGateway: Send + Sync {
    /// Fetch quotes for every requested item. Items unknown to the catalogue are absent.
    async fn quote(&self, request: PriceRequest) -> Result<Vec<PriceQuote>, GatewayError>;
}

/// Configuration for the pricing service.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Full URL of the calculate-price endpoint.
    pub url: String,

    /// Fields selected from the catalogue.
    pub select_fields: Vec<String>,

    pub timeout: Duration,
}

/// HTTP client for the calculate-price endpoint.
#[derive(Debug, Clone)]
pub struct HttpPricingGateway {
    config: PricingConfig,
    http: Client,
}

impl HttpPricingGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client can not be built.
    pub fn new(config: PricingConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            http: http_client(config.timeout)?,
            config,
        })
    }
}

#[async_trait]
impl PricingGateway for HttpPricingGateway {
    #[tracing::instrument(
        name = "gateways.pricing.quote",
        skip(self, request),
        fields(items = request.item_ids.len(), order_type = %request.order_type),
        err
    )]
    async fn quote(&self, request: PriceRequest) -> Result<Vec<PriceQuote>, GatewayError> {
        let body = PriceQuery::new(&request, &self.config.select_fields);

        debug!(request = ?body, "requesting prices");

        let response = self.http.post(&self.config.url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::Malformed(format!(
                "price request failed with status {status}: {text}"
            )));
        }

        let parsed: Value = response.json().await?;

        debug!(response = %parsed, "received prices");

        parse_quotes(parsed)
    }
}

#[derive(Debug, Serialize)]
struct PriceQuery<'a> {
    query: QueryClause<'a>,
    count: usize,
    offset: usize,
}

#[derive(Debug, Serialize)]
struct QueryClause<'a> {
    #[serde(rename = "type")]
    order_type: [&'static str; 1],
    filters: IdFilter<'a>,
    select: &'a [String],
}

#[derive(Debug, Serialize)]
struct IdFilter<'a> {
    id: &'a [ItemId],
}

impl<'a> PriceQuery<'a> {
    fn new(request: &'a PriceRequest, select: &'a [String]) -> Self {
        Self {
            query: QueryClause {
                order_type: [request.order_type.as_str()],
                filters: IdFilter {
                    id: &request.item_ids,
                },
                select,
            },
            count: request.item_ids.len(),
            offset: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    results: Vec<ResultGroup>,
}

#[derive(Debug, Deserialize)]
struct ResultGroup {
    #[serde(default)]
    items: Vec<QuoteGroup>,
}

#[derive(Debug, Deserialize)]
struct QuoteGroup {
    #[serde(default)]
    items: Vec<PriceQuote>,
}

/// Interpret a calculate-price body. A declared status other than 200 is a rejection.
fn parse_quotes(body: Value) -> Result<Vec<PriceQuote>, GatewayError> {
    let response: PriceResponse =
        serde_json::from_value(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    if let Some(status) = response.status
        && status != 200
    {
        return Err(GatewayError::Rejected(response.msg.unwrap_or_else(|| {
            format!("pricing service returned status {status}")
        })));
    }

    Ok(response
        .results
        .into_iter()
        .next()
        .and_then(|group| group.items.into_iter().next())
        .map(|group| group.items)
        .unwrap_or_default())
}
