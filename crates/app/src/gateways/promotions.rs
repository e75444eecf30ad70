//! Promotion (coupon) service client.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    domain::carts::models::{ItemId, OrderSource, PaymentMode},
    gateways::{GatewayError, http_client},
};

/// Cart contents submitted for coupon evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRequest {
    pub region_id: i64,
    pub customer_id: String,
    pub channel: OrderSource,
    pub products: Vec<PromotionProduct>,
    pub coupon_codes: Vec<String>,
    pub payment_mode: Option<PaymentMode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionProduct {
    pub item_id: ItemId,
    pub quantity: u32,
    pub coupon_codes: Vec<String>,
}

/// Discounts granted by the coupon engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PromotionOutcome {
    pub item_discounts: FxHashMap<ItemId, Decimal>,
    pub total_discount: Option<Decimal>,
    pub benefits: Option<Value>,
}

#[automock]
#[async_trait]
pub trait PromotionGateway: Send + Sync {
    /// Evaluate the cart. A refusal is reported as [`GatewayError::Rejected`].
    async fn evaluate(&self, request: PromotionRequest)
    -> Result<PromotionOutcome, GatewayError>;
}

/// Configuration for the promotion service.
#[derive(Debug, Clone)]
pub struct PromotionsConfig {
    /// Full URL of the coupon check endpoint.
    pub url: String,

    /// Value of the `X-API-USER` header.
    pub api_user: String,

    /// Value of the `X-API-TOKEN` header.
    pub api_token: String,

    pub timeout: Duration,
}

/// HTTP client for the coupon check endpoint.
#[derive(Debug, Clone)]
pub struct HttpPromotionGateway {
    config: PromotionsConfig,
    http: Client,
}

impl HttpPromotionGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client can not be built.
    pub fn new(config: PromotionsConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            http: http_client(config.timeout)?,
            config,
        })
    }
}

#[async_trait]
impl PromotionGateway for HttpPromotionGateway {
    #[tracing::instrument(
        name = "gateways.promotions.evaluate",
        skip(self, request),
        fields(products = request.products.len(), coupons = request.coupon_codes.len()),
        err
    )]
    async fn evaluate(
        &self,
        request: PromotionRequest,
    ) -> Result<PromotionOutcome, GatewayError> {
        let body = CouponCheck::from(&request);

        debug!(request = ?body, "checking coupons");

        let response = self
            .http
            .post(&self.config.url)
            .header("X-API-USER", &self.config.api_user)
            .header("X-API-TOKEN", &self.config.api_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::Malformed(format!(
                "coupon check failed with status {status}: {text}"
            )));
        }

        let parsed: Value = response.json().await?;

        debug!(response = %parsed, "coupon check answered");

        parse_outcome(parsed)
    }
}

#[derive(Debug, Serialize)]
struct CouponCheck<'a> {
    area_id: String,
    customer_id: &'a str,
    channel: &'static str,
    products: Vec<CouponProduct<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coupon_codes: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct CouponProduct<'a> {
    item_id: String,
    quantity: u32,
    coupon_code: &'a [String],
}

impl<'a> From<&'a PromotionRequest> for CouponCheck<'a> {
    fn from(request: &'a PromotionRequest) -> Self {
        Self {
            area_id: request.region_id.to_string(),
            customer_id: &request.customer_id,
            channel: request.channel.as_str(),
            products: request
                .products
                .iter()
                .map(|product| CouponProduct {
                    item_id: product.item_id.to_string(),
                    quantity: product.quantity,
                    coupon_code: &product.coupon_codes,
                })
                .collect(),
            payment_mode: request.payment_mode.map(PaymentMode::as_str),
            coupon_codes: (!request.coupon_codes.is_empty())
                .then_some(request.coupon_codes.as_slice()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponResponse {
    success: bool,
    #[serde(default)]
    total_discount: Option<Decimal>,
    #[serde(default)]
    benefits: Option<Value>,
    #[serde(default)]
    products: Vec<ProductDiscount>,
    #[serde(default)]
    error: Option<CouponFailure>,
}

#[derive(Debug, Deserialize)]
struct ProductDiscount {
    #[serde(rename = "itemid")]
    item_id: String,
    discount: Decimal,
}

#[derive(Debug, Deserialize)]
struct CouponFailure {
    #[serde(default)]
    error: Option<String>,
}

fn parse_outcome(body: Value) -> Result<PromotionOutcome, GatewayError> {
    let response: CouponResponse =
        serde_json::from_value(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    if !response.success {
        return Err(GatewayError::Rejected(
            response
                .error
                .and_then(|failure| failure.error)
                .unwrap_or_else(|| "coupon service returned failure status".to_string()),
        ));
    }

    let item_discounts = response
        .products
        .into_iter()
        .map(|product| {
            product
                .item_id
                .parse::<ItemId>()
                .map(|id| (id, product.discount))
                .map_err(|e| {
                    GatewayError::Malformed(format!("item id {:?}: {e}", product.item_id))
                })
        })
        .collect::<Result<_, _>>()?;

    Ok(PromotionOutcome {
        item_discounts,
        total_discount: response.total_discount,
        benefits: response.benefits,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn request() -> PromotionRequest {
        PromotionRequest {
            region_id: 7,
            customer_id: "user-1".to_string(),
            channel: OrderSource::Android,
            products: vec![PromotionProduct {
                item_id: ItemId(11),
                quantity: 2,
                coupon_codes: vec!["ITEM5".to_string()],
            }],
            coupon_codes: Vec::new(),
            payment_mode: None,
        }
    }

    #[test]
    fn request_matches_the_coupon_service_shape() -> TestResult {
        let body = serde_json::to_value(CouponCheck::from(&request()))?;

        assert_eq!(
            body,
            json!({
                "area_id": "7",
                "customer_id": "user-1",
                "channel": "ANDROID_APP",
                "products": [{ "item_id": "11", "quantity": 2, "coupon_code": ["ITEM5"] }],
            })
        );

        Ok(())
    }

    #[test]
    fn optional_fields_are_sent_when_present() -> TestResult {
        let mut request = request();
        request.payment_mode = Some(PaymentMode::Prepaid);
        request.coupon_codes = vec!["CART10".to_string()];

        let body = serde_json::to_value(CouponCheck::from(&request))?;

        assert_eq!(body["payment_mode"], json!("PREPAID"));
        assert_eq!(body["coupon_codes"], json!(["CART10"]));

        Ok(())
    }

    #[test]
    fn item_discounts_are_keyed_by_item() -> TestResult {
        let outcome = parse_outcome(json!({
            "success": true,
            "totalDiscount": 15,
            "benefits": [{ "type": "cashback" }],
            "products": [
                { "itemid": "11", "discount": 10 },
                { "itemid": "12", "discount": "5" },
            ],
        }))?;

        assert_eq!(outcome.item_discounts.get(&ItemId(11)), Some(&Decimal::from(10)));
        assert_eq!(outcome.item_discounts.get(&ItemId(12)), Some(&Decimal::from(5)));
        assert_eq!(outcome.total_discount, Some(Decimal::from(15)));
        assert!(outcome.benefits.is_some());

        Ok(())
    }

    #[test]
    fn refusals_carry_the_service_message() {
        let result = parse_outcome(json!({
            "success": false,
            "error": { "error": "coupon CART10 has expired" },
        }));

        assert!(
            matches!(&result, Err(GatewayError::Rejected(message)) if message == "coupon CART10 has expired"),
            "expected a rejection, got {result:?}"
        );
    }

    #[test]
    fn unparseable_item_ids_are_malformed() {
        let result = parse_outcome(json!({
            "success": true,
            "products": [{ "itemid": "abc", "discount": 1 }],
        }));

        assert!(matches!(result, Err(GatewayError::Malformed(_))));
    }
}
