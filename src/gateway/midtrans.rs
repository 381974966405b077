//! Midtrans Snap client.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::{
    CustomerDetails, ItemDetail, Notification, PaymentGateway, SnapRequest, SnapToken,
    notification_signature, truncate_name,
};
use crate::config::MidtransConfig;

const SANDBOX_BASE_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_BASE_URL: &str = "https://app.midtrans.com";

#[derive(Clone)]
pub struct MidtransGateway {
    client: Client,
    config: MidtransConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct TransactionDetails<'a> {
    order_id: &'a str,
    gross_amount: i64,
}

#[derive(Debug, Serialize)]
struct ExpiryBody {
    start_time: String,
    unit: &'static str,
    duration: i64,
}

#[derive(Debug, Serialize)]
struct CreditCard {
    secure: bool,
}

#[derive(Debug, Serialize)]
struct SnapBody<'a> {
    transaction_details: TransactionDetails<'a>,
    item_details: Vec<ItemDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_details: Option<&'a CustomerDetails>,
    expiry: ExpiryBody,
    credit_card: CreditCard,
}

#[derive(Debug, Deserialize)]
struct SnapError {
    #[serde(default)]
    error_messages: Vec<String>,
}

impl MidtransGateway {
    pub fn new(config: MidtransConfig) -> Self {
        let base_url = if config.is_production {
            PRODUCTION_BASE_URL
        } else {
            SANDBOX_BASE_URL
        };
        Self::with_base_url(config, base_url)
    }

    /// Points the client at another host, e.g. a local mock.
    pub fn with_base_url(config: MidtransConfig, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url: base_url.into(),
        }
    }

    fn sanitize(&self, items: &[ItemDetail]) -> Vec<ItemDetail> {
        if !self.config.is_sanitized {
            return items.to_vec();
        }
        items
            .iter()
            .map(|item| ItemDetail {
                id: truncate_name(&item.id),
                price: item.price,
                quantity: item.quantity.max(1),
                name: truncate_name(&item.name),
            })
            .collect()
    }
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    async fn create_snap_token(&self, request: &SnapRequest) -> Result<SnapToken> {
        if request.items.is_empty() {
            return Err(anyhow!("cannot charge empty item list"));
        }

        let body = SnapBody {
            transaction_details: TransactionDetails {
                order_id: &request.order_id,
                gross_amount: request.gross_amount,
            },
            item_details: self.sanitize(&request.items),
            customer_details: request.customer.as_ref(),
            expiry: ExpiryBody {
                start_time: request
                    .expiry
                    .start_time
                    .format("%Y-%m-%d %H:%M:%S %z")
                    .to_string(),
                unit: "minute",
                duration: request.expiry.duration_minutes,
            },
            credit_card: CreditCard {
                secure: self.config.is_3ds,
            },
        };

        let url = format!("{}/snap/v1/transactions", self.base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(self.config.server_key.expose_secret(), Some(""))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(status = %status, order_id = %request.order_id, "snap response");

        if status.is_success() {
            let token: SnapToken = serde_json::from_str(&text)?;
            tracing::info!(order_id = %request.order_id, "snap token issued");
            Ok(token)
        } else {
            let messages = serde_json::from_str::<SnapError>(&text)
                .map(|e| e.error_messages.join("; "))
                .unwrap_or_else(|_| text.clone());
            Err(anyhow!("snap request failed ({status}): {messages}"))
        }
    }

    fn verify_notification(&self, notification: &Notification) -> bool {
        let (Some(status_code), Some(gross_amount), Some(signature)) = (
            notification.status_code.as_deref(),
            notification.gross_amount.as_deref(),
            notification.signature_key.as_deref(),
        ) else {
            return false;
        };
        let expected = notification_signature(
            &notification.order_id,
            status_code,
            gross_amount,
            self.config.server_key.expose_secret(),
        );
        expected.eq_ignore_ascii_case(signature)
    }
}
