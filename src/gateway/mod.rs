//! Payment gateway seam.
//!
//! Payment initiation and the webhook reconciler only talk to the gateway
//! through [`PaymentGateway`], so the hosted Snap client can be swapped for a
//! test double.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use uuid::Uuid;

pub mod midtrans;

pub use midtrans::MidtransGateway;

/// Longest item name the gateway accepts.
pub const MAX_ITEM_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub price: i64,
    pub quantity: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub email: String,
}

/// Payment window of a Snap session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expiry {
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Everything needed to open one hosted payment session.
#[derive(Debug, Clone)]
pub struct SnapRequest {
    pub order_id: String,
    pub gross_amount: i64,
    pub items: Vec<ItemDetail>,
    pub customer: Option<CustomerDetails>,
    pub expiry: Expiry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapToken {
    pub token: String,
    pub redirect_url: Option<String>,
}

/// Asynchronous status notification posted by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub order_id: String,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    pub payment_type: Option<String>,
    pub status_code: Option<String>,
    pub gross_amount: Option<String>,
    pub signature_key: Option<String>,
    pub transaction_id: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_snap_token(&self, request: &SnapRequest) -> anyhow::Result<SnapToken>;

    /// Checks that a notification was really produced by the gateway.
    fn verify_notification(&self, notification: &Notification) -> bool;
}

/// `TRX-{transaction_id}-{unix_timestamp}`. The timestamp keeps retries of
/// the same transaction unique on the gateway side.
pub fn gateway_order_id(transaction_id: Uuid, at: DateTime<Utc>) -> String {
    format!("TRX-{}-{}", transaction_id, at.timestamp())
}

/// Inverse of [`gateway_order_id`].
pub fn parse_gateway_order_id(order_id: &str) -> Option<Uuid> {
    let rest = order_id.strip_prefix("TRX-")?;
    let (id, timestamp) = rest.rsplit_once('-')?;
    if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Uuid::parse_str(id).ok()
}

/// `hex(sha512(order_id + status_code + gross_amount + server_key))`
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Truncates on a char boundary.
pub fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_ITEM_NAME_LEN).collect()
}
