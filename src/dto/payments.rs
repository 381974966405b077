use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::enums::{OrderStatus, PaymentKind, TransactionStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOption {
    #[default]
    DownPayment,
    FullPayment,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub order_id: Uuid,
    #[serde(default)]
    pub payment_option: PaymentOption,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentInitiated {
    pub transaction_id: Uuid,
    pub snap_token: String,
    pub redirect_url: Option<String>,
    pub gross_amount: i64,
    pub payment_kind: PaymentKind,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationAck {
    pub transaction_id: Uuid,
    pub transaction_status: TransactionStatus,
    pub order_status: OrderStatus,
    /// False when the notification was a replay and nothing changed.
    pub processed: bool,
}
