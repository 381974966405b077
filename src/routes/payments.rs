use axum::{Json, Router, extract::State, routing::post};
use serde_json::Value;

use crate::{
    dto::payments::{NotificationAck, PaymentInitiated, PaymentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{payment_service, webhook_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_payment))
        .route("/notification", post(payment_notification))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment session opened", body = ApiResponse<PaymentInitiated>),
        (status = 400, description = "Order cannot be charged or payment window closed"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Gateway error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentInitiated>>> {
    let resp = payment_service::initiate_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

/// Midtrans HTTP notification. Signed with the server key, no bearer token.
#[utoipa::path(
    post,
    path = "/api/payments/notification",
    request_body = Value,
    responses(
        (status = 200, description = "Notification applied or already processed", body = ApiResponse<NotificationAck>),
        (status = 400, description = "Malformed notification"),
        (status = 403, description = "Invalid signature"),
        (status = 404, description = "Unknown transaction"),
    ),
    tag = "Payments"
)]
pub async fn payment_notification(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<Json<ApiResponse<NotificationAck>>> {
    let resp = webhook_service::handle_notification(&state, payload).await?;
    Ok(Json(resp))
}
