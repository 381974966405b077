use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::post,
};

use crate::{
    dto::refunds::{CreateRefundRequest, RefundList, RefundListQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Refund,
    response::ApiResponse,
    services::refund_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_refund).get(list_refunds))
}

#[utoipa::path(
    post,
    path = "/api/refunds",
    request_body = CreateRefundRequest,
    responses(
        (status = 201, description = "Refund requested", body = ApiResponse<Refund>),
        (status = 400, description = "Order has no settled payment"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "A refund is already open for this order"),
    ),
    security(("bearer_auth" = [])),
    tag = "Refunds"
)]
pub async fn create_refund(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRefundRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Refund>>)> {
    let resp = refund_service::request_refund(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/refunds",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by refund status")
    ),
    responses(
        (status = 200, description = "Refund requests of the current user", body = ApiResponse<RefundList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Refunds"
)]
pub async fn list_refunds(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RefundListQuery>,
) -> AppResult<Json<ApiResponse<RefundList>>> {
    let resp = refund_service::list_my_refunds(&state, &user, query).await?;
    Ok(Json(resp))
}
