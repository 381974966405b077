use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{
            AvailabilityUpdated, CarRentalCreated, CreateCarRentalRequest,
            CreateDiscountCodeRequest, SetAvailabilityRequest,
        },
        orders::{OrderDetail, OrderList},
        refunds::{RefundList, RefundListQuery, ReviewRefundRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{DiscountCode, Refund},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{admin_service, order_service, refund_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/car-rentals", post(create_car_rental))
        .route("/car-rentals/{id}/availability", put(set_availability))
        .route("/discount-codes", post(create_discount_code))
        .route("/refunds", get(list_refunds))
        .route("/refunds/{id}", put(review_refund))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
    (status = 200, description = "Get all orders (admin only)", body = ApiResponse<OrderList>),
    (status = 403, description = "Forbidden"),
    (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
    (status = 200, description = "Get any order with items (admin only)", body = ApiResponse<OrderDetail>),
    (status = 404, description = "Not Found"),
    (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/car-rentals",
    request_body = CreateCarRentalRequest,
    responses(
        (status = 201, description = "Car rental created with a one year calendar", body = ApiResponse<CarRentalCreated>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already used"),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_car_rental(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCarRentalRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CarRentalCreated>>)> {
    let resp = admin_service::create_car_rental(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/car-rentals/{id}/availability",
    params(("id" = Uuid, Path, description = "Car rental ID")),
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Days updated", body = ApiResponse<AvailabilityUpdated>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid range or status"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<AvailabilityUpdated>>> {
    let resp = admin_service::set_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/discount-codes",
    request_body = CreateDiscountCodeRequest,
    responses(
        (status = 201, description = "Discount code created", body = ApiResponse<DiscountCode>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Code already exists"),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_discount_code(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDiscountCodeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiscountCode>>)> {
    let resp = admin_service::create_discount_code(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/refunds",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by refund status")
    ),
    responses(
        (status = 200, description = "All refund requests", body = ApiResponse<RefundList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_refunds(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RefundListQuery>,
) -> AppResult<Json<ApiResponse<RefundList>>> {
    let resp = refund_service::list_refunds_admin(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/refunds/{id}",
    params(("id" = Uuid, Path, description = "Refund ID")),
    request_body = ReviewRefundRequest,
    responses(
        (status = 200, description = "Refund reviewed", body = ApiResponse<Refund>),
        (status = 400, description = "Refund already reviewed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn review_refund(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRefundRequest>,
) -> AppResult<Json<ApiResponse<Refund>>> {
    let resp = refund_service::review_refund(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
