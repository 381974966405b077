use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::bookings::{
        ActivityBookingRequest, AvailabilityQuery, BookingCreated, CarRentalBookingRequest,
        HolidayPackageBookingRequest, OpenTripBookingRequest, TripPlannerBookingRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::AvailabilityDay,
    response::ApiResponse,
    services::{booking_service, car_rental_service},
    state::AppState,
};

type Created = AppResult<(StatusCode, Json<ApiResponse<BookingCreated>>)>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/car-rentals/{id}/book", post(book_car_rental))
        .route("/car-rentals/{id}/availability", get(car_rental_availability))
        .route("/holiday-packages/{id}/book", post(book_holiday_package))
        .route("/open-trips/{id}/book", post(book_open_trip))
        .route("/activities/{id}/book", post(book_activity))
        .route("/trip-planner-bookings", post(book_trip_planner))
}

#[utoipa::path(
    post,
    path = "/api/car-rentals/{id}/book",
    params(("id" = Uuid, Path, description = "Car rental ID")),
    request_body = CarRentalBookingRequest,
    responses(
        (status = 201, description = "Order created and dates reserved", body = ApiResponse<BookingCreated>),
        (status = 404, description = "Car rental not found"),
        (status = 422, description = "Invalid dates or dates not available"),
        (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn book_car_rental(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CarRentalBookingRequest>,
) -> Created {
    let resp = booking_service::book_car_rental(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/car-rentals/{id}/availability",
    params(
        ("id" = Uuid, Path, description = "Car rental ID"),
        ("from" = Option<String>, Query, description = "First day (YYYY-MM-DD), default today"),
        ("to" = Option<String>, Query, description = "Last day (YYYY-MM-DD), default from + 29 days"),
    ),
    responses(
        (status = 200, description = "Day-by-day availability", body = ApiResponse<Vec<AvailabilityDay>>),
        (status = 404, description = "Car rental not found"),
        (status = 422, description = "Invalid range"),
    ),
    tag = "Bookings"
)]
pub async fn car_rental_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<ApiResponse<Vec<AvailabilityDay>>>> {
    let resp = car_rental_service::availability_calendar(&state, id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/holiday-packages/{id}/book",
    params(("id" = Uuid, Path, description = "Holiday package ID")),
    request_body = HolidayPackageBookingRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<BookingCreated>),
        (status = 404, description = "Holiday package not found"),
        (status = 422, description = "No price for the pax count"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn book_holiday_package(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<HolidayPackageBookingRequest>,
) -> Created {
    let resp = booking_service::book_holiday_package(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/open-trips/{id}/book",
    params(("id" = Uuid, Path, description = "Open trip ID")),
    request_body = OpenTripBookingRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<BookingCreated>),
        (status = 404, description = "Open trip not found"),
        (status = 422, description = "No price for the pax count or trip departed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn book_open_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OpenTripBookingRequest>,
) -> Created {
    let resp = booking_service::book_open_trip(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/book",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = ActivityBookingRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<BookingCreated>),
        (status = 404, description = "Activity not found"),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn book_activity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActivityBookingRequest>,
) -> Created {
    let resp = booking_service::book_activity(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/trip-planner-bookings",
    request_body = TripPlannerBookingRequest,
    responses(
        (status = 201, description = "Trip plan ordered", body = ApiResponse<BookingCreated>),
        (status = 422, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn book_trip_planner(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TripPlannerBookingRequest>,
) -> Created {
    let resp = booking_service::book_trip_planner(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
