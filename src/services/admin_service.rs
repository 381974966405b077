use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter,
    Set, TransactionTrait,
    sea_query::Expr,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::admin::{
        AvailabilityUpdated, CarRentalCreated, CreateCarRentalRequest, CreateDiscountCodeRequest,
        SetAvailabilityRequest,
    },
    entity::{
        CarRentalAvailabilities, CarRentals, DiscountCodes,
        car_rental_availabilities::Column as AvailCol,
        car_rentals::{ActiveModel as CarRentalActive, Column as CarCol},
        discount_codes::{ActiveModel as DiscountActive, Column as DiscountCol},
        enums::{AvailabilityStatus, CarRentalStatus, DiscountType},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::DiscountCode,
    response::ApiResponse,
    services::car_rental_service::{AVAILABILITY_HORIZON_DAYS, seed_calendar},
    state::AppState,
};

/// Creates a car rental together with a year of `available` day rows.
pub async fn create_car_rental(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCarRentalRequest,
) -> AppResult<ApiResponse<CarRentalCreated>> {
    ensure_admin(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let exists = CarRentals::find()
        .filter(CarCol::Name.eq(payload.name.trim()))
        .one(&txn)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("car rental name is already used".into()));
    }

    let car = CarRentalActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        brand: Set(payload.brand.trim().to_string()),
        seats: Set(payload.seats),
        price_per_day: Set(payload.price_per_day),
        status: Set(CarRentalStatus::Available),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let days = seed_calendar(
        &txn,
        car.id,
        Utc::now().date_naive(),
        AVAILABILITY_HORIZON_DAYS,
    )
    .await?;

    txn.commit().await?;

    tracing::info!(car_rental_id = %car.id, days, "car rental created");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "car_rental_created",
        "car_rentals",
        json!({ "car_rental_id": car.id }),
    )
    .await;

    Ok(ApiResponse::single(
        "Car rental created",
        CarRentalCreated {
            car_rental: car.into(),
            availability_days: days,
        },
    ))
}

/// Marks a range available or under maintenance. Booked days are left as they are.
pub async fn set_availability(
    state: &AppState,
    user: &AuthUser,
    car_rental_id: Uuid,
    payload: SetAvailabilityRequest,
) -> AppResult<ApiResponse<AvailabilityUpdated>> {
    ensure_admin(user)?;
    if payload.status == AvailabilityStatus::Booked {
        return Err(AppError::Validation(
            "status: days are booked only through a booking".into(),
        ));
    }
    if payload.end_date < payload.start_date {
        return Err(AppError::Validation(
            "end_date: must be on or after start_date".into(),
        ));
    }

    CarRentals::find_by_id(car_rental_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let result = CarRentalAvailabilities::update_many()
        .col_expr(AvailCol::Status, Expr::value(payload.status))
        .filter(
            Condition::all()
                .add(AvailCol::CarRentalId.eq(car_rental_id))
                .add(AvailCol::Date.between(payload.start_date, payload.end_date))
                .add(AvailCol::Status.ne(AvailabilityStatus::Booked)),
        )
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "availability_updated",
        "car_rental_availabilities",
        json!({
            "car_rental_id": car_rental_id,
            "start_date": payload.start_date,
            "end_date": payload.end_date,
            "status": payload.status,
        }),
    )
    .await;

    Ok(ApiResponse::single(
        "Availability updated",
        AvailabilityUpdated {
            updated_days: result.rows_affected,
        },
    ))
}

pub async fn create_discount_code(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDiscountCodeRequest,
) -> AppResult<ApiResponse<DiscountCode>> {
    ensure_admin(user)?;
    payload.validate()?;
    if payload.discount_type == DiscountType::Percent && payload.value > 100 {
        return Err(AppError::Validation(
            "value: percent discount cannot exceed 100".into(),
        ));
    }

    let code = payload.code.trim().to_uppercase();
    let exists = DiscountCodes::find()
        .filter(DiscountCol::Code.eq(code.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("discount code already exists".into()));
    }

    let discount = DiscountActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        discount_type: Set(payload.discount_type),
        value: Set(payload.value),
        max_uses: Set(payload.max_uses),
        uses: Set(0),
        expires_at: Set(payload.expires_at.map(Into::into)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "discount_code_created",
        "discount_codes",
        json!({ "discount_code_id": discount.id, "code": discount.code }),
    )
    .await;

    Ok(ApiResponse::single("Discount code created", discount.into()))
}
