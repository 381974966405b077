//! Booking intake: validates a purchase request, prices it server-side and
//! creates Order + OrderItem + Booking in one database transaction. Car
//! rentals also reserve their day rows in that same transaction.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    catalog::Orderable,
    dto::bookings::{
        ActivityBookingRequest, BookingCreated, CarRentalBookingRequest,
        HolidayPackageBookingRequest, OpenTripBookingRequest, TripPlannerBookingRequest,
    },
    entity::{
        Activities, CarRentalAvailabilities, CarRentals, DiscountCodes, HolidayPackages,
        OpenTrips,
        bookings::ActiveModel as BookingActive,
        car_rental_availabilities::Column as AvailCol,
        discount_codes::Column as DiscountCol,
        enums::{
            AvailabilityStatus, BookingPaymentStatus, BookingStatus, CarRentalStatus,
            OrderStatus, ProductKind,
        },
        order_items::ActiveModel as OrderItemActive,
        orders::{ActiveModel as OrderActive, Model as OrderModel},
        trip_planners::ActiveModel as TripPlannerActive,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{
        order_service::load_order_detail,
        pricing::{down_payment_for, load_tiers, price_per_pax},
    },
    state::AppState,
};

/// How long a reserved car stays held while waiting for payment.
pub const PAYMENT_WINDOW_HOURS: i64 = 2;

/// Everything needed to write one order line and its booking.
struct Intake {
    kind: ProductKind,
    product_id: Uuid,
    name: String,
    quantity: i32,
    unit_price: i64,
    options: Value,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    /// Date-inventoried products take a down payment and expire unpaid.
    holds_inventory: bool,
}

/// Number of calendar days in `[start, end]`, rejecting past or inverted ranges.
pub fn requested_days(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> AppResult<i64> {
    if start < today {
        return Err(AppError::Validation(
            "start_date: must be today or later".into(),
        ));
    }
    if end < start {
        return Err(AppError::Validation(
            "end_date: must be on or after start_date".into(),
        ));
    }
    Ok((end - start).num_days() + 1)
}

fn ensure_not_past(date: Option<NaiveDate>, field: &str, today: NaiveDate) -> AppResult<()> {
    match date {
        Some(d) if d < today => Err(AppError::Validation(format!(
            "{field}: must be today or later"
        ))),
        _ => Ok(()),
    }
}

pub async fn book_car_rental(
    state: &AppState,
    user: &AuthUser,
    car_rental_id: Uuid,
    payload: CarRentalBookingRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    payload.validate()?;
    let today = Utc::now().date_naive();
    let days = requested_days(payload.start_date, payload.end_date, today)?;

    let txn = state.orm.begin().await?;

    let car = CarRentals::find_by_id(car_rental_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if car.status != CarRentalStatus::Available {
        return Err(AppError::Validation("car rental is not available".into()));
    }

    let in_range = || {
        sea_orm::Condition::all()
            .add(AvailCol::CarRentalId.eq(car.id))
            .add(AvailCol::Date.between(payload.start_date, payload.end_date))
            .add(AvailCol::Status.eq(AvailabilityStatus::Available))
    };

    // Lock the day rows first so overlapping intakes queue behind each other.
    let available = CarRentalAvailabilities::find()
        .filter(in_range())
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    if available.len() as i64 != days {
        return Err(AppError::Validation("dates not available".into()));
    }

    let reserved = CarRentalAvailabilities::update_many()
        .col_expr(AvailCol::Status, Expr::value(AvailabilityStatus::Booked))
        .filter(in_range())
        .exec(&txn)
        .await?;
    if reserved.rows_affected as i64 != days {
        return Err(AppError::Validation("dates not available".into()));
    }

    let subtotal = car.price_per_day * days;
    if let Some(client_total) = payload.total_price.filter(|t| *t != subtotal) {
        tracing::warn!(
            car_rental_id = %car.id,
            client_total,
            subtotal,
            "client total_price differs from server price"
        );
    }

    let snapshot = car.snapshot();
    let intake = Intake {
        kind: ProductKind::CarRental,
        product_id: car.id,
        name: snapshot.name,
        quantity: days as i32,
        unit_price: car.price_per_day,
        options: json!({
            "start_date": payload.start_date,
            "end_date": payload.end_date,
            "days": days,
            "price_per_day": car.price_per_day,
        }),
        start_date: Some(payload.start_date),
        end_date: Some(payload.end_date),
        holds_inventory: true,
    };

    let order = materialize(&txn, user, intake, payload.discount_code.as_deref()).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        car_rental_id = %car_rental_id,
        days,
        "car rental booked"
    );
    finish(state, user, order).await
}

pub async fn book_holiday_package(
    state: &AppState,
    user: &AuthUser,
    package_id: Uuid,
    payload: HolidayPackageBookingRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    payload.validate()?;
    ensure_not_past(payload.start_date, "start_date", Utc::now().date_naive())?;

    let txn = state.orm.begin().await?;

    let package = HolidayPackages::find_by_id(package_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !package.is_active {
        return Err(AppError::Validation("holiday package is not available".into()));
    }

    let tiers = load_tiers(&txn, ProductKind::HolidayPackage, package.id).await?;
    let per_pax = price_per_pax(&tiers, payload.pax).ok_or_else(|| {
        AppError::Validation(format!("pax: no price tier covers {} pax", payload.pax))
    })?;

    let end_date = payload
        .start_date
        .map(|start| {
            start
                .checked_add_signed(Duration::days(i64::from(package.duration_days.max(1)) - 1))
                .ok_or_else(|| AppError::Validation("start_date: date is out of range".into()))
        })
        .transpose()?;

    let intake = Intake {
        kind: ProductKind::HolidayPackage,
        product_id: package.id,
        name: package.snapshot().name,
        quantity: payload.pax,
        unit_price: per_pax,
        options: json!({
            "pax": payload.pax,
            "price_per_pax": per_pax,
            "start_date": payload.start_date,
        }),
        start_date: payload.start_date,
        end_date,
        holds_inventory: false,
    };

    let order = materialize(&txn, user, intake, payload.discount_code.as_deref()).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, package_id = %package_id, "holiday package booked");
    finish(state, user, order).await
}

pub async fn book_open_trip(
    state: &AppState,
    user: &AuthUser,
    trip_id: Uuid,
    payload: OpenTripBookingRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let trip = OpenTrips::find_by_id(trip_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !trip.is_active {
        return Err(AppError::Validation("open trip is not available".into()));
    }
    if trip
        .departure_date
        .is_some_and(|d| d < Utc::now().date_naive())
    {
        return Err(AppError::Validation("open trip has already departed".into()));
    }

    let tiers = load_tiers(&txn, ProductKind::OpenTrip, trip.id).await?;
    let per_pax = price_per_pax(&tiers, payload.pax).ok_or_else(|| {
        AppError::Validation(format!("pax: no price tier covers {} pax", payload.pax))
    })?;

    let intake = Intake {
        kind: ProductKind::OpenTrip,
        product_id: trip.id,
        name: trip.snapshot().name,
        quantity: payload.pax,
        unit_price: per_pax,
        options: json!({
            "pax": payload.pax,
            "price_per_pax": per_pax,
            "departure_date": trip.departure_date,
        }),
        start_date: trip.departure_date,
        end_date: trip.departure_date,
        holds_inventory: false,
    };

    let order = materialize(&txn, user, intake, payload.discount_code.as_deref()).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, open_trip_id = %trip_id, "open trip booked");
    finish(state, user, order).await
}

pub async fn book_activity(
    state: &AppState,
    user: &AuthUser,
    activity_id: Uuid,
    payload: ActivityBookingRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    payload.validate()?;
    ensure_not_past(payload.date, "date", Utc::now().date_naive())?;

    let txn = state.orm.begin().await?;

    let activity = Activities::find_by_id(activity_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !activity.is_active {
        return Err(AppError::Validation("activity is not available".into()));
    }

    let intake = Intake {
        kind: ProductKind::Activity,
        product_id: activity.id,
        name: activity.snapshot().name,
        quantity: payload.pax,
        unit_price: activity.price,
        options: json!({ "pax": payload.pax, "date": payload.date }),
        start_date: payload.date,
        end_date: payload.date,
        holds_inventory: false,
    };

    let order = materialize(&txn, user, intake, payload.discount_code.as_deref()).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, activity_id = %activity_id, "activity booked");
    finish(state, user, order).await
}

pub async fn book_trip_planner(
    state: &AppState,
    user: &AuthUser,
    payload: TripPlannerBookingRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    payload.validate()?;
    requested_days(payload.start_date, payload.end_date, Utc::now().date_naive())?;

    let txn = state.orm.begin().await?;

    let planner = TripPlannerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        destination: Set(payload.destination.trim().to_string()),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        pax: Set(payload.pax),
        notes: Set(payload.notes.clone()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let intake = Intake {
        kind: ProductKind::TripPlanner,
        product_id: planner.id,
        name: planner.snapshot().name,
        quantity: 1,
        unit_price: state.config.booking.trip_planner_price,
        options: json!({
            "destination": planner.destination,
            "pax": planner.pax,
            "start_date": planner.start_date,
            "end_date": planner.end_date,
        }),
        start_date: Some(planner.start_date),
        end_date: Some(planner.end_date),
        holds_inventory: false,
    };

    let order = materialize(&txn, user, intake, payload.discount_code.as_deref()).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, trip_planner_id = %planner.id, "trip plan booked");
    finish(state, user, order).await
}

async fn materialize(
    txn: &DatabaseTransaction,
    user: &AuthUser,
    intake: Intake,
    discount_code: Option<&str>,
) -> AppResult<OrderModel> {
    let now = Utc::now();
    let subtotal = intake.unit_price * i64::from(intake.quantity);
    let (discount_code_id, discount_amount) = redeem_discount(txn, discount_code, subtotal, now).await?;
    let total_amount = subtotal - discount_amount;

    let down_payment_amount = intake
        .holds_inventory
        .then(|| down_payment_for(total_amount));
    let payment_deadline: Option<DateTime<Utc>> = intake
        .holds_inventory
        .then(|| now + Duration::hours(PAYMENT_WINDOW_HOURS));

    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        bookable_kind: Set(intake.kind),
        bookable_id: Set(intake.product_id),
        status: Set(BookingStatus::Pending),
        payment_status: Set(BookingPaymentStatus::Unpaid),
        start_date: Set(intake.start_date),
        end_date: Set(intake.end_date),
        total_price: Set(total_amount),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(txn)
    .await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        booking_id: Set(Some(booking.id)),
        discount_code_id: Set(discount_code_id),
        subtotal: Set(subtotal),
        discount_amount: Set(discount_amount),
        total_amount: Set(total_amount),
        paid_amount: Set(0),
        down_payment_amount: Set(down_payment_amount),
        status: Set(OrderStatus::Pending),
        payment_deadline: Set(payment_deadline.map(Into::into)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(txn)
    .await?;

    OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        orderable_kind: Set(intake.kind),
        orderable_id: Set(intake.product_id),
        quantity: Set(intake.quantity),
        price: Set(intake.unit_price),
        name: Set(Some(intake.name)),
        options: Set(Some(intake.options)),
        created_at: NotSet,
    }
    .insert(txn)
    .await?;

    Ok(order)
}

/// Locks and redeems a discount code, returning its id and the amount off.
async fn redeem_discount(
    txn: &DatabaseTransaction,
    code: Option<&str>,
    subtotal: i64,
    now: DateTime<Utc>,
) -> AppResult<(Option<Uuid>, i64)> {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok((None, 0));
    };

    let discount = DiscountCodes::find()
        .filter(DiscountCol::Code.eq(code.to_uppercase()))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::Validation("discount_code: not found".into()))?;
    if !discount.is_valid(now) {
        return Err(AppError::Validation(
            "discount_code: expired or fully used".into(),
        ));
    }

    DiscountCodes::update_many()
        .col_expr(DiscountCol::Uses, Expr::col(DiscountCol::Uses).add(1))
        .filter(DiscountCol::Id.eq(discount.id))
        .exec(txn)
        .await?;

    Ok((Some(discount.id), discount.calculate_discount(subtotal)))
}

async fn finish(
    state: &AppState,
    user: &AuthUser,
    order: OrderModel,
) -> AppResult<ApiResponse<BookingCreated>> {
    audit::record(
        &state.pool,
        Some(user.user_id),
        "booking_created",
        "orders",
        json!({ "order_id": order.id, "total_amount": order.total_amount }),
    )
    .await;

    let payment_deadline = order.payment_deadline.map(|dt| dt.with_timezone(&Utc));
    let detail = load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::single(
        "Booking created",
        BookingCreated {
            order: detail,
            payment_deadline,
        },
    ))
}
