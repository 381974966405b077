use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::{
    dto::bookings::AvailabilityQuery,
    entity::{
        CarRentals,
        car_rental_availabilities::{
            ActiveModel as AvailActive, Column as AvailCol, Entity as CarRentalAvailabilities,
        },
        enums::AvailabilityStatus,
    },
    error::{AppError, AppResult},
    models::AvailabilityDay,
    response::ApiResponse,
    state::AppState,
};

/// Days of calendar created with every new car.
pub const AVAILABILITY_HORIZON_DAYS: i64 = 365;
const DEFAULT_CALENDAR_DAYS: i64 = 30;
const MAX_CALENDAR_DAYS: i64 = 366;

/// Inserts one `available` row per day for `[from, from + days)`.
pub async fn seed_calendar(
    txn: &DatabaseTransaction,
    car_rental_id: Uuid,
    from: NaiveDate,
    days: i64,
) -> AppResult<u64> {
    let rows: Vec<AvailActive> = (0..days)
        .map(|offset| AvailActive {
            id: Set(Uuid::new_v4()),
            car_rental_id: Set(car_rental_id),
            date: Set(from + Duration::days(offset)),
            status: Set(AvailabilityStatus::Available),
        })
        .collect();
    if rows.is_empty() {
        return Ok(0);
    }
    CarRentalAvailabilities::insert_many(rows).exec(txn).await?;
    Ok(days as u64)
}

/// Resolves the query window, defaulting to the next 30 days.
pub fn calendar_window(
    query: &AvailabilityQuery,
    today: NaiveDate,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let from = query.from.unwrap_or(today);
    let to = match query.to {
        Some(to) => to,
        None => from
            .checked_add_signed(Duration::days(DEFAULT_CALENDAR_DAYS - 1))
            .ok_or_else(|| AppError::Validation("from: date is out of range".into()))?,
    };
    if to < from {
        return Err(AppError::Validation("to: must be on or after from".into()));
    }
    if (to - from).num_days() + 1 > MAX_CALENDAR_DAYS {
        return Err(AppError::Validation(format!(
            "to: range is limited to {MAX_CALENDAR_DAYS} days"
        )));
    }
    Ok((from, to))
}

pub async fn availability_calendar(
    state: &AppState,
    car_rental_id: Uuid,
    query: AvailabilityQuery,
) -> AppResult<ApiResponse<Vec<AvailabilityDay>>> {
    let (from, to) = calendar_window(&query, Utc::now().date_naive())?;

    CarRentals::find_by_id(car_rental_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let days = CarRentalAvailabilities::find()
        .filter(
            Condition::all()
                .add(AvailCol::CarRentalId.eq(car_rental_id))
                .add(AvailCol::Date.between(from, to)),
        )
        .order_by_asc(AvailCol::Date)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ApiResponse::single("Availability", days))
}
