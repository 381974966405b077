use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entity::enums::{AvailabilityStatus, DiscountType},
    models::CarRental,
};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCarRentalRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub brand: String,
    #[validate(range(min = 1, max = 60))]
    pub seats: i32,
    #[validate(range(min = 1))]
    pub price_per_day: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CarRentalCreated {
    pub car_rental: CarRental,
    pub availability_days: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `available` or `maintenance`. Booked days are never touched.
    pub status: AvailabilityStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityUpdated {
    pub updated_days: u64,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateDiscountCodeRequest {
    #[validate(length(min = 3, max = 64))]
    pub code: String,
    pub discount_type: DiscountType,
    #[validate(range(min = 1))]
    pub value: i64,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}
