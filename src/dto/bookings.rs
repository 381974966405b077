use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::orders::OrderDetail;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CarRentalBookingRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Price shown to the customer. The charged price is recomputed server-side.
    #[validate(range(min = 1))]
    pub total_price: Option<i64>,
    #[validate(length(min = 1, max = 64))]
    pub discount_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct HolidayPackageBookingRequest {
    #[validate(range(min = 1, max = 100))]
    pub pax: i32,
    pub start_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 64))]
    pub discount_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OpenTripBookingRequest {
    #[validate(range(min = 1, max = 100))]
    pub pax: i32,
    #[validate(length(min = 1, max = 64))]
    pub discount_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ActivityBookingRequest {
    #[validate(range(min = 1, max = 100))]
    pub pax: i32,
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 64))]
    pub discount_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TripPlannerBookingRequest {
    #[validate(length(min = 1, max = 255))]
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 1, max = 100))]
    pub pax: i32,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub discount_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreated {
    pub order: OrderDetail,
    /// Payment must succeed before this instant, when set.
    pub payment_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
