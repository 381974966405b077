use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    bookings, car_rental_availabilities, car_rentals, discount_codes,
    enums::{
        AvailabilityStatus, BookingPaymentStatus, BookingStatus, CarRentalStatus, DiscountType,
        OrderStatus, PaymentKind, ProductKind, RefundStatus, TransactionStatus,
    },
    order_items, orders, refunds, transactions, users,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CarRental {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub seats: i32,
    pub price_per_day: i64,
    pub status: CarRentalStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDay {
    pub date: NaiveDate,
    pub status: AvailabilityStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub discount_code_id: Option<Uuid>,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub down_payment_amount: Option<i64>,
    pub status: OrderStatus,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub orderable_kind: ProductKind,
    pub orderable_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub options: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bookable_kind: ProductKind,
    pub bookable_id: Uuid,
    pub status: BookingStatus,
    pub payment_status: BookingPaymentStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub order_id: Uuid,
    pub gross_amount: i64,
    pub status: TransactionStatus,
    pub payment_type: Option<String>,
    pub notes: PaymentKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Refund {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub reason: String,
    pub status: RefundStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscountCode {
    pub id: Uuid,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at.with_timezone(&Utc),
            role: model.role,
        }
    }
}

impl From<car_rentals::Model> for CarRental {
    fn from(model: car_rentals::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            brand: model.brand,
            seats: model.seats,
            price_per_day: model.price_per_day,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<car_rental_availabilities::Model> for AvailabilityDay {
    fn from(model: car_rental_availabilities::Model) -> Self {
        Self {
            date: model.date,
            status: model.status,
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            booking_id: model.booking_id,
            discount_code_id: model.discount_code_id,
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            down_payment_amount: model.down_payment_amount,
            status: model.status,
            payment_deadline: model.payment_deadline.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            orderable_kind: model.orderable_kind,
            orderable_id: model.orderable_id,
            quantity: model.quantity,
            price: model.price,
            name: model.name,
            options: model.options,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<bookings::Model> for Booking {
    fn from(model: bookings::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            bookable_kind: model.bookable_kind,
            bookable_id: model.bookable_id,
            status: model.status,
            payment_status: model.payment_status,
            start_date: model.start_date,
            end_date: model.end_date,
            total_price: model.total_price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<transactions::Model> for Transaction {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            gross_amount: model.gross_amount,
            status: model.status,
            payment_type: model.payment_type,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<refunds::Model> for Refund {
    fn from(model: refunds::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            order_id: model.order_id,
            reason: model.reason,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<discount_codes::Model> for DiscountCode {
    fn from(model: discount_codes::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            discount_type: model.discount_type,
            value: model.value,
            max_uses: model.max_uses,
            uses: model.uses,
            expires_at: model.expires_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
