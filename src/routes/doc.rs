use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    catalog::ProductSnapshot,
    dto::{
        admin::{
            AvailabilityUpdated, CarRentalCreated, CreateCarRentalRequest,
            CreateDiscountCodeRequest, SetAvailabilityRequest,
        },
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        bookings::{
            ActivityBookingRequest, BookingCreated, CarRentalBookingRequest,
            HolidayPackageBookingRequest, OpenTripBookingRequest, TripPlannerBookingRequest,
        },
        orders::{OrderDetail, OrderLine, OrderList},
        payments::{NotificationAck, PaymentInitiated, PaymentOption, PaymentRequest},
        refunds::{CreateRefundRequest, RefundList, ReviewRefundRequest},
    },
    entity::enums::{
        AvailabilityStatus, BookingPaymentStatus, BookingStatus, DiscountType, OrderStatus,
        PaymentKind, ProductKind, RefundStatus, TransactionStatus,
    },
    models::{AvailabilityDay, Booking, CarRental, DiscountCode, Order, OrderItem, Refund, Transaction, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, bookings, health, orders, params, payments, refunds},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::login,
        auth::register,
        bookings::book_car_rental,
        bookings::car_rental_availability,
        bookings::book_holiday_package,
        bookings::book_open_trip,
        bookings::book_activity,
        bookings::book_trip_planner,
        orders::list_orders,
        orders::get_order,
        payments::create_payment,
        payments::payment_notification,
        refunds::create_refund,
        refunds::list_refunds,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::create_car_rental,
        admin::set_availability,
        admin::create_discount_code,
        admin::list_refunds,
        admin::review_refund
    ),
    components(
        schemas(
            User,
            CarRental,
            AvailabilityDay,
            Order,
            OrderItem,
            Booking,
            Transaction,
            Refund,
            DiscountCode,
            ProductSnapshot,
            ProductKind,
            OrderStatus,
            BookingStatus,
            BookingPaymentStatus,
            TransactionStatus,
            PaymentKind,
            AvailabilityStatus,
            DiscountType,
            RefundStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CarRentalBookingRequest,
            HolidayPackageBookingRequest,
            OpenTripBookingRequest,
            ActivityBookingRequest,
            TripPlannerBookingRequest,
            BookingCreated,
            OrderLine,
            OrderDetail,
            OrderList,
            PaymentOption,
            PaymentRequest,
            PaymentInitiated,
            NotificationAck,
            CreateRefundRequest,
            ReviewRefundRequest,
            RefundList,
            CreateCarRentalRequest,
            CarRentalCreated,
            SetAvailabilityRequest,
            AvailabilityUpdated,
            CreateDiscountCodeRequest,
            params::Pagination,
            params::SortOrder,
            params::OrderListQuery,
            Meta,
            ApiResponse<BookingCreated>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<PaymentInitiated>,
            ApiResponse<NotificationAck>,
            ApiResponse<Refund>,
            ApiResponse<RefundList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Bookings", description = "Product booking and availability endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Payments", description = "Payment session and gateway notification endpoints"),
        (name = "Refunds", description = "Refund request endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
