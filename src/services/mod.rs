pub mod admin_service;
pub mod auth_service;
pub mod booking_service;
pub mod car_rental_service;
pub mod order_service;
pub mod payment_service;
pub mod pricing;
pub mod refund_service;
pub mod webhook_service;
