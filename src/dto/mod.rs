pub mod admin;
pub mod auth;
pub mod bookings;
pub mod orders;
pub mod payments;
pub mod refunds;
