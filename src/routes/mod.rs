use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payments;
pub mod refunds;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
        .nest("/refunds", refunds::router())
        .nest("/admin", admin::router())
        .merge(bookings::router())
}
