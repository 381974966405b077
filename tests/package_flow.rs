mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use travel_booking_api::{
    dto::bookings::HolidayPackageBookingRequest,
    entity::{DiscountCodes, discount_codes::Column as DiscountCol},
    services::booking_service,
};
use uuid::Uuid;

use common::{FakeGateway, connect_state, create_user, database_url};

// Tier pricing and a percent discount code on a package without a down payment.
#[tokio::test]
async fn holiday_package_with_discount_code() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };

    // Uses its own rows so other runs against the same DB are unaffected.
    let state = connect_state(&database_url, Arc::new(FakeGateway::default())).await?;
    let suffix = Uuid::new_v4().simple().to_string();
    let customer = create_user(&state, "user", &format!("pkg-{suffix}@example.com")).await?;

    let package_id = Uuid::new_v4();
    sqlx::query("INSERT INTO holiday_packages (id, name, duration_days) VALUES ($1, $2, 3)")
        .bind(package_id)
        .bind(format!("Bali 3D2N {suffix}"))
        .execute(&state.pool)
        .await?;
    for (min_pax, max_pax, price) in [(7, Some(10), 300_000_i64), (1, Some(3), 450_000), (4, Some(6), 350_000)] {
        sqlx::query(
            "INSERT INTO pricing_tiers (product_kind, product_id, min_pax, max_pax, price) VALUES ('holiday_package', $1, $2, $3, $4)",
        )
        .bind(package_id)
        .bind(min_pax)
        .bind(max_pax)
        .bind(price)
        .execute(&state.pool)
        .await?;
    }
    let code = format!("PKG{}", &suffix[..8]).to_uppercase();
    sqlx::query(
        "INSERT INTO discount_codes (code, discount_type, value, max_uses) VALUES ($1, 'percent', 10, 1)",
    )
    .bind(&code)
    .execute(&state.pool)
    .await?;

    let booked = booking_service::book_holiday_package(
        &state,
        &customer,
        package_id,
        HolidayPackageBookingRequest {
            pax: 5,
            start_date: Some(Utc::now().date_naive() + Duration::days(14)),
            discount_code: Some(code.to_lowercase()),
        },
    )
    .await?
    .data
    .expect("booking");
    let order = &booked.order.order;
    assert_eq!(order.subtotal, 1_750_000);
    assert_eq!(order.discount_amount, 175_000);
    assert_eq!(order.total_amount, 1_575_000);
    assert_eq!(order.down_payment_amount, None);
    assert!(booked.payment_deadline.is_none());
    assert_eq!(booked.order.items[0].item.price, 350_000);

    let discount = DiscountCodes::find()
        .filter(DiscountCol::Code.eq(code.clone()))
        .one(&state.orm)
        .await?
        .expect("code");
    assert_eq!(discount.uses, 1);

    // The single use is spent.
    let err = booking_service::book_holiday_package(
        &state,
        &customer,
        package_id,
        HolidayPackageBookingRequest {
            pax: 2,
            start_date: None,
            discount_code: Some(code),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let err = booking_service::book_holiday_package(
        &state,
        &customer,
        package_id,
        HolidayPackageBookingRequest {
            pax: 11,
            start_date: None,
            discount_code: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

