mod common;

use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use std::sync::Arc;
use travel_booking_api::{
    dto::{
        admin::{CreateCarRentalRequest, SetAvailabilityRequest},
        bookings::{AvailabilityQuery, CarRentalBookingRequest},
        orders::OrderDetail,
        payments::{NotificationAck, PaymentInitiated, PaymentOption, PaymentRequest},
        refunds::{CreateRefundRequest, ReviewRefundRequest},
    },
    entity::{
        AuditLogs, Bookings, Orders, Transactions, audit_logs::Column as AuditCol, bookings,
        enums::{
            AvailabilityStatus, BookingPaymentStatus, BookingStatus, OrderStatus, PaymentKind,
            RefundStatus, TransactionStatus,
        },
        orders,
        transactions::Column as TxCol,
    },
    middleware::auth::AuthUser,
    services::{
        admin_service, booking_service, car_rental_service, payment_service, refund_service,
        webhook_service,
    },
    state::AppState,
};
use uuid::Uuid;

use common::{FakeGateway, connect_state, create_user, database_url, notification};

// Each test gets fresh users and its own car, so tests in this file run
// side by side against one database.
struct Fixture {
    state: AppState,
    gateway: Arc<FakeGateway>,
    customer: AuthUser,
    other: AuthUser,
    admin: AuthUser,
    car_id: Uuid,
}

impl Fixture {
    fn day(&self, offset: i64) -> NaiveDate {
        Utc::now().date_naive() + Duration::days(offset)
    }

    async fn book(&self, user: &AuthUser, from: i64, to: i64) -> anyhow::Result<OrderDetail> {
        let booked = booking_service::book_car_rental(
            &self.state,
            user,
            self.car_id,
            car_request(self.day(from), self.day(to), None),
        )
        .await?
        .data
        .expect("booking");
        Ok(booked.order)
    }

    async fn pay(&self, order_id: Uuid, option: PaymentOption) -> anyhow::Result<PaymentInitiated> {
        let resp = payment_service::initiate_payment(
            &self.state,
            &self.customer,
            PaymentRequest {
                order_id,
                payment_option: option,
            },
        )
        .await?;
        Ok(resp.data.expect("payment"))
    }

    async fn notify(
        &self,
        order_id: &str,
        status: &str,
        gross_amount: i64,
    ) -> anyhow::Result<NotificationAck> {
        let resp = webhook_service::handle_notification(
            &self.state,
            notification(order_id, status, gross_amount),
        )
        .await?;
        Ok(resp.data.expect("ack"))
    }

    async fn order(&self, order_id: Uuid) -> anyhow::Result<orders::Model> {
        let order = Orders::find_by_id(order_id)
            .one(&self.state.orm)
            .await?
            .expect("order");
        Ok(order)
    }

    async fn booking_of(&self, order_id: Uuid) -> anyhow::Result<bookings::Model> {
        let order = self.order(order_id).await?;
        let booking = Bookings::find_by_id(order.booking_id.expect("booking id"))
            .one(&self.state.orm)
            .await?
            .expect("booking");
        Ok(booking)
    }

    async fn transaction_statuses(&self, order_id: Uuid) -> anyhow::Result<Vec<TransactionStatus>> {
        let statuses = Transactions::find()
            .filter(TxCol::OrderId.eq(order_id))
            .all(&self.state.orm)
            .await?
            .into_iter()
            .map(|tx| tx.status)
            .collect();
        Ok(statuses)
    }

    async fn assert_days(
        &self,
        from: i64,
        to: i64,
        expected: AvailabilityStatus,
    ) -> anyhow::Result<()> {
        let (from, to) = (self.day(from), self.day(to));
        let days = car_rental_service::availability_calendar(
            &self.state,
            self.car_id,
            AvailabilityQuery {
                from: Some(from),
                to: Some(to),
            },
        )
        .await?
        .data
        .expect("calendar");
        assert_eq!(days.len() as i64, (to - from).num_days() + 1);
        for d in days {
            assert_eq!(d.status, expected, "{}", d.date);
        }
        Ok(())
    }

    async fn request_refund(&self, order_id: Uuid) -> anyhow::Result<Uuid> {
        let refund = refund_service::request_refund(&self.state, &self.customer, refund_request(order_id))
            .await?
            .data
            .expect("refund");
        assert_eq!(refund.status, RefundStatus::Pending);
        Ok(refund.id)
    }
}

async fn fixture() -> anyhow::Result<Option<Fixture>> {
    // Allow skipping when no DB is configured in the environment.
    let Some(database_url) = database_url() else {
        return Ok(None);
    };

    let gateway = Arc::new(FakeGateway::default());
    let state = connect_state(&database_url, gateway.clone()).await?;

    let suffix = Uuid::new_v4().simple().to_string();
    let customer = create_user(&state, "user", &format!("traveler-{suffix}@example.com")).await?;
    let other = create_user(&state, "user", &format!("other-{suffix}@example.com")).await?;
    let admin = create_user(&state, "admin", &format!("admin-{suffix}@example.com")).await?;

    let created = admin_service::create_car_rental(
        &state,
        &admin,
        CreateCarRentalRequest {
            name: format!("Avanza {suffix}"),
            brand: "Toyota".into(),
            seats: 7,
            price_per_day: 300_000,
        },
    )
    .await?
    .data
    .expect("car rental");
    assert_eq!(created.availability_days, 365);

    Ok(Some(Fixture {
        state,
        gateway,
        customer,
        other,
        admin,
        car_id: created.car_rental.id,
    }))
}

#[tokio::test]
async fn booking_reserves_days_and_refuses_overlaps() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };

    // Three days at 300k: 900k total, 450k down payment, two hour deadline.
    let booked = booking_service::book_car_rental(
        &fx.state,
        &fx.customer,
        fx.car_id,
        car_request(fx.day(10), fx.day(12), Some(900_000)),
    )
    .await?
    .data
    .expect("booking");
    let order = booked.order.order.clone();
    assert_eq!(order.total_amount, 900_000);
    assert_eq!(order.down_payment_amount, Some(450_000));
    assert_eq!(order.status, OrderStatus::Pending);
    let deadline = booked.payment_deadline.expect("deadline");
    assert!(deadline > Utc::now() + Duration::minutes(110));
    assert_eq!(booked.order.items.len(), 1);
    assert_eq!(booked.order.items[0].item.quantity, 3);
    assert_eq!(
        booked.order.booking.as_ref().map(|b| b.status),
        Some(BookingStatus::Pending)
    );
    fx.assert_days(10, 12, AvailabilityStatus::Booked).await?;

    let err = booking_service::book_car_rental(
        &fx.state,
        &fx.other,
        fx.car_id,
        car_request(fx.day(12), fx.day(13), None),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    fx.assert_days(13, 13, AvailabilityStatus::Available).await?;

    // Someone else cannot pay this order.
    let err = payment_service::initiate_payment(
        &fx.state,
        &fx.other,
        PaymentRequest {
            order_id: order.id,
            payment_option: PaymentOption::DownPayment,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn down_payment_then_balance_settles_order() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };
    let order = fx.book(&fx.customer, 10, 12).await?.order;
    let deadline = fx
        .order(order.id)
        .await?
        .payment_deadline
        .expect("deadline")
        .with_timezone(&Utc);

    let dp = fx.pay(order.id, PaymentOption::DownPayment).await?;
    assert_eq!(dp.gross_amount, 450_000);
    assert_eq!(dp.payment_kind, PaymentKind::DownPayment);
    assert!(dp.expires_at <= deadline);
    assert_eq!(fx.order(order.id).await?.status, OrderStatus::Processing);
    let dp_session = fx.gateway.last_order_id();

    let ack = fx.notify(&dp_session, "settlement", 450_000).await?;
    assert!(ack.processed);
    assert_eq!(ack.order_status, OrderStatus::PartiallyPaid);
    let booking = fx.booking_of(order.id).await?;
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Partial);

    // Replayed settlement changes nothing.
    let replay = fx.notify(&dp_session, "settlement", 450_000).await?;
    assert!(!replay.processed);
    let stored = fx.order(order.id).await?;
    assert_eq!(stored.paid_amount, 450_000);
    assert_eq!(stored.status, OrderStatus::PartiallyPaid);

    let err = payment_service::initiate_payment(
        &fx.state,
        &fx.customer,
        PaymentRequest {
            order_id: order.id,
            payment_option: PaymentOption::DownPayment,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // A failed balance attempt keeps the down payment and the reserved days.
    let balance = fx.pay(order.id, PaymentOption::FullPayment).await?;
    assert_eq!(balance.gross_amount, 450_000);
    assert_eq!(balance.payment_kind, PaymentKind::BalancePayment);
    assert_eq!(fx.order(order.id).await?.status, OrderStatus::PartiallyPaid);
    let failed = fx.notify(&fx.gateway.last_order_id(), "deny", 450_000).await?;
    assert!(failed.processed);
    assert_eq!(failed.transaction_status, TransactionStatus::Failed);
    assert_eq!(failed.order_status, OrderStatus::PartiallyPaid);
    fx.assert_days(10, 12, AvailabilityStatus::Booked).await?;

    fx.pay(order.id, PaymentOption::FullPayment).await?;
    let paid = fx.notify(&fx.gateway.last_order_id(), "settlement", 450_000).await?;
    assert_eq!(paid.order_status, OrderStatus::Paid);
    assert_eq!(fx.order(order.id).await?.paid_amount, 900_000);
    let booking = fx.booking_of(order.id).await?;
    assert_eq!(booking.payment_status, BookingPaymentStatus::Paid);

    let err = payment_service::initiate_payment(
        &fx.state,
        &fx.customer,
        PaymentRequest {
            order_id: order.id,
            payment_option: PaymentOption::FullPayment,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // Every applied notification left an audit row; the replay did not.
    let audited = AuditLogs::find()
        .filter(AuditCol::Action.eq("payment_notification"))
        .filter(AuditCol::UserId.eq(fx.customer.user_id))
        .count(&fx.state.orm)
        .await?;
    assert_eq!(audited, 3);

    Ok(())
}

#[tokio::test]
async fn expired_payment_frees_the_days() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };
    let lapsed = fx.book(&fx.customer, 20, 21).await?.order;

    fx.pay(lapsed.id, PaymentOption::FullPayment).await?;
    let expired = fx.notify(&fx.gateway.last_order_id(), "expire", 600_000).await?;
    assert_eq!(expired.order_status, OrderStatus::Failed);
    let booking = fx.booking_of(lapsed.id).await?;
    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Unpaid);
    fx.assert_days(20, 21, AvailabilityStatus::Available).await?;

    fx.book(&fx.other, 20, 21).await?;
    fx.assert_days(20, 21, AvailabilityStatus::Booked).await?;

    // A failed order cannot be refunded.
    let err = refund_service::request_refund(&fx.state, &fx.customer, refund_request(lapsed.id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn retried_payment_survives_the_older_session_lapsing() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };
    let retried = fx.book(&fx.customer, 40, 41).await?.order;

    fx.pay(retried.id, PaymentOption::FullPayment).await?;
    let first_session = fx.gateway.last_order_id();
    fx.pay(retried.id, PaymentOption::FullPayment).await?;
    let second_session = fx.gateway.last_order_id();

    let lapsed = fx.notify(&first_session, "expire", 600_000).await?;
    assert_eq!(lapsed.transaction_status, TransactionStatus::Failed);
    assert_eq!(lapsed.order_status, OrderStatus::Processing);
    fx.assert_days(40, 41, AvailabilityStatus::Booked).await?;

    let settled = fx.notify(&second_session, "settlement", 600_000).await?;
    assert_eq!(settled.order_status, OrderStatus::Paid);

    Ok(())
}

#[tokio::test]
async fn late_down_payment_keeps_fully_paid_order() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };
    let order = fx.book(&fx.customer, 50, 51).await?.order;

    // Two sessions open at once: a down payment, then the full amount.
    fx.pay(order.id, PaymentOption::DownPayment).await?;
    let dp_session = fx.gateway.last_order_id();
    let full = fx.pay(order.id, PaymentOption::FullPayment).await?;
    assert_eq!(full.payment_kind, PaymentKind::FullPayment);
    let full_session = fx.gateway.last_order_id();

    let paid = fx.notify(&full_session, "settlement", 600_000).await?;
    assert_eq!(paid.order_status, OrderStatus::Paid);

    let late = fx.notify(&dp_session, "settlement", 300_000).await?;
    assert!(late.processed);
    assert_eq!(late.transaction_status, TransactionStatus::Settlement);
    assert_eq!(late.order_status, OrderStatus::Paid);
    assert_eq!(fx.order(order.id).await?.status, OrderStatus::Paid);
    let booking = fx.booking_of(order.id).await?;
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Paid);

    Ok(())
}

#[tokio::test]
async fn maintenance_days_cannot_be_booked() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };

    let updated = admin_service::set_availability(
        &fx.state,
        &fx.admin,
        fx.car_id,
        SetAvailabilityRequest {
            start_date: fx.day(30),
            end_date: fx.day(31),
            status: AvailabilityStatus::Maintenance,
        },
    )
    .await?
    .data
    .expect("availability");
    assert_eq!(updated.updated_days, 2);

    let err = booking_service::book_car_rental(
        &fx.state,
        &fx.customer,
        fx.car_id,
        car_request(fx.day(31), fx.day(32), None),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    fx.assert_days(32, 32, AvailabilityStatus::Available).await?;

    Ok(())
}

#[tokio::test]
async fn approved_refund_cascades_to_settled_transactions() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };
    let order = fx.book(&fx.customer, 60, 61).await?.order;
    fx.pay(order.id, PaymentOption::DownPayment).await?;
    fx.notify(&fx.gateway.last_order_id(), "settlement", 300_000).await?;
    fx.pay(order.id, PaymentOption::FullPayment).await?;
    fx.notify(&fx.gateway.last_order_id(), "settlement", 300_000).await?;
    assert_eq!(fx.order(order.id).await?.status, OrderStatus::Paid);

    let refund_id = fx.request_refund(order.id).await?;
    let err = refund_service::request_refund(&fx.state, &fx.customer, refund_request(order.id))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let err = refund_service::review_refund(&fx.state, &fx.customer, refund_id, approve())
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let approved = refund_service::review_refund(&fx.state, &fx.admin, refund_id, approve())
        .await?
        .data
        .expect("refund");
    assert_eq!(approved.status, RefundStatus::Approved);
    assert_eq!(fx.order(order.id).await?.status, OrderStatus::Refund);

    let statuses = fx.transaction_statuses(order.id).await?;
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == TransactionStatus::Refund)
            .count(),
        2
    );
    assert!(!statuses.contains(&TransactionStatus::Settlement));

    Ok(())
}

#[tokio::test]
async fn refund_waits_for_an_open_balance_session() -> anyhow::Result<()> {
    let Some(fx) = fixture().await? else {
        return Ok(());
    };
    let order = fx.book(&fx.customer, 70, 71).await?.order;
    fx.pay(order.id, PaymentOption::DownPayment).await?;
    fx.notify(&fx.gateway.last_order_id(), "settlement", 300_000).await?;

    // Balance session left open while the customer asks for a refund.
    fx.pay(order.id, PaymentOption::FullPayment).await?;
    let balance_session = fx.gateway.last_order_id();
    let refund_id = fx.request_refund(order.id).await?;

    let err = refund_service::review_refund(&fx.state, &fx.admin, refund_id, approve())
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(fx.order(order.id).await?.status, OrderStatus::PartiallyPaid);

    // Once the session window has passed the refund goes through and closes it.
    sqlx::query(
        "UPDATE transactions SET created_at = now() - interval '3 hours' WHERE order_id = $1 AND status = 'pending'",
    )
    .bind(order.id)
    .execute(&fx.state.pool)
    .await?;
    refund_service::review_refund(&fx.state, &fx.admin, refund_id, approve()).await?;
    assert_eq!(fx.order(order.id).await?.status, OrderStatus::Refund);
    let statuses = fx.transaction_statuses(order.id).await?;
    assert!(statuses.contains(&TransactionStatus::Refund));
    assert!(statuses.contains(&TransactionStatus::Failed));
    assert!(!statuses.contains(&TransactionStatus::Pending));

    // A settlement arriving afterwards does not revive the order.
    let late = fx.notify(&balance_session, "settlement", 300_000).await?;
    assert!(!late.processed);
    let stored = fx.order(order.id).await?;
    assert_eq!(stored.status, OrderStatus::Refund);
    assert_eq!(stored.paid_amount, 300_000);
    let booking = fx.booking_of(order.id).await?;
    assert_eq!(booking.payment_status, BookingPaymentStatus::Partial);

    Ok(())
}

fn car_request(
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_price: Option<i64>,
) -> CarRentalBookingRequest {
    CarRentalBookingRequest {
        start_date,
        end_date,
        total_price,
        discount_code: None,
    }
}

fn refund_request(order_id: Uuid) -> CreateRefundRequest {
    CreateRefundRequest {
        order_id,
        reason: "Trip cancelled by the family".into(),
    }
}

fn approve() -> ReviewRefundRequest {
    ReviewRefundRequest {
        status: RefundStatus::Approved,
    }
}
