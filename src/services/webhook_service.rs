//! Payment webhook reconciler.
//!
//! Gateway notifications are delivered at least once and may race the
//! customer's own polling. Every notification is applied inside one DB
//! transaction with the payment row locked, and a transaction that already
//! reached a terminal state is acknowledged without being touched again.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};
use serde_json::{Value, json};

use crate::{
    audit,
    dto::payments::NotificationAck,
    entity::{
        Bookings, CarRentalAvailabilities, Orders, Transactions,
        bookings::{self, ActiveModel as BookingActive},
        car_rental_availabilities::Column as AvailCol,
        enums::{
            AvailabilityStatus, BookingPaymentStatus, BookingStatus, OrderStatus, PaymentKind,
            ProductKind, TransactionStatus,
        },
        orders::ActiveModel as OrderActive,
        transactions::{ActiveModel as TransactionActive, Column as TxCol},
    },
    error::{AppError, AppResult},
    gateway::{Notification, parse_gateway_order_id},
    response::ApiResponse,
    state::AppState,
};

/// What the gateway's `transaction_status`/`fraud_status` pair means for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    Settled,
    Pending,
    Failed,
    Unknown,
}

pub fn classify(transaction_status: &str, fraud_status: Option<&str>) -> GatewayOutcome {
    match transaction_status {
        "settlement" => GatewayOutcome::Settled,
        "capture" if fraud_status == Some("accept") => GatewayOutcome::Settled,
        "pending" => GatewayOutcome::Pending,
        "deny" | "cancel" | "expire" | "failure" => GatewayOutcome::Failed,
        _ => GatewayOutcome::Unknown,
    }
}

/// State changes one notification applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub transaction: TransactionStatus,
    pub order: Option<OrderStatus>,
    pub booking: Option<(BookingStatus, BookingPaymentStatus)>,
    /// Give the booking's reserved days back to the calendar.
    pub release_inventory: bool,
    /// Add the transaction's amount to the order's `paid_amount`.
    pub credit_payment: bool,
}

/// How far payment of an order has progressed. Settlements only move it up.
fn payment_rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::PartiallyPaid => 1,
        OrderStatus::Paid => 2,
        _ => 0,
    }
}

pub fn plan_transition(outcome: GatewayOutcome, kind: PaymentKind, order: OrderStatus) -> Transition {
    match outcome {
        // A refunded or failed order is closed: the settlement is recorded on
        // the transaction only.
        GatewayOutcome::Settled if matches!(order, OrderStatus::Refund | OrderStatus::Failed) => {
            Transition {
                transaction: TransactionStatus::Settlement,
                order: None,
                booking: None,
                release_inventory: false,
                credit_payment: false,
            }
        }
        GatewayOutcome::Settled => {
            let target = match kind {
                PaymentKind::DownPayment => OrderStatus::PartiallyPaid,
                _ => OrderStatus::Paid,
            };
            let next = (payment_rank(target) > payment_rank(order)).then_some(target);
            let booking_payment = match next.unwrap_or(order) {
                OrderStatus::PartiallyPaid => BookingPaymentStatus::Partial,
                _ => BookingPaymentStatus::Paid,
            };
            Transition {
                transaction: TransactionStatus::Settlement,
                order: next,
                booking: Some((BookingStatus::Confirmed, booking_payment)),
                release_inventory: false,
                credit_payment: true,
            }
        }
        GatewayOutcome::Pending => Transition {
            transaction: TransactionStatus::Pending,
            order: (order == OrderStatus::Pending).then_some(OrderStatus::Processing),
            booking: None,
            release_inventory: false,
            credit_payment: false,
        },
        // Once any money has settled, a later failed charge leaves the order alone.
        GatewayOutcome::Failed if order.has_settled_payment() || order == OrderStatus::Refund => {
            failed_attempt_only()
        }
        // An order that already failed gave its days back; they may be held
        // by someone else by now.
        GatewayOutcome::Failed if order == OrderStatus::Failed => failed_attempt_only(),
        GatewayOutcome::Failed => Transition {
            transaction: TransactionStatus::Failed,
            order: Some(OrderStatus::Failed),
            booking: Some((BookingStatus::Cancelled, BookingPaymentStatus::Unpaid)),
            release_inventory: true,
            credit_payment: false,
        },
        GatewayOutcome::Unknown => Transition {
            transaction: TransactionStatus::Pending,
            order: None,
            booking: None,
            release_inventory: false,
            credit_payment: false,
        },
    }
}

pub async fn handle_notification(
    state: &AppState,
    raw: Value,
) -> AppResult<ApiResponse<NotificationAck>> {
    let notification: Notification = serde_json::from_value(raw.clone())
        .map_err(|err| AppError::BadRequest(format!("malformed notification: {err}")))?;

    if !state.gateway.verify_notification(&notification) {
        tracing::warn!(order_id = %notification.order_id, "notification signature rejected");
        return Err(AppError::Forbidden);
    }

    let transaction_id = parse_gateway_order_id(&notification.order_id).ok_or_else(|| {
        AppError::BadRequest(format!("unrecognized order id {}", notification.order_id))
    })?;

    let now = Utc::now();
    let txn = state.orm.begin().await?;

    let transaction = Transactions::find_by_id(transaction_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let order = Orders::find_by_id(transaction.order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if transaction.status.is_terminal() || transaction.status == TransactionStatus::Refund {
        tracing::info!(
            transaction_id = %transaction.id,
            status = ?transaction.status,
            gateway_status = %notification.transaction_status,
            "duplicate notification ignored"
        );
        return Ok(ApiResponse::single(
            "Notification already processed",
            NotificationAck {
                transaction_id: transaction.id,
                transaction_status: transaction.status,
                order_status: order.status,
                processed: false,
            },
        ));
    }

    let outcome = classify(
        &notification.transaction_status,
        notification.fraud_status.as_deref(),
    );
    let mut transition = plan_transition(outcome, transaction.notes, order.status);

    // A lapsed session must not fail the order while a newer attempt is open.
    if outcome == GatewayOutcome::Failed && transition.order.is_some() {
        let open_attempts = Transactions::find()
            .filter(TxCol::OrderId.eq(order.id))
            .filter(TxCol::Id.ne(transaction.id))
            .filter(TxCol::Status.eq(TransactionStatus::Pending))
            .count(&txn)
            .await?;
        if open_attempts > 0 {
            tracing::info!(
                transaction_id = %transaction.id,
                order_id = %order.id,
                open_attempts,
                "failure superseded by a newer payment attempt"
            );
            transition = failed_attempt_only();
        }
    }

    let gross_amount = transaction.gross_amount;
    let mut tx_active: TransactionActive = transaction.into();
    tx_active.status = Set(transition.transaction);
    if notification.payment_type.is_some() {
        tx_active.payment_type = Set(notification.payment_type.clone());
    }
    tx_active.payment_payloads = Set(Some(raw));
    tx_active.updated_at = Set(now.into());
    let transaction = tx_active.update(&txn).await?;

    let booking_id = order.booking_id;
    let mut order_status = order.status;
    if outcome == GatewayOutcome::Settled && !transition.credit_payment {
        tracing::warn!(
            transaction_id = %transaction.id,
            order_id = %order.id,
            order_status = ?order.status,
            gross_amount,
            "settlement on a closed order recorded without changing it"
        );
    }

    if transition.order.is_some() || transition.credit_payment {
        let paid_amount = order.paid_amount;
        let mut order_active: OrderActive = order.into();
        if let Some(next) = transition.order {
            order_active.status = Set(next);
            order_status = next;
        }
        if transition.credit_payment {
            order_active.paid_amount = Set(paid_amount + gross_amount);
        }
        order_active.updated_at = Set(now.into());
        order_active.update(&txn).await?;
    }

    if let Some(booking_id) = booking_id {
        let booking = Bookings::find_by_id(booking_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        if let Some(booking) = booking {
            if transition.release_inventory {
                release_inventory(&txn, &booking).await?;
            }
            if let Some((status, payment_status)) = transition.booking {
                let mut booking_active: BookingActive = booking.into();
                booking_active.status = Set(status);
                booking_active.payment_status = Set(payment_status);
                booking_active.updated_at = Set(now.into());
                booking_active.update(&txn).await?;
            }
        }
    }

    txn.commit().await?;

    tracing::info!(
        transaction_id = %transaction.id,
        order_id = %transaction.order_id,
        gateway_status = %notification.transaction_status,
        transaction_status = ?transaction.status,
        order_status = ?order_status,
        "notification applied"
    );
    audit::record(
        &state.pool,
        Some(transaction.user_id),
        "payment_notification",
        "transactions",
        json!({
            "transaction_id": transaction.id,
            "order_id": transaction.order_id,
            "gateway_status": notification.transaction_status,
        }),
    )
    .await;

    Ok(ApiResponse::single(
        "Notification processed",
        NotificationAck {
            transaction_id: transaction.id,
            transaction_status: transaction.status,
            order_status,
            processed: true,
        },
    ))
}

/// Marks only the transaction failed; order and booking stay as they are.
fn failed_attempt_only() -> Transition {
    Transition {
        transaction: TransactionStatus::Failed,
        order: None,
        booking: None,
        release_inventory: false,
        credit_payment: false,
    }
}

/// Reverts the booking's day rows to available. Only rows still `booked` are
/// touched.
async fn release_inventory(txn: &DatabaseTransaction, booking: &bookings::Model) -> AppResult<u64> {
    let (ProductKind::CarRental, Some(start), Some(end)) =
        (booking.bookable_kind, booking.start_date, booking.end_date)
    else {
        return Ok(0);
    };

    let released = CarRentalAvailabilities::update_many()
        .col_expr(AvailCol::Status, Expr::value(AvailabilityStatus::Available))
        .filter(
            Condition::all()
                .add(AvailCol::CarRentalId.eq(booking.bookable_id))
                .add(AvailCol::Date.between(start, end))
                .add(AvailCol::Status.eq(AvailabilityStatus::Booked)),
        )
        .exec(txn)
        .await?;

    tracing::info!(
        booking_id = %booking.id,
        car_rental_id = %booking.bookable_id,
        released = released.rows_affected,
        "reserved days released"
    );
    Ok(released.rows_affected)
}
