//! Payment initiation: resolves what this attempt charges, records a pending
//! transaction and opens a gateway session, all inside one DB transaction.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::payments::{PaymentInitiated, PaymentOption, PaymentRequest},
    entity::{
        Users,
        enums::{OrderStatus, PaymentKind, TransactionStatus},
        order_items::{self, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, ActiveModel as OrderActive, Entity as Orders},
        transactions::ActiveModel as TransactionActive,
    },
    error::{AppError, AppResult},
    gateway::{CustomerDetails, Expiry, ItemDetail, SnapRequest, gateway_order_id, truncate_name},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

/// Upper bound on a single gateway session.
pub const MAX_SESSION_MINUTES: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargePlan {
    pub amount: i64,
    pub kind: PaymentKind,
}

/// Amount and tag for one payment attempt against `order`.
pub fn resolve_charge(order: &orders::Model, option: PaymentOption) -> AppResult<ChargePlan> {
    if matches!(
        order.status,
        OrderStatus::Paid | OrderStatus::Failed | OrderStatus::Refund
    ) {
        return Err(AppError::BadRequest(
            "order cannot be paid in its current state".into(),
        ));
    }

    let plan = match option {
        PaymentOption::FullPayment if order.status == OrderStatus::PartiallyPaid => ChargePlan {
            amount: order.total_amount - order.down_payment_amount.unwrap_or(order.paid_amount),
            kind: PaymentKind::BalancePayment,
        },
        PaymentOption::FullPayment => ChargePlan {
            amount: order.total_amount,
            kind: PaymentKind::FullPayment,
        },
        PaymentOption::DownPayment if order.status == OrderStatus::PartiallyPaid => {
            return Err(AppError::BadRequest("down payment already settled".into()));
        }
        PaymentOption::DownPayment => match order.down_payment_amount.filter(|dp| *dp > 0) {
            Some(dp) => ChargePlan {
                amount: dp,
                kind: PaymentKind::DownPayment,
            },
            // Products without a down payment are charged in full.
            None => ChargePlan {
                amount: order.total_amount,
                kind: PaymentKind::FullPayment,
            },
        },
    };

    if plan.amount <= 0 {
        return Err(AppError::BadRequest("invalid payment amount".into()));
    }
    Ok(plan)
}

/// Session window: two hours, cut short by the order's own deadline.
pub fn expiry_window(now: DateTime<Utc>, deadline: Option<DateTime<Utc>>) -> AppResult<Expiry> {
    let mut duration_minutes = MAX_SESSION_MINUTES;
    if let Some(deadline) = deadline {
        let remaining = (deadline - now).num_minutes();
        if remaining < 1 {
            return Err(AppError::BadRequest("payment deadline has passed".into()));
        }
        duration_minutes = duration_minutes.min(remaining);
    }
    Ok(Expiry {
        start_time: now,
        duration_minutes,
    })
}

/// Gateway line items for this charge. Their `price * quantity` always sums to
/// `plan.amount`.
pub fn build_item_details(
    items: &[order_items::Model],
    order: &orders::Model,
    plan: &ChargePlan,
) -> Vec<ItemDetail> {
    if items.is_empty() {
        return Vec::new();
    }

    let label = |item: &order_items::Model| {
        item.name
            .clone()
            .unwrap_or_else(|| format!("{:?} {}", item.orderable_kind, item.orderable_id))
    };

    if plan.kind == PaymentKind::FullPayment {
        let mut details: Vec<ItemDetail> = items
            .iter()
            .map(|item| ItemDetail {
                id: item.orderable_id.to_string(),
                price: item.price,
                quantity: item.quantity,
                name: truncate_name(&label(item)),
            })
            .collect();
        if order.discount_amount > 0 {
            details.push(ItemDetail {
                id: "DISCOUNT".into(),
                price: -order.discount_amount,
                quantity: 1,
                name: "Discount".into(),
            });
        }
        return details;
    }

    let prefix = match plan.kind {
        PaymentKind::DownPayment => "DP (50%) for ",
        _ => "Balance for ",
    };

    // Partial charges spread the amount over the lines by their share of the order.
    let line_totals: Vec<i128> = items
        .iter()
        .map(|item| i128::from(item.price) * i128::from(item.quantity))
        .collect();
    let grand_total: i128 = line_totals.iter().sum();

    let mut allocated = 0_i64;
    let last = items.len() - 1;
    items
        .iter()
        .zip(line_totals)
        .enumerate()
        .map(|(idx, (item, line_total))| {
            let price = if idx == last {
                plan.amount - allocated
            } else if grand_total > 0 {
                (i128::from(plan.amount) * line_total / grand_total) as i64
            } else {
                0
            };
            allocated += price;
            ItemDetail {
                id: item.orderable_id.to_string(),
                price,
                quantity: 1,
                name: truncate_name(&format!("{prefix}{}", label(item))),
            }
        })
        .collect()
}

pub async fn initiate_payment(
    state: &AppState,
    user: &AuthUser,
    payload: PaymentRequest,
) -> AppResult<ApiResponse<PaymentInitiated>> {
    let now = Utc::now();
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(payload.order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if order.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let plan = resolve_charge(&order, payload.payment_option)?;
    let expiry = expiry_window(now, order.payment_deadline.map(|dt| dt.with_timezone(&Utc)))?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&txn)
        .await?;
    let item_details = build_item_details(&items, &order, &plan);
    if item_details.is_empty() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "cannot charge empty item list for order {}",
            order.id
        )));
    }

    let transaction = TransactionActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        user_id: Set(user.user_id),
        gross_amount: Set(plan.amount),
        status: Set(TransactionStatus::Pending),
        payment_type: Set(None),
        snap_token: Set(None),
        payment_payloads: Set(None),
        notes: Set(plan.kind),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let customer = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .map(|u| CustomerDetails { email: u.email });

    let request = SnapRequest {
        order_id: gateway_order_id(transaction.id, now),
        gross_amount: plan.amount,
        items: item_details,
        customer,
        expiry,
    };

    let token = state
        .gateway
        .create_snap_token(&request)
        .await
        .map_err(|err| {
            tracing::error!(
                error = %err,
                order_id = %order.id,
                transaction_id = %transaction.id,
                "gateway token request failed"
            );
            AppError::Internal(err)
        })?;

    let mut tx_active: TransactionActive = transaction.into();
    tx_active.snap_token = Set(Some(token.token.clone()));
    tx_active.updated_at = Set(now.into());
    let transaction = tx_active.update(&txn).await?;

    // A partially paid order keeps its state so a failed balance charge cannot
    // be mistaken for a failed first payment.
    if order.status == OrderStatus::Pending {
        let mut order_active: OrderActive = order.clone().into();
        order_active.status = Set(OrderStatus::Processing);
        order_active.updated_at = Set(now.into());
        order_active.update(&txn).await?;
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        transaction_id = %transaction.id,
        amount = plan.amount,
        kind = ?plan.kind,
        "payment initiated"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "payment_initiated",
        "transactions",
        json!({
            "order_id": order.id,
            "transaction_id": transaction.id,
            "gross_amount": plan.amount,
        }),
    )
    .await;

    Ok(ApiResponse::single(
        "Payment initiated",
        PaymentInitiated {
            transaction_id: transaction.id,
            snap_token: token.token,
            redirect_url: token.redirect_url,
            gross_amount: plan.amount,
            payment_kind: plan.kind,
            expires_at: expiry.start_time + Duration::minutes(expiry.duration_minutes),
        },
    ))
}
