use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::refunds::{CreateRefundRequest, RefundList, RefundListQuery, ReviewRefundRequest},
    entity::{
        Orders, Transactions,
        enums::{OrderStatus, RefundStatus, TransactionStatus},
        orders::{ActiveModel as OrderActive, Column as OrderCol},
        refunds::{ActiveModel as RefundActive, Column as RefundCol, Entity as Refunds},
        transactions::Column as TxCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Refund,
    response::{ApiResponse, Meta},
    services::payment_service::MAX_SESSION_MINUTES,
    state::AppState,
};

pub async fn request_refund(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRefundRequest,
) -> AppResult<ApiResponse<Refund>> {
    payload.validate()?;
    let txn = state.orm.begin().await?;

    // The order lock serializes concurrent requests for the same order.
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(payload.order_id))
                .add(OrderCol::UserId.eq(user.user_id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if !order.status.has_settled_payment() {
        return Err(AppError::BadRequest(
            "only paid orders can be refunded".into(),
        ));
    }

    let active = Refunds::find()
        .filter(RefundCol::OrderId.eq(order.id))
        .filter(RefundCol::Status.is_in([RefundStatus::Pending, RefundStatus::Approved]))
        .count(&txn)
        .await?;
    if active > 0 {
        return Err(AppError::Conflict(
            "a refund for this order is already in progress".into(),
        ));
    }

    let refund = RefundActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        order_id: Set(order.id),
        reason: Set(payload.reason.trim().to_string()),
        status: Set(RefundStatus::Pending),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(refund_id = %refund.id, order_id = %order.id, "refund requested");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "refund_requested",
        "refunds",
        json!({ "refund_id": refund.id, "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::single("Refund requested", refund.into()))
}

pub async fn list_my_refunds(
    state: &AppState,
    user: &AuthUser,
    query: RefundListQuery,
) -> AppResult<ApiResponse<RefundList>> {
    let condition = Condition::all().add(RefundCol::UserId.eq(user.user_id));
    paginate_refunds(state, condition, query).await
}

pub async fn list_refunds_admin(
    state: &AppState,
    user: &AuthUser,
    query: RefundListQuery,
) -> AppResult<ApiResponse<RefundList>> {
    ensure_admin(user)?;
    paginate_refunds(state, Condition::all(), query).await
}

async fn paginate_refunds(
    state: &AppState,
    mut condition: Condition,
    query: RefundListQuery,
) -> AppResult<ApiResponse<RefundList>> {
    let (page, limit, offset) = query.pagination().normalize();
    if let Some(status) = query.status {
        condition = condition.add(RefundCol::Status.eq(status));
    }

    let finder = Refunds::find()
        .filter(condition)
        .order_by_desc(RefundCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ApiResponse::success(
        "Refunds",
        RefundList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Approves or rejects a pending refund. Approval moves the order to `refund`
/// and every settled transaction on it to `refund`, in one DB transaction.
/// It is refused while a payment session on the order can still settle.
pub async fn review_refund(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ReviewRefundRequest,
) -> AppResult<ApiResponse<Refund>> {
    ensure_admin(user)?;
    if payload.status == RefundStatus::Pending {
        return Err(AppError::Validation(
            "status: must be approved or rejected".into(),
        ));
    }

    let now = Utc::now();
    let txn = state.orm.begin().await?;

    let refund = Refunds::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if refund.status != RefundStatus::Pending {
        return Err(AppError::BadRequest("refund has already been reviewed".into()));
    }

    let order_id = refund.order_id;
    let approved = payload.status == RefundStatus::Approved;

    if approved {
        let order = Orders::find_by_id(order_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        // A session still inside its window could settle after the refund.
        let session_cutoff = now - Duration::minutes(MAX_SESSION_MINUTES);
        let open_sessions = Transactions::find()
            .filter(TxCol::OrderId.eq(order_id))
            .filter(TxCol::Status.eq(TransactionStatus::Pending))
            .filter(TxCol::CreatedAt.gt(session_cutoff))
            .count(&txn)
            .await?;
        if open_sessions > 0 {
            return Err(AppError::Conflict(
                "order has a payment session in progress".into(),
            ));
        }

        let mut order_active: OrderActive = order.into();
        order_active.status = Set(OrderStatus::Refund);
        order_active.updated_at = Set(now.into());
        order_active.update(&txn).await?;

        let refunded = Transactions::update_many()
            .col_expr(TxCol::Status, Expr::value(TransactionStatus::Refund))
            .col_expr(TxCol::UpdatedAt, Expr::value(now))
            .filter(TxCol::OrderId.eq(order_id))
            .filter(TxCol::Status.eq(TransactionStatus::Settlement))
            .exec(&txn)
            .await?;
        let lapsed = Transactions::update_many()
            .col_expr(TxCol::Status, Expr::value(TransactionStatus::Failed))
            .col_expr(TxCol::UpdatedAt, Expr::value(now))
            .filter(TxCol::OrderId.eq(order_id))
            .filter(TxCol::Status.eq(TransactionStatus::Pending))
            .exec(&txn)
            .await?;
        tracing::info!(
            order_id = %order_id,
            transactions = refunded.rows_affected,
            lapsed_sessions = lapsed.rows_affected,
            "order refunded"
        );
    }

    let mut active: RefundActive = refund.into();
    active.status = Set(payload.status);
    active.updated_at = Set(now.into());
    let refund = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "refund_reviewed",
        "refunds",
        json!({ "refund_id": refund.id, "order_id": order_id, "status": payload.status }),
    )
    .await;

    Ok(ApiResponse::single("Refund updated", refund.into()))
}
