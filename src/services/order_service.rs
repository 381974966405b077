use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::{
    catalog::resolve_product,
    dto::orders::{OrderDetail, OrderLine, OrderList},
    entity::{
        Bookings,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
        transactions::{Column as TxCol, Entity as Transactions},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

/// Order with its lines, booking and payment attempts. Each line carries a live
/// product snapshot when the product still exists.
pub async fn load_order_detail<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderDetail> {
    let item_models = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;

    let mut items = Vec::with_capacity(item_models.len());
    for item in item_models {
        let product = resolve_product(conn, item.orderable_kind, item.orderable_id).await?;
        items.push(OrderLine {
            item: item.into(),
            product,
        });
    }

    let booking = match order.booking_id {
        Some(booking_id) => Bookings::find_by_id(booking_id)
            .one(conn)
            .await?
            .map(Into::into),
        None => None,
    };

    let transactions = Transactions::find()
        .filter(TxCol::OrderId.eq(order.id))
        .order_by_asc(TxCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(OrderDetail {
        order: order.into(),
        items,
        booking,
        transactions,
    })
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    paginate_orders(state, condition, query, "Ok").await
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    paginate_orders(state, Condition::all(), query, "Orders").await
}

async fn paginate_orders(
    state: &AppState,
    mut condition: Condition,
    query: OrderListQuery,
    message: &str,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders: Vec<Order> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(ApiResponse::success(
        message,
        OrderList { items: orders },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::single("OK", detail))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::single("Order found", detail))
}
