use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    catalog::ProductSnapshot,
    models::{Booking, Order, OrderItem, Transaction},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: OrderItem,
    /// Current state of the product; `None` once it has been removed.
    pub product: Option<ProductSnapshot>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderLine>,
    pub booking: Option<Booking>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
