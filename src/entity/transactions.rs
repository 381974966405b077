use sea_orm::entity::prelude::*;
use serde_json::Value;

use super::enums::{PaymentKind, TransactionStatus};

/// One gateway charge attempt against an order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub gross_amount: i64,
    pub status: TransactionStatus,
    pub payment_type: Option<String>,
    pub snap_token: Option<String>,
    pub payment_payloads: Option<Value>,
    pub notes: PaymentKind,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
