use sea_orm::entity::prelude::*;
use serde_json::Value;

use super::enums::ProductKind;

/// A line item. `name` and `options` are a snapshot taken at purchase time so
/// the line stays readable after the product changes or disappears.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub orderable_kind: ProductKind,
    pub orderable_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub name: Option<String>,
    pub options: Option<Value>,
    pub created_at: DateTimeWithTimeZone,
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
