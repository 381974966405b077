use sea_orm::entity::prelude::*;

use super::enums::ProductKind;

/// Per-pax price band for a tier-priced product. `max_pax` of `None` (or 0)
/// means "and above".
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pricing_tiers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub product_kind: ProductKind,
    pub product_id: Uuid,
    pub min_pax: i32,
    pub max_pax: Option<i32>,
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
