use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::enums::DiscountType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "discount_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    pub max_uses: Option<i32>,
    pub uses: i32,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// False once the code has expired or every use is spent.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if let Some(expires_at) = self.expires_at {
            if expires_at.with_timezone(&Utc) < now {
                return false;
            }
        }
        match self.max_uses {
            Some(max) => self.uses < max,
            None => true,
        }
    }

    /// Discount for `amount`. A fixed discount never exceeds the amount itself.
    pub fn calculate_discount(&self, amount: i64) -> i64 {
        match self.discount_type {
            DiscountType::Fixed => self.value.min(amount),
            DiscountType::Percent => amount * self.value.min(100) / 100,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
