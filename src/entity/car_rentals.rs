use sea_orm::entity::prelude::*;

use super::enums::CarRentalStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "car_rentals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub seats: i32,
    pub price_per_day: i64,
    pub status: CarRentalStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::car_rental_availabilities::Entity")]
    Availabilities,
}

impl Related<super::car_rental_availabilities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Availabilities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
