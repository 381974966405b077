use sea_orm::entity::prelude::*;

use super::enums::AvailabilityStatus;

/// One row per (car, calendar day). Unique on `(car_rental_id, date)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "car_rental_availabilities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub car_rental_id: Uuid,
    pub date: Date,
    pub status: AvailabilityStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car_rentals::Entity",
        from = "Column::CarRentalId",
        to = "super::car_rentals::Column::Id"
    )]
    CarRentals,
}

impl Related<super::car_rentals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarRentals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
