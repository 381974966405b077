//! Product kinds that can be ordered, and the resolver from `(kind, id)` to a
//! live snapshot. Order lines keep their own captured name/options, so a
//! missing product resolves to `None` rather than an error.

use sea_orm::{ConnectionTrait, EntityTrait};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        Activities, CarRentals, HolidayPackages, OpenTrips, TripPlanners, activities,
        car_rentals,
        enums::{CarRentalStatus, ProductKind},
        holiday_packages, open_trips, trip_planners,
    },
    error::AppResult,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSnapshot {
    pub kind: ProductKind,
    pub id: Uuid,
    pub name: String,
    /// Flat unit price, when the product has one. Tier-priced products report `None`.
    pub unit_price: Option<i64>,
    pub active: bool,
}

/// Implemented by every product entity an order line can point at.
pub trait Orderable {
    const KIND: ProductKind;

    fn snapshot(&self) -> ProductSnapshot;
}

impl Orderable for car_rentals::Model {
    const KIND: ProductKind = ProductKind::CarRental;

    fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            kind: Self::KIND,
            id: self.id,
            name: format!("{} {}", self.brand, self.name),
            unit_price: Some(self.price_per_day),
            active: self.status == CarRentalStatus::Available,
        }
    }
}

impl Orderable for holiday_packages::Model {
    const KIND: ProductKind = ProductKind::HolidayPackage;

    fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            kind: Self::KIND,
            id: self.id,
            name: self.name.clone(),
            unit_price: None,
            active: self.is_active,
        }
    }
}

impl Orderable for activities::Model {
    const KIND: ProductKind = ProductKind::Activity;

    fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            kind: Self::KIND,
            id: self.id,
            name: self.name.clone(),
            unit_price: Some(self.price),
            active: self.is_active,
        }
    }
}

impl Orderable for open_trips::Model {
    const KIND: ProductKind = ProductKind::OpenTrip;

    fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            kind: Self::KIND,
            id: self.id,
            name: self.name.clone(),
            unit_price: None,
            active: self.is_active,
        }
    }
}

impl Orderable for trip_planners::Model {
    const KIND: ProductKind = ProductKind::TripPlanner;

    fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            kind: Self::KIND,
            id: self.id,
            name: format!("Trip plan to {}", self.destination),
            unit_price: None,
            active: true,
        }
    }
}

pub async fn resolve_product<C: ConnectionTrait>(
    conn: &C,
    kind: ProductKind,
    id: Uuid,
) -> AppResult<Option<ProductSnapshot>> {
    let snapshot = match kind {
        ProductKind::CarRental => CarRentals::find_by_id(id)
            .one(conn)
            .await?
            .map(|m| m.snapshot()),
        ProductKind::HolidayPackage => HolidayPackages::find_by_id(id)
            .one(conn)
            .await?
            .map(|m| m.snapshot()),
        ProductKind::Activity => Activities::find_by_id(id)
            .one(conn)
            .await?
            .map(|m| m.snapshot()),
        ProductKind::OpenTrip => OpenTrips::find_by_id(id)
            .one(conn)
            .await?
            .map(|m| m.snapshot()),
        ProductKind::TripPlanner => TripPlanners::find_by_id(id)
            .one(conn)
            .await?
            .map(|m| m.snapshot()),
    };
    Ok(snapshot)
}
