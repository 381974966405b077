pub mod activities;
pub mod audit_logs;
pub mod bookings;
pub mod car_rental_availabilities;
pub mod car_rentals;
pub mod discount_codes;
pub mod enums;
pub mod holiday_packages;
pub mod open_trips;
pub mod order_items;
pub mod orders;
pub mod pricing_tiers;
pub mod refunds;
pub mod transactions;
pub mod trip_planners;
pub mod users;

pub use activities::Entity as Activities;
pub use audit_logs::Entity as AuditLogs;
pub use bookings::Entity as Bookings;
pub use car_rental_availabilities::Entity as CarRentalAvailabilities;
pub use car_rentals::Entity as CarRentals;
pub use discount_codes::Entity as DiscountCodes;
pub use holiday_packages::Entity as HolidayPackages;
pub use open_trips::Entity as OpenTrips;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use pricing_tiers::Entity as PricingTiers;
pub use refunds::Entity as Refunds;
pub use transactions::Entity as Transactions;
pub use trip_planners::Entity as TripPlanners;
pub use users::Entity as Users;
