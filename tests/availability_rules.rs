use axum::http::StatusCode;
use chrono::NaiveDate;
use travel_booking_api::{
    dto::bookings::AvailabilityQuery,
    services::{booking_service::requested_days, car_rental_service::calendar_window},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn calendar_defaults_to_thirty_days_from_today() {
    let today = date(2025, 3, 1);
    let query = AvailabilityQuery { from: None, to: None };
    let (from, to) = calendar_window(&query, today).expect("window");
    assert_eq!(from, today);
    assert_eq!(to, date(2025, 3, 30));
}

#[test]
fn calendar_rejects_inverted_and_oversized_ranges() {
    let today = date(2025, 3, 1);
    let inverted = AvailabilityQuery {
        from: Some(date(2025, 3, 10)),
        to: Some(date(2025, 3, 9)),
    };
    let err = calendar_window(&inverted, today).unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let oversized = AvailabilityQuery {
        from: Some(date(2025, 1, 1)),
        to: Some(date(2026, 1, 2)),
    };
    let err = calendar_window(&oversized, today).unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn calendar_start_at_the_end_of_time_is_rejected() {
    let query = AvailabilityQuery {
        from: Some(NaiveDate::MAX),
        to: None,
    };
    let err = calendar_window(&query, date(2025, 3, 1)).unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // An explicit one-day window at the same date is still fine.
    let single = AvailabilityQuery {
        from: Some(NaiveDate::MAX),
        to: Some(NaiveDate::MAX),
    };
    assert!(calendar_window(&single, date(2025, 3, 1)).is_ok());
}

#[test]
fn requested_days_counts_both_ends() {
    let today = date(2025, 3, 1);
    assert_eq!(requested_days(today, today, today).expect("days"), 1);
    assert_eq!(
        requested_days(date(2025, 3, 10), date(2025, 3, 12), today).expect("days"),
        3
    );
    let err = requested_days(date(2025, 2, 28), date(2025, 3, 2), today).unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err = requested_days(date(2025, 3, 5), date(2025, 3, 4), today).unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
