use chrono::{Duration, Utc};
use travel_booking_api::entity::{discount_codes::Model as DiscountCode, enums::DiscountType};
use uuid::Uuid;

fn code(discount_type: DiscountType, value: i64) -> DiscountCode {
    DiscountCode {
        id: Uuid::new_v4(),
        code: "TEST".into(),
        discount_type,
        value,
        max_uses: None,
        uses: 0,
        expires_at: None,
        created_at: Utc::now().fixed_offset(),
    }
}

#[test]
fn fixed_discount_is_capped_at_amount() {
    let fixed = code(DiscountType::Fixed, 100_000);
    assert_eq!(fixed.calculate_discount(250_000), 100_000);
    assert_eq!(fixed.calculate_discount(60_000), 60_000);
}

#[test]
fn percent_discount_never_exceeds_amount() {
    let ten = code(DiscountType::Percent, 10);
    assert_eq!(ten.calculate_discount(450_000), 45_000);

    let too_much = code(DiscountType::Percent, 150);
    assert_eq!(too_much.calculate_discount(80_000), 80_000);

    for amount in [0_i64, 1, 99, 1_000, 1_234_567] {
        for discount in [code(DiscountType::Fixed, 5_000), code(DiscountType::Percent, 33)] {
            let value = discount.calculate_discount(amount);
            assert!((0..=amount).contains(&value), "{value} out of range for {amount}");
        }
    }
}

#[test]
fn expired_or_exhausted_codes_are_invalid() {
    let now = Utc::now();

    let mut expired = code(DiscountType::Fixed, 1_000);
    expired.expires_at = Some((now - Duration::hours(1)).fixed_offset());
    assert!(!expired.is_valid(now));

    let mut exhausted = code(DiscountType::Fixed, 1_000);
    exhausted.max_uses = Some(3);
    exhausted.uses = 3;
    assert!(!exhausted.is_valid(now));

    let mut live = code(DiscountType::Percent, 10);
    live.max_uses = Some(3);
    live.uses = 2;
    live.expires_at = Some((now + Duration::days(1)).fixed_offset());
    assert!(live.is_valid(now));
}
