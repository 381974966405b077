use travel_booking_api::services::pricing::{PriceTier, down_payment_for, price_per_pax};

fn package_tiers() -> Vec<PriceTier> {
    vec![
        PriceTier::new(1, Some(3), 450_000),
        PriceTier::new(4, Some(6), 350_000),
        PriceTier::new(7, Some(10), 300_000),
    ]
}

#[test]
fn picks_the_tier_covering_pax() {
    let tiers = package_tiers();
    assert_eq!(price_per_pax(&tiers, 1), Some(450_000));
    assert_eq!(price_per_pax(&tiers, 3), Some(450_000));
    assert_eq!(price_per_pax(&tiers, 4), Some(350_000));
    assert_eq!(price_per_pax(&tiers, 5), Some(350_000));
    assert_eq!(price_per_pax(&tiers, 10), Some(300_000));
}

#[test]
fn pax_outside_every_tier_has_no_price() {
    let tiers = package_tiers();
    assert_eq!(price_per_pax(&tiers, 0), None);
    assert_eq!(price_per_pax(&tiers, 11), None);
    assert_eq!(price_per_pax(&[], 2), None);
}

#[test]
fn tier_order_does_not_matter() {
    let mut tiers = package_tiers();
    tiers.reverse();
    assert_eq!(price_per_pax(&tiers, 5), Some(350_000));
    assert_eq!(price_per_pax(&tiers, 2), Some(450_000));
}

#[test]
fn open_ended_tier_covers_large_groups() {
    let tiers = vec![
        PriceTier::new(1, Some(4), 250_000),
        PriceTier::new(5, None, 200_000),
    ];
    assert_eq!(price_per_pax(&tiers, 5), Some(200_000));
    assert_eq!(price_per_pax(&tiers, 40), Some(200_000));

    // A zero upper bound is treated like no bound.
    let zero_max = vec![PriceTier::new(2, Some(0), 100_000)];
    assert_eq!(price_per_pax(&zero_max, 1), None);
    assert_eq!(price_per_pax(&zero_max, 9), Some(100_000));
}

#[test]
fn down_payment_is_half_rounded_down() {
    assert_eq!(down_payment_for(900_000), 450_000);
    assert_eq!(down_payment_for(300_001), 150_000);
    assert_eq!(down_payment_for(0), 0);
}
