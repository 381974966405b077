use chrono::{Duration, TimeZone, Utc};
use secrecy::Secret;
use travel_booking_api::{
    config::MidtransConfig,
    dto::payments::PaymentOption,
    entity::{
        enums::{OrderStatus, PaymentKind, ProductKind},
        order_items, orders,
    },
    error::AppError,
    gateway::{
        MAX_ITEM_NAME_LEN, MidtransGateway, Notification, PaymentGateway, gateway_order_id,
        notification_signature, parse_gateway_order_id,
    },
    services::payment_service::{
        ChargePlan, MAX_SESSION_MINUTES, build_item_details, expiry_window, resolve_charge,
    },
};
use uuid::Uuid;

fn order(status: OrderStatus, total: i64, down_payment: Option<i64>) -> orders::Model {
    let now = Utc::now().fixed_offset();
    orders::Model {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        booking_id: None,
        discount_code_id: None,
        subtotal: total,
        discount_amount: 0,
        total_amount: total,
        paid_amount: 0,
        down_payment_amount: down_payment,
        status,
        payment_deadline: None,
        created_at: now,
        updated_at: now,
    }
}

fn item(order_id: Uuid, name: &str, price: i64, quantity: i32) -> order_items::Model {
    order_items::Model {
        id: Uuid::new_v4(),
        order_id,
        orderable_kind: ProductKind::HolidayPackage,
        orderable_id: Uuid::new_v4(),
        quantity,
        price,
        name: Some(name.into()),
        options: None,
        created_at: Utc::now().fixed_offset(),
    }
}

#[test]
fn down_payment_then_balance() {
    let pending = order(OrderStatus::Pending, 900_000, Some(450_000));
    let plan = resolve_charge(&pending, PaymentOption::DownPayment).expect("dp plan");
    assert_eq!(
        plan,
        ChargePlan {
            amount: 450_000,
            kind: PaymentKind::DownPayment
        }
    );

    let mut partial = order(OrderStatus::PartiallyPaid, 900_000, Some(450_000));
    partial.paid_amount = 450_000;
    let plan = resolve_charge(&partial, PaymentOption::FullPayment).expect("balance plan");
    assert_eq!(plan.amount, 450_000);
    assert_eq!(plan.kind, PaymentKind::BalancePayment);

    let err = resolve_charge(&partial, PaymentOption::DownPayment).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn full_payment_and_fallback_without_down_payment() {
    let processing = order(OrderStatus::Processing, 600_000, Some(300_000));
    let plan = resolve_charge(&processing, PaymentOption::FullPayment).expect("full plan");
    assert_eq!(plan.amount, 600_000);
    assert_eq!(plan.kind, PaymentKind::FullPayment);

    let no_dp = order(OrderStatus::Pending, 175_000, None);
    let plan = resolve_charge(&no_dp, PaymentOption::DownPayment).expect("fallback plan");
    assert_eq!(plan.amount, 175_000);
    assert_eq!(plan.kind, PaymentKind::FullPayment);
}

#[test]
fn closed_orders_cannot_be_charged() {
    for status in [OrderStatus::Paid, OrderStatus::Failed, OrderStatus::Refund] {
        let closed = order(status, 100_000, None);
        let err = resolve_charge(&closed, PaymentOption::FullPayment).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "{status:?}");
    }
}

#[test]
fn session_is_capped_by_deadline() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();

    let open = expiry_window(now, None).expect("no deadline");
    assert_eq!(open.duration_minutes, MAX_SESSION_MINUTES);
    assert_eq!(open.start_time, now);

    let far = expiry_window(now, Some(now + Duration::hours(5))).expect("far deadline");
    assert_eq!(far.duration_minutes, 120);

    let near = expiry_window(now, Some(now + Duration::minutes(45))).expect("near deadline");
    assert_eq!(near.duration_minutes, 45);

    let err = expiry_window(now, Some(now + Duration::seconds(30))).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = expiry_window(now, Some(now - Duration::minutes(5))).unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn item_details_sum_to_charge_amount() {
    let mut discounted = order(OrderStatus::Pending, 0, None);
    discounted.subtotal = 1_050_000;
    discounted.discount_amount = 105_000;
    discounted.total_amount = 945_000;
    let items = vec![
        item(discounted.id, "Bali 3D2N", 350_000, 3),
    ];
    let sum = |details: &[travel_booking_api::gateway::ItemDetail]| {
        details
            .iter()
            .map(|d| d.price * i64::from(d.quantity))
            .sum::<i64>()
    };

    let full = ChargePlan {
        amount: discounted.total_amount,
        kind: PaymentKind::FullPayment,
    };
    let details = build_item_details(&items, &discounted, &full);
    assert_eq!(sum(&details), 945_000);
    assert_eq!(details.last().map(|d| d.id.as_str()), Some("DISCOUNT"));

    let lines = order(OrderStatus::Pending, 1_000_000, Some(500_000));
    let items = vec![
        item(lines.id, "Snorkeling", 333_333, 1),
        item(lines.id, "Diving", 666_667, 1),
    ];
    for (amount, kind, prefix) in [
        (500_000, PaymentKind::DownPayment, "DP (50%) for "),
        (500_000, PaymentKind::BalancePayment, "Balance for "),
        (333_331, PaymentKind::DownPayment, "DP (50%) for "),
    ] {
        let details = build_item_details(&items, &lines, &ChargePlan { amount, kind });
        assert_eq!(sum(&details), amount);
        assert!(details.iter().all(|d| d.quantity == 1));
        assert!(details.iter().all(|d| d.name.starts_with(prefix)));
    }

    assert!(build_item_details(&[], &lines, &full).is_empty());
}

#[test]
fn long_item_names_are_truncated() {
    let o = order(OrderStatus::Pending, 200_000, None);
    let long_name = "Sunrise trekking to Mount Bromo with jeep and breakfast included";
    let items = vec![item(o.id, long_name, 200_000, 1)];
    let plan = ChargePlan {
        amount: 200_000,
        kind: PaymentKind::FullPayment,
    };
    let details = build_item_details(&items, &o, &plan);
    assert_eq!(details[0].name.chars().count(), MAX_ITEM_NAME_LEN);
    assert!(long_name.starts_with(&details[0].name));
}

#[test]
fn gateway_order_id_round_trips() {
    let id = Uuid::new_v4();
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let external = gateway_order_id(id, at);
    assert_eq!(external, format!("TRX-{id}-{}", at.timestamp()));
    assert_eq!(parse_gateway_order_id(&external), Some(id));

    assert_eq!(parse_gateway_order_id(&id.to_string()), None);
    assert_eq!(parse_gateway_order_id(&format!("TRX-{id}")), None);
    assert_eq!(parse_gateway_order_id(&format!("TRX-{id}-abc")), None);
    assert_eq!(parse_gateway_order_id("TRX-not-a-uuid-1700000000"), None);
}

#[test]
fn notification_signature_is_checked() {
    let gateway = MidtransGateway::new(MidtransConfig {
        server_key: Secret::new("SB-Mid-server-test".into()),
        is_production: false,
        is_sanitized: true,
        is_3ds: true,
    });
    let order_id = gateway_order_id(Uuid::new_v4(), Utc::now());
    let signature = notification_signature(&order_id, "200", "450000.00", "SB-Mid-server-test");
    assert_eq!(signature.len(), 128);

    let mut notification = Notification {
        order_id,
        transaction_status: "settlement".into(),
        fraud_status: None,
        payment_type: Some("bank_transfer".into()),
        status_code: Some("200".into()),
        gross_amount: Some("450000.00".into()),
        signature_key: Some(signature.to_uppercase()),
        transaction_id: None,
    };
    assert!(gateway.verify_notification(&notification));

    notification.gross_amount = Some("1.00".into());
    assert!(!gateway.verify_notification(&notification));

    notification.gross_amount = Some("450000.00".into());
    notification.signature_key = None;
    assert!(!gateway.verify_notification(&notification));
}
