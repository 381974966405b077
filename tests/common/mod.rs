#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use secrecy::Secret;
use tokio::sync::OnceCell;
use serde_json::{Value, json};
use travel_booking_api::{
    config::{AppConfig, BookingConfig, MidtransConfig},
    db::{create_pool, orm_from_pool, run_migrations},
    entity::users::ActiveModel as UserActive,
    gateway::{Notification, PaymentGateway, SnapRequest, SnapToken},
    middleware::auth::AuthUser,
    state::AppState,
};
use uuid::Uuid;

pub const SIGNATURE: &str = "signed-by-test-gateway";

// Tests in one binary share the schema; apply it once.
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Records every session it opens and accepts notifications carrying [`SIGNATURE`].
#[derive(Default)]
pub struct FakeGateway {
    pub issued: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn last_order_id(&self) -> String {
        self.issued
            .lock()
            .expect("gateway lock")
            .last()
            .cloned()
            .expect("a session was opened")
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_snap_token(&self, request: &SnapRequest) -> anyhow::Result<SnapToken> {
        let total: i64 = request
            .items
            .iter()
            .map(|item| item.price * i64::from(item.quantity))
            .sum();
        assert_eq!(total, request.gross_amount, "item details must add up");

        let mut issued = self.issued.lock().expect("gateway lock");
        issued.push(request.order_id.clone());
        Ok(SnapToken {
            token: format!("snap-{}", issued.len()),
            redirect_url: Some("https://pay.test/redirect".into()),
        })
    }

    fn verify_notification(&self, notification: &Notification) -> bool {
        notification.signature_key.as_deref() == Some(SIGNATURE)
    }
}

pub fn notification(order_id: &str, status: &str, gross_amount: i64) -> Value {
    json!({
        "order_id": order_id,
        "transaction_status": status,
        "status_code": if status == "settlement" { "200" } else { "202" },
        "gross_amount": format!("{gross_amount}.00"),
        "signature_key": SIGNATURE,
        "payment_type": "bank_transfer",
        "transaction_id": Uuid::new_v4().to_string(),
    })
}

/// Test database URL, or `None` when integration tests should be skipped.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn connect_state(
    database_url: &str,
    gateway: Arc<FakeGateway>,
) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = orm_from_pool(pool.clone());
    MIGRATED
        .get_or_try_init(|| run_migrations(&orm))
        .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: Secret::new("test-secret".into()),
        midtrans: MidtransConfig {
            server_key: Secret::new("SB-Mid-server-test".into()),
            is_production: false,
            is_sanitized: true,
            is_3ds: true,
        },
        booking: BookingConfig::default(),
    };

    Ok(AppState {
        pool,
        orm,
        config: Arc::new(config),
        gateway,
    })
}

pub async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.into()),
        password_hash: Set("test".into()),
        role: Set(role.into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}
