use std::env;

use anyhow::Context;
use secrecy::Secret;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: Secret<String>,
    pub midtrans: MidtransConfig,
    pub booking: BookingConfig,
}

/// Snap gateway settings, handed to the gateway client at construction.
#[derive(Debug, Clone)]
pub struct MidtransConfig {
    pub server_key: Secret<String>,
    pub is_production: bool,
    pub is_sanitized: bool,
    pub is_3ds: bool,
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Flat price charged for one custom trip plan.
    pub trip_planner_price: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            trip_planner_price: 500_000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let server_key =
            env::var("MIDTRANS_SERVER_KEY").context("MIDTRANS_SERVER_KEY is not set")?;

        let midtrans = MidtransConfig {
            server_key: Secret::new(server_key),
            is_production: env_flag("MIDTRANS_IS_PRODUCTION", false),
            is_sanitized: env_flag("MIDTRANS_IS_SANITIZED", true),
            is_3ds: env_flag("MIDTRANS_IS_3DS", true),
        };

        let booking = BookingConfig {
            trip_planner_price: env::var("TRIP_PLANNER_PRICE")
                .ok()
                .and_then(|p| p.parse::<i64>().ok())
                .filter(|p| *p > 0)
                .unwrap_or_else(|| BookingConfig::default().trip_planner_price),
        };

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret: Secret::new(jwt_secret),
            midtrans,
            booking,
        })
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
