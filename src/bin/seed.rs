use anyhow::Context;
use travel_booking_api::{db::create_pool, services::auth_service::hash_password};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let pool = create_pool(&database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@example.com", "admin12345").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user12345").await?;
    let car_rental_id = seed_car_rental(&pool).await?;
    seed_holiday_package(&pool).await?;
    seed_open_trip(&pool).await?;
    seed_activity(&pool).await?;
    seed_discount_code(&pool).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, User ID: {user_id}, Car rental ID: {car_rental_id}"
    );
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "admin").await
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "user").await
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_car_rental(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO car_rentals (id, name, brand, seats, price_per_day)
        VALUES ($1, 'Avanza 2023', 'Toyota', 7, 300000)
        ON CONFLICT (name) DO UPDATE SET price_per_day = EXCLUDED.price_per_day
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await?;

    // One year of bookable days starting today.
    let inserted = sqlx::query(
        r#"
        INSERT INTO car_rental_availabilities (car_rental_id, date, status)
        SELECT $1, d::date, 'available'
        FROM generate_series(CURRENT_DATE, CURRENT_DATE + 364, interval '1 day') AS d
        ON CONFLICT (car_rental_id, date) DO NOTHING
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    println!("Seeded car rental ({inserted} new availability days)");
    Ok(id)
}

async fn seed_holiday_package(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO holiday_packages (id, name, duration_days)
        VALUES ($1, 'Bali 3D2N', 3)
        ON CONFLICT (name) DO UPDATE SET duration_days = EXCLUDED.duration_days
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await?;

    let tiers: [(i32, Option<i32>, i64); 3] = [
        (1, Some(3), 450_000),
        (4, Some(6), 350_000),
        (7, Some(10), 300_000),
    ];
    seed_tiers(pool, "holiday_package", id, &tiers).await?;
    println!("Seeded holiday package");
    Ok(())
}

async fn seed_open_trip(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO open_trips (id, name, departure_date)
        VALUES ($1, 'Bromo Sunrise', CURRENT_DATE + 30)
        ON CONFLICT (name) DO UPDATE SET departure_date = EXCLUDED.departure_date
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await?;

    let tiers: [(i32, Option<i32>, i64); 2] = [(1, Some(4), 250_000), (5, None, 200_000)];
    seed_tiers(pool, "open_trip", id, &tiers).await?;
    println!("Seeded open trip");
    Ok(())
}

async fn seed_activity(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO activities (id, name, price)
        VALUES ($1, 'Snorkeling Nusa Penida', 175000)
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;
    println!("Seeded activity");
    Ok(())
}

async fn seed_discount_code(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO discount_codes (id, code, discount_type, value, max_uses)
        VALUES ($1, 'WELCOME10', 'percent', 10, 100)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;
    println!("Seeded discount code WELCOME10");
    Ok(())
}

// Tiers are replaced wholesale so re-running the seed keeps one set per product.
async fn seed_tiers(
    pool: &sqlx::PgPool,
    kind: &str,
    product_id: Uuid,
    tiers: &[(i32, Option<i32>, i64)],
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM pricing_tiers WHERE product_kind = $1 AND product_id = $2")
        .bind(kind)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    for (min_pax, max_pax, price) in tiers {
        sqlx::query(
            r#"
            INSERT INTO pricing_tiers (id, product_kind, product_id, min_pax, max_pax, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(product_id)
        .bind(min_pax)
        .bind(max_pax)
        .bind(price)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}
