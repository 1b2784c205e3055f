use rust_decimal::Decimal;
use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::{ADMIN_ROLE, CUSTOMER_ROLE},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "Store Admin", ADMIN_ROLE).await?;
    let customer_id =
        ensure_user(&pool, "customer@example.com", "customer123", "Sample Customer", CUSTOMER_ROLE).await?;
    seed_products(&pool).await?;
    seed_sample_order(&pool, customer_id).await?;

    tracing::info!(%admin_id, %customer_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    email: &str,
    password: &str,
    full_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, full_name, role, is_admin)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE
        SET full_name = EXCLUDED.full_name, role = EXCLUDED.role, is_admin = EXCLUDED.is_admin
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(full_name)
    .bind(role)
    .bind(role == ADMIN_ROLE)
    .execute(pool)
    .await?;

    tracing::info!(email, role, "ensured user");
    Ok(user_id)
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    let products = [
        ("Pink Salt 1kg", "Himalayan pink salt, coarse grain", "9.99", 50, "salt"),
        ("Sea Salt Flakes 250g", "Hand harvested flakes", "6.50", 120, "salt"),
        ("Smoked Salt 200g", "Cold smoked over oak", "7.25", 40, "salt"),
        ("Salt Grinder", "Ceramic burr grinder", "14.00", 0, "accessories"),
    ];

    for (name, description, price, stock, category) in products {
        let price: Decimal = price.parse()?;
        sqlx::query(
            r#"
            INSERT INTO products (name, description, price, stock_quantity, category, is_active)
            SELECT $1, $2, $3, $4, $5, TRUE
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(category)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO advertisements (title, description, position, is_active)
        SELECT 'Salt season', 'Ten percent off all flakes', 'banner', TRUE
        WHERE NOT EXISTS (SELECT 1 FROM advertisements WHERE title = 'Salt season')
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("seeded products");
    Ok(())
}

/// One pending order so the admin status and invoice screens have data.
async fn seed_sample_order(pool: &DbPool, customer_id: Uuid) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        return Ok(());
    }

    let product: Option<(Uuid, String, Decimal)> =
        sqlx::query_as("SELECT id, name, price FROM products WHERE name = 'Pink Salt 1kg' LIMIT 1")
            .fetch_optional(pool)
            .await?;
    let Some((product_id, product_name, unit_price)) = product else {
        return Ok(());
    };

    let quantity = 2;
    let total = unit_price * Decimal::from(quantity);

    let mut tx = pool.begin().await?;
    let (order_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO orders (user_id, status, total_amount, shipping_address)
        VALUES ($1, 'pending', $2, '1 Harbour Road')
        RETURNING id
        "#,
    )
    .bind(customer_id)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(product_name)
    .bind(quantity)
    .bind(unit_price)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(%order_id, "seeded sample order");
    Ok(())
}
