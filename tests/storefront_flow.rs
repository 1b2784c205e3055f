use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use rust_decimal::Decimal;
use storefront_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        auth::RegisterRequest,
        cart::AddToCartRequest,
        orders::UpdateOrderStatusRequest,
        products::ProductForm,
    },
    error::AppError,
    middleware::auth::{AuthUser, Viewer},
    models::OrderStatus,
    routes::{create_app, params::Pagination},
    services::{
        admin_service, auth_service, cart_service, invoice_service, order_service,
        wishlist_service,
    },
    state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

// Flow tests need a Postgres; they are skipped when no URL is configured.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run flow tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    run_migrations(&pool).await?;

    let config = AppConfig {
        database_url,
        database_max_connections: 5,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-secret".into(),
        jwt_ttl_hours: 1,
        cors_allow_origin: None,
    };
    Ok(Some(AppState::new(pool, config)))
}

async fn register(state: &AppState, label: &str) -> anyhow::Result<AuthUser> {
    let email = format!("{label}-{}@example.com", Uuid::new_v4().simple());
    let profile = auth_service::register_user(
        state,
        RegisterRequest {
            email: email.clone(),
            password: "secret123".into(),
            full_name: Some(label.into()),
        },
    )
    .await?
    .data
    .expect("profile");

    Ok(AuthUser {
        user_id: profile.id,
        email,
    })
}

async fn register_admin(state: &AppState) -> anyhow::Result<AuthUser> {
    let admin = register(state, "admin").await?;
    sqlx::query("UPDATE profiles SET role = 'admin', is_admin = TRUE WHERE id = $1")
        .bind(admin.user_id)
        .execute(&state.pool)
        .await?;
    Ok(admin)
}

async fn insert_product(state: &AppState, name: &str, price: &str, stock: i32) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO products (name, price, stock_quantity) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(price.parse::<Decimal>()?)
    .bind(stock)
    .fetch_one(&state.pool)
    .await?;
    Ok(id)
}

async fn insert_order(state: &AppState, user: &AuthUser, product_id: Uuid) -> anyhow::Result<Uuid> {
    let (order_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO orders (user_id, total_amount) VALUES ($1, 19.98) RETURNING id",
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price)
        VALUES ($1, $2, 'Pink Salt 1kg', 2, 9.99)
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .execute(&state.pool)
    .await?;
    Ok(order_id)
}

fn salt_form(name: &str, price: &str, stock: &str) -> ProductForm {
    ProductForm {
        name: name.into(),
        description: None,
        price: price.into(),
        image_url: None,
        stock_quantity: stock.into(),
        category: None,
        is_active: true,
    }
}

fn status_change(status: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: status.into(),
    }
}

#[tokio::test]
async fn cart_add_increments_single_line() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = register(&state, "shopper").await?;
    let viewer = Viewer::from(user.clone());
    let product_id = insert_product(&state, "Sea Salt Flakes 250g", "6.50", 20).await?;

    for _ in 0..2 {
        cart_service::add_to_cart(
            &state,
            &viewer,
            AddToCartRequest {
                product_id,
                quantity: 1,
            },
        )
        .await?;
    }

    let cart = cart_service::list_cart(&state, &user).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.subtotal, "13.00".parse::<Decimal>()?);

    let missing = cart_service::add_to_cart(
        &state,
        &viewer,
        AddToCartRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let updated = cart_service::update_quantity(&state, &user, product_id, 0).await?;
    assert_eq!(updated.data.expect("mutation").cart_count, 0);
    Ok(())
}

#[tokio::test]
async fn wishlist_rejects_duplicates_and_removal_is_idempotent() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = register(&state, "wisher").await?;
    let viewer = Viewer::from(user.clone());
    let product_id = insert_product(&state, "Smoked Salt 200g", "7.25", 4).await?;

    let added = wishlist_service::add_to_wishlist(&state, &viewer, product_id).await?;
    assert_eq!(added.data.expect("mutation").wishlist_count, 1);

    let duplicate = wishlist_service::add_to_wishlist(&state, &viewer, product_id).await;
    assert!(matches!(
        duplicate,
        Err(AppError::Conflict(msg)) if msg == "Item already in wishlist"
    ));

    let ids = wishlist_service::wishlist_product_ids(&state, &viewer)
        .await
        .data
        .expect("ids");
    assert_eq!(ids.product_ids, vec![product_id]);

    wishlist_service::remove_from_wishlist(&state, &user, product_id).await?;
    let again = wishlist_service::remove_from_wishlist(&state, &user, product_id).await?;
    assert_eq!(again.data.expect("mutation").wishlist_count, 0);
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_mutate_products() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = register(&state, "customer").await?;
    let name = format!("Forbidden Salt {}", Uuid::new_v4().simple());

    let result = admin_service::create_product(
        &state,
        &customer,
        salt_form(&name, "1.00", "1"),
    )
    .await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE name = $1")
        .bind(&name)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn admin_creates_product_from_form_text() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = register_admin(&state).await?;

    let saved = admin_service::create_product(
        &state,
        &admin,
        ProductForm {
            name: "Pink Salt 1kg".into(),
            description: Some("".into()),
            price: "9.99".into(),
            image_url: None,
            stock_quantity: "50".into(),
            category: Some("salt".into()),
            is_active: true,
        },
    )
    .await?
    .data
    .expect("saved")
    .product;

    assert_eq!(saved.price, "9.99".parse::<Decimal>()?);
    assert_eq!(saved.stock_quantity, 50);
    assert_eq!(saved.description, None);

    let inventory = admin_service::list_inventory(
        &state,
        &admin,
        Pagination {
            page: Some(1),
            per_page: Some(100),
        },
    )
    .await?
    .data
    .expect("inventory");
    assert!(inventory.items.iter().any(|p| p.id == saved.id));
    Ok(())
}

#[tokio::test]
async fn order_status_moves_only_along_the_lifecycle() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = register_admin(&state).await?;
    let customer = register(&state, "buyer").await?;
    let product_id = insert_product(&state, "Pink Salt 1kg", "9.99", 50).await?;
    let order_id = insert_order(&state, &customer, product_id).await?;

    let skipped =
        admin_service::update_order_status(&state, &admin, order_id, status_change("delivered")).await;
    assert!(matches!(
        skipped,
        Err(AppError::IllegalTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered
        })
    ));

    let unknown =
        admin_service::update_order_status(&state, &admin, order_id, status_change("lost")).await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    for next in ["processing", "shipped", "delivered"] {
        let change = admin_service::update_order_status(&state, &admin, order_id, status_change(next))
            .await?
            .data
            .expect("change");
        assert_eq!(change.order.status.as_str(), next);
    }

    let history = order_service::list_account_orders(&state, &customer)
        .await
        .data
        .expect("orders");
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].order.status, OrderStatus::Delivered);
    assert_eq!(history.items[0].items.len(), 1);

    let denied =
        admin_service::update_order_status(&state, &customer, order_id, status_change("cancelled")).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn invoices_can_be_reissued() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let admin = register_admin(&state).await?;
    let customer = register(&state, "invoiced").await?;
    let product_id = insert_product(&state, "Salt Grinder", "14.00", 3).await?;
    let order_id = insert_order(&state, &customer, product_id).await?;

    let first = invoice_service::generate_invoice(&state, &admin, order_id)
        .await?
        .data
        .expect("invoice");
    let second = invoice_service::generate_invoice(&state, &admin, order_id)
        .await?
        .data
        .expect("invoice");

    assert!(first.invoice_number.starts_with("INV-"));
    assert_ne!(first.id, second.id);
    assert!(first.pdf_url.is_none());

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invoices WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count, 2);

    let missing = invoice_service::generate_invoice(&state, &admin, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_update_products() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = register(&state, "editor").await?;
    let product_id = insert_product(&state, "Sea Salt Flakes 250g", "6.50", 120).await?;

    let result = admin_service::update_product(
        &state,
        &customer,
        product_id,
        salt_form("Free Salt", "0.00", "0"),
    )
    .await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let (name, price, stock): (String, Decimal, i32) =
        sqlx::query_as("SELECT name, price, stock_quantity FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(name, "Sea Salt Flakes 250g");
    assert_eq!(price, "6.50".parse::<Decimal>()?);
    assert_eq!(stock, 120);
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_generate_invoices() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = register(&state, "self-invoicer").await?;
    let product_id = insert_product(&state, "Pink Salt 1kg", "9.99", 50).await?;
    let order_id = insert_order(&state, &customer, product_id).await?;

    let result = invoice_service::generate_invoice(&state, &customer, order_id).await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invoices WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn customer_gets_forbidden_envelope_whatever_the_payload() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let customer = register(&state, "poster").await?;
    let token = auth_service::issue_token(&state.config, customer.user_id, &customer.email)?;
    let app = create_app(state.clone());

    let payloads = [
        serde_json::json!({ "name": "Pink Salt 1kg", "price": 9.99, "stock_quantity": 50 }).to_string(),
        serde_json::json!({ "name": "Pink Salt 1kg", "price": [], "stock_quantity": {} }).to_string(),
        "{ not json".to_string(),
    ];

    for payload in payloads {
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/products")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.clone()))
            .expect("request");
        let response = app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{payload}");

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body["message"], "Unauthorized", "{payload}");
    }
    Ok(())
}
