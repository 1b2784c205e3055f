use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemDto, CartList, CartMutation, CountResponse},
    error::{AppError, AppResult, is_foreign_key_violation},
    middleware::auth::{AuthUser, Viewer},
    models::{CartLine, Product, is_purchasable},
    response::{ApiResponse, Meta},
    services::or_zero,
    state::AppState,
};

pub const LOGIN_TO_ADD_MESSAGE: &str = "Please login to add items to cart";

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    stock_quantity: i32,
    category: Option<String>,
    is_active: bool,
    product_created_at: DateTime<Utc>,
}

impl From<CartWithProductRow> for CartItemDto {
    fn from(row: CartWithProductRow) -> Self {
        let line_total = row.price * Decimal::from(row.quantity);
        CartItemDto {
            id: row.cart_id,
            quantity: row.quantity,
            line_total,
            product: Product {
                purchasable: is_purchasable(row.is_active, row.stock_quantity),
                id: row.product_id,
                name: row.name,
                description: row.description,
                price: row.price,
                image_url: row.image_url,
                stock_quantity: row.stock_quantity,
                category: row.category,
                is_active: row.is_active,
                created_at: row.product_created_at,
            },
        }
    }
}

pub async fn count_for(pool: &DbPool, user_id: Uuid) -> AppResult<i64> {
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(total.0)
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT c.id AS cart_id, c.quantity,
               p.id AS product_id, p.name, p.description, p.price, p.image_url,
               p.stock_quantity, p.category, p.is_active, p.created_at AS product_created_at
        FROM cart c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let total = rows.len() as i64;
    let items = rows.into_iter().map(CartItemDto::from).collect();
    Ok(ApiResponse::success("OK", CartList::new(items), Some(Meta::total(total))))
}

/// Adds `quantity` to the caller's line for the product, creating it when absent.
///
/// The increment is one `INSERT .. ON CONFLICT` statement, so concurrent adds for
/// the same product never lose an update. Stock is not checked here.
pub async fn add_to_cart(
    state: &AppState,
    viewer: &Viewer,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartMutation>> {
    let user = viewer.require(LOGIN_TO_ADD_MESSAGE)?;
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let line = sqlx::query_as::<_, CartLine>(
        r#"
        INSERT INTO cart (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity, updated_at = NOW()
        RETURNING id, user_id, product_id, quantity, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| {
        if is_foreign_key_violation(&err) {
            AppError::not_found("Product")
        } else {
            AppError::DbError(err)
        }
    })?;

    tracing::debug!(
        user_id = %user.user_id,
        product_id = %payload.product_id,
        quantity = line.quantity,
        "cart line upserted"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "cart_add",
        "cart",
        serde_json::json!({ "product_id": payload.product_id, "added": payload.quantity }),
    )
    .await;

    let cart_count = or_zero(count_for(&state.pool, user.user_id).await, "cart");
    Ok(ApiResponse::success(
        "Added to cart",
        CartMutation {
            item: Some(line),
            cart_count,
        },
        Some(Meta::empty()),
    ))
}

/// Overwrites the line quantity; zero or less removes the line.
pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<ApiResponse<CartMutation>> {
    if quantity <= 0 {
        return remove_from_cart(state, user, product_id).await;
    }

    let line = sqlx::query_as::<_, CartLine>(
        r#"
        UPDATE cart
        SET quantity = $3, updated_at = NOW()
        WHERE user_id = $1 AND product_id = $2
        RETURNING id, user_id, product_id, quantity, created_at, updated_at
        "#,
    )
    .bind(user.user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Cart item"))?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart",
        serde_json::json!({ "product_id": product_id, "quantity": quantity }),
    )
    .await;

    let cart_count = or_zero(count_for(&state.pool, user.user_id).await, "cart");
    Ok(ApiResponse::success(
        "Cart updated",
        CartMutation {
            item: Some(line),
            cart_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartMutation>> {
    let result = sqlx::query("DELETE FROM cart WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() > 0 {
        audit::record(
            &state.pool,
            user.user_id,
            "cart_remove",
            "cart",
            serde_json::json!({ "product_id": product_id }),
        )
        .await;
    }

    let cart_count = or_zero(count_for(&state.pool, user.user_id).await, "cart");
    Ok(ApiResponse::success(
        "Removed from cart",
        CartMutation {
            item: None,
            cart_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn cart_count(state: &AppState, viewer: &Viewer) -> ApiResponse<CountResponse> {
    let count = match viewer.user() {
        Some(user) => or_zero(count_for(&state.pool, user.user_id).await, "cart"),
        None => 0,
    };
    ApiResponse::success("Cart count", CountResponse { count }, None)
}
