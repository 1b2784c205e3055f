use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::{
        cart::{BadgeCounts, CountResponse},
        wishlist::{WishlistIds, WishlistItemDto, WishlistList, WishlistMutation},
    },
    error::{AppError, AppResult, is_foreign_key_violation, is_unique_violation},
    middleware::auth::{AuthUser, Viewer},
    models::{Product, is_purchasable},
    response::{ApiResponse, Meta},
    services::{cart_service, or_empty, or_zero},
    state::AppState,
};

pub const LOGIN_TO_ADD_MESSAGE: &str = "Please login to add items to wishlist";
pub const ALREADY_IN_WISHLIST: &str = "Item already in wishlist";

#[derive(FromRow)]
struct WishlistWithProductRow {
    wishlist_id: Uuid,
    added_at: DateTime<Utc>,
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

impl From<WishlistWithProductRow> for WishlistItemDto {
    fn from(row: WishlistWithProductRow) -> Self {
        WishlistItemDto {
            id: row.wishlist_id,
            added_at: row.added_at,
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
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlist WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(total.0)
}

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<WishlistList>> {
    let rows = sqlx::query_as::<_, WishlistWithProductRow>(
        r#"
        SELECT w.id AS wishlist_id, w.created_at AS added_at,
               p.id AS product_id, p.name, p.description, p.price, p.image_url,
               p.stock_quantity, p.category, p.is_active, p.created_at AS product_created_at
        FROM wishlist w
        JOIN products p ON p.id = w.product_id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let total = rows.len() as i64;
    let items = rows.into_iter().map(WishlistItemDto::from).collect();
    Ok(ApiResponse::success(
        "OK",
        WishlistList { items },
        Some(Meta::total(total)),
    ))
}

/// Inserts the (user, product) pair. The unique constraint decides duplicates, so two
/// racing inserts still leave one row and the loser gets a conflict.
pub async fn add_to_wishlist(
    state: &AppState,
    viewer: &Viewer,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistMutation>> {
    let user = viewer.require(LOGIN_TO_ADD_MESSAGE)?;

    sqlx::query("INSERT INTO wishlist (id, user_id, product_id) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict(ALREADY_IN_WISHLIST.to_string())
            } else if is_foreign_key_violation(&err) {
                AppError::not_found("Product")
            } else {
                AppError::DbError(err)
            }
        })?;

    audit::record(
        &state.pool,
        user.user_id,
        "wishlist_add",
        "wishlist",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    let wishlist_count = or_zero(count_for(&state.pool, user.user_id).await, "wishlist");
    Ok(ApiResponse::success(
        "Added to wishlist",
        WishlistMutation {
            product_id,
            in_wishlist: true,
            wishlist_count,
        },
        Some(Meta::empty()),
    ))
}

/// Removing a product that is not in the wishlist still succeeds.
pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistMutation>> {
    let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() > 0 {
        audit::record(
            &state.pool,
            user.user_id,
            "wishlist_remove",
            "wishlist",
            serde_json::json!({ "product_id": product_id }),
        )
        .await;
    }

    let wishlist_count = or_zero(count_for(&state.pool, user.user_id).await, "wishlist");
    Ok(ApiResponse::success(
        "Removed from wishlist",
        WishlistMutation {
            product_id,
            in_wishlist: false,
            wishlist_count,
        },
        Some(Meta::empty()),
    ))
}

pub async fn wishlist_product_ids(state: &AppState, viewer: &Viewer) -> ApiResponse<WishlistIds> {
    let product_ids = match viewer.user() {
        Some(user) => {
            let rows: AppResult<Vec<(Uuid,)>> =
                sqlx::query_as("SELECT product_id FROM wishlist WHERE user_id = $1")
                    .bind(user.user_id)
                    .fetch_all(&state.pool)
                    .await
                    .map_err(AppError::from);
            or_empty(rows, "wishlist ids")
                .into_iter()
                .map(|(id,)| id)
                .collect()
        }
        None => Vec::new(),
    };
    ApiResponse::success("Wishlist ids", WishlistIds { product_ids }, None)
}

pub async fn wishlist_count(state: &AppState, viewer: &Viewer) -> ApiResponse<CountResponse> {
    let count = match viewer.user() {
        Some(user) => or_zero(count_for(&state.pool, user.user_id).await, "wishlist"),
        None => 0,
    };
    ApiResponse::success("Wishlist count", CountResponse { count }, None)
}

/// Both badge counts, fetched concurrently.
pub async fn badge_counts(state: &AppState, viewer: &Viewer) -> ApiResponse<BadgeCounts> {
    let counts = match viewer.user() {
        Some(user) => {
            let (cart, wishlist) = tokio::join!(
                cart_service::count_for(&state.pool, user.user_id),
                count_for(&state.pool, user.user_id),
            );
            BadgeCounts {
                cart_count: or_zero(cart, "cart"),
                wishlist_count: or_zero(wishlist, "wishlist"),
            }
        }
        None => BadgeCounts {
            cart_count: 0,
            wishlist_count: 0,
        },
    };
    ApiResponse::success("Badge counts", counts, None)
}
