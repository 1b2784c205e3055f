use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::CountResponse,
        wishlist::{AddToWishlistRequest, WishlistIds, WishlistList, WishlistMutation},
    },
    error::AppResult,
    middleware::auth::{AuthUser, Viewer},
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist).post(add_to_wishlist))
        .route("/ids", get(wishlist_ids))
        .route("/count", get(wishlist_count))
        .route("/{product_id}", delete(remove_from_wishlist))
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses(
        (status = 200, description = "Wishlist for current user", body = ApiResponse<WishlistList>),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<WishlistList>>> {
    let resp = wishlist_service::list_wishlist(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist",
    request_body = AddToWishlistRequest,
    responses(
        (status = 200, description = "Added to wishlist", body = ApiResponse<WishlistMutation>),
        (status = 401, description = "Please login to add items to wishlist"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Item already in wishlist")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(payload): Json<AddToWishlistRequest>,
) -> AppResult<Json<ApiResponse<WishlistMutation>>> {
    let resp = wishlist_service::add_to_wishlist(&state, &viewer, payload.product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed (or already absent)", body = ApiResponse<WishlistMutation>),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistMutation>>> {
    let resp = wishlist_service::remove_from_wishlist(&state, &user, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/wishlist/ids",
    responses(
        (status = 200, description = "Product ids in the wishlist; empty when anonymous", body = ApiResponse<WishlistIds>),
    ),
    tag = "Wishlist"
)]
pub async fn wishlist_ids(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Json<ApiResponse<WishlistIds>> {
    Json(wishlist_service::wishlist_product_ids(&state, &viewer).await)
}

#[utoipa::path(
    get,
    path = "/api/wishlist/count",
    responses(
        (status = 200, description = "Wishlist size; 0 when anonymous", body = ApiResponse<CountResponse>),
    ),
    tag = "Wishlist"
)]
pub async fn wishlist_count(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Json<ApiResponse<CountResponse>> {
    Json(wishlist_service::wishlist_count(&state, &viewer).await)
}
