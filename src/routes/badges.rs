use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::cart::BadgeCounts,
    middleware::auth::Viewer,
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/badges", get(badge_counts))
}

#[utoipa::path(
    get,
    path = "/api/badges",
    responses(
        (status = 200, description = "Cart and wishlist counts for navigation badges", body = ApiResponse<BadgeCounts>),
    ),
    tag = "Cart"
)]
pub async fn badge_counts(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Json<ApiResponse<BadgeCounts>> {
    Json(wishlist_service::badge_counts(&state, &viewer).await)
}
