use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderView},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/account/orders",
    responses(
        (status = 200, description = "Order history with lines", body = ApiResponse<OrderList>),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Json<ApiResponse<OrderList>> {
    Json(order_service::list_account_orders(&state, &user).await)
}

#[utoipa::path(
    get,
    path = "/api/account/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "One of the caller's orders", body = ApiResponse<OrderView>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::get_account_order(&state, &user, id).await?;
    Ok(Json(resp))
}
