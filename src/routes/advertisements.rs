use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::advertisements::{AdvertisementList, AdvertisementQuery},
    response::ApiResponse,
    services::advertisement_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_active))
}

#[utoipa::path(
    get,
    path = "/api/advertisements",
    params(
        ("position" = Option<String>, Query, description = "Slot, e.g. banner")
    ),
    responses(
        (status = 200, description = "Advertisements live today", body = ApiResponse<AdvertisementList>),
    ),
    tag = "Advertisements"
)]
pub async fn list_active(
    State(state): State<AppState>,
    Query(query): Query<AdvertisementQuery>,
) -> Json<ApiResponse<AdvertisementList>> {
    Json(advertisement_service::list_active_advertisements(&state, query).await)
}
