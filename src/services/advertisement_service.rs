use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    audit,
    dto::advertisements::{
        AdvertisementForm, AdvertisementList, AdvertisementQuery, DEFAULT_POSITION,
    },
    entity::advertisements::{ActiveModel as AdActive, Column as AdCol, Entity as Advertisements},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Advertisement,
    response::{ApiResponse, Meta},
    services::or_empty,
    state::AppState,
};

/// Ads to show on the storefront today.
pub async fn list_active_advertisements(
    state: &AppState,
    query: AdvertisementQuery,
) -> ApiResponse<AdvertisementList> {
    let mut finder = Advertisements::find().filter(AdCol::IsActive.eq(true));
    if let Some(position) = query.position.as_ref().filter(|p| !p.trim().is_empty()) {
        finder = finder.filter(AdCol::Position.eq(position.trim()));
    }

    let found = finder
        .order_by_desc(AdCol::CreatedAt)
        .all(&state.orm)
        .await
        .map_err(AppError::from);

    let today = Utc::now().date_naive();
    let items: Vec<Advertisement> = or_empty(found, "advertisements")
        .into_iter()
        .map(Advertisement::from)
        .filter(|ad| ad.is_live_on(today))
        .collect();

    ApiResponse::success("Advertisements", AdvertisementList { items }, None)
}

pub async fn list_advertisements(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdvertisementList>> {
    ensure_admin(state, user).await?;
    let items: Vec<Advertisement> = Advertisements::find()
        .order_by_desc(AdCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Advertisement::from)
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Advertisements",
        AdvertisementList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn create_advertisement(
    state: &AppState,
    user: &AuthUser,
    form: AdvertisementForm,
) -> AppResult<ApiResponse<Advertisement>> {
    ensure_admin(state, user).await?;
    let form = form.validate()?;

    let ad = AdActive {
        id: Set(Uuid::new_v4()),
        title: Set(form.title),
        description: Set(form.description),
        image_url: Set(form.image_url),
        link_url: Set(form.link_url),
        is_active: Set(form.is_active),
        position: Set(form.position.unwrap_or_else(|| DEFAULT_POSITION.to_string())),
        start_date: Set(form.start_date),
        end_date: Set(form.end_date),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "advertisement_create",
        "advertisements",
        serde_json::json!({ "advertisement_id": ad.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Advertisement created",
        Advertisement::from(ad),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_advertisement(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Advertisement>> {
    ensure_admin(state, user).await?;

    let existing = Advertisements::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Advertisement"))?;

    let is_active = !existing.is_active;
    let mut active: AdActive = existing.into();
    active.is_active = Set(is_active);
    let ad = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "advertisement_toggle",
        "advertisements",
        serde_json::json!({ "advertisement_id": ad.id, "is_active": ad.is_active }),
    )
    .await;

    Ok(ApiResponse::success(
        "Advertisement updated",
        Advertisement::from(ad),
        Some(Meta::empty()),
    ))
}
