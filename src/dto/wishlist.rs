use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddToWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistItemDto {
    pub id: Uuid,
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct WishlistList {
    #[schema(value_type = Vec<WishlistItemDto>)]
    pub items: Vec<WishlistItemDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistMutation {
    pub product_id: Uuid,
    pub in_wishlist: bool,
    pub wishlist_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistIds {
    pub product_ids: Vec<Uuid>,
}
