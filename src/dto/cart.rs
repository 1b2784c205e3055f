use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CartLine, Product};

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItemDto>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
}

impl CartList {
    pub fn new(items: Vec<CartItemDto>) -> Self {
        let subtotal = items.iter().map(|item| item.line_total).sum();
        Self { items, subtotal }
    }
}

/// Result of a cart write; `item` is `None` when the line was removed.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartMutation {
    pub item: Option<CartLine>,
    pub cart_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BadgeCounts {
    pub cart_count: i64,
    pub wishlist_count: i64,
}
