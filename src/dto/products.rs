use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::{error::AppError, models::Product};

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Form fields arrive as text from the back-office form and as numbers from API clients.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}

/// Product fields as submitted by the inventory form; price and stock are coerced later.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub price: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub stock_quantity: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A form that passed coercion and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub is_active: bool,
}

impl TryFrom<ProductForm> for ProductInput {
    type Error = AppError;

    fn try_from(form: ProductForm) -> Result<Self, Self::Error> {
        let name = form.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Product name is required".into()));
        }

        Ok(Self {
            name,
            description: normalize_optional(form.description),
            price: parse_price(&form.price)?,
            image_url: normalize_optional(form.image_url),
            stock_quantity: parse_stock(&form.stock_quantity)?,
            category: normalize_optional(form.category),
            is_active: form.is_active,
        })
    }
}

/// Empty and whitespace-only values are stored as NULL.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_price(raw: &str) -> Result<Decimal, AppError> {
    let price = Decimal::from_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid price `{raw}`")))?;
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }
    Ok(price.round_dp(2))
}

pub fn parse_stock(raw: &str) -> Result<i32, AppError> {
    let stock = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("Invalid stock quantity `{raw}`")))?;
    if stock < 0 {
        return Err(AppError::BadRequest("Stock quantity cannot be negative".into()));
    }
    Ok(stock)
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    pub items: Vec<String>,
}

/// Response of a product write.
#[derive(Serialize, ToSchema)]
pub struct ProductSaved {
    pub product: Product,
}
