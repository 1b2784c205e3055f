use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::products::normalize_optional, error::AppError, models::Advertisement};

pub const DEFAULT_POSITION: &str = "banner";

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdvertisementForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl AdvertisementForm {
    pub fn validate(self) -> Result<AdvertisementForm, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Advertisement title is required".into()));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && end < start
        {
            return Err(AppError::BadRequest("end_date must not precede start_date".into()));
        }

        Ok(AdvertisementForm {
            title,
            description: normalize_optional(self.description),
            image_url: normalize_optional(self.image_url),
            link_url: normalize_optional(self.link_url),
            is_active: self.is_active,
            position: Some(
                normalize_optional(self.position).unwrap_or_else(|| DEFAULT_POSITION.to_string()),
            ),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvertisementQuery {
    pub position: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AdvertisementList {
    #[schema(value_type = Vec<Advertisement>)]
    pub items: Vec<Advertisement>,
}
