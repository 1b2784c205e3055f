use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    models::Profile,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// The caller's identity when present; anonymous requests are not rejected.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<AuthUser>);

impl Viewer {
    pub fn anonymous() -> Self {
        Viewer(None)
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }

    pub fn require(&self, message: &str) -> AppResult<&AuthUser> {
        self.user().ok_or_else(|| AppError::login_required(message))
    }
}

/// An authenticated caller whose profile is marked admin.
///
/// Handlers list it before any body extractor so non-admin callers are refused
/// whatever payload they send.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: AuthUser,
    pub profile: Profile,
}

impl From<AuthUser> for Viewer {
    fn from(user: AuthUser) -> Self {
        Viewer(Some(user))
    }
}

/// Look the caller's profile up on every call; the token never carries the role.
pub async fn ensure_admin(state: &AppState, user: &AuthUser) -> AppResult<Profile> {
    let profile: Option<Profile> = sqlx::query_as(
        "SELECT id, email, full_name, role, is_admin, created_at FROM profiles WHERE id = $1",
    )
    .bind(user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    match profile {
        Some(profile) if profile.is_admin() => Ok(profile),
        _ => {
            tracing::warn!(user_id = %user.user_id, "admin check failed");
            Err(AppError::Forbidden)
        }
    }
}

fn bearer_token(parts: &Parts) -> AppResult<&str> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::login_required("Please login to continue"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::login_required("Invalid Authorization header"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::login_required("Invalid Authorization scheme"))?;
    Ok(token.trim())
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::login_required("Session expired, please login again"))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::login_required("Invalid user id in token"))?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        decode_token(token, &state.config.jwt_secret)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(parts)
            .and_then(|token| decode_token(token, &state.config.jwt_secret))
            .ok();
        Ok(Viewer(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let profile = ensure_admin(state, &user).await?;
        Ok(AdminUser { user, profile })
    }
}
