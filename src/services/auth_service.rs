use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{Claims, LoginRequest, LoginResponse, MIN_PASSWORD_LEN, MeResponse, RegisterRequest},
    dto::products::normalize_optional,
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::AuthUser,
    models::{CUSTOMER_ROLE, Profile, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn issue_token(config: &AppConfig, user_id: Uuid, email: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }
    Ok(email)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Profile>> {
    let email = normalize_email(&payload.email)?;
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user_id = Uuid::new_v4();

    let mut tx = state.pool.begin().await?;
    sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(email.as_str())
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::BadRequest("Email is already taken".to_string())
            } else {
                AppError::DbError(err)
            }
        })?;

    let profile: Profile = sqlx::query_as(
        r#"
        INSERT INTO profiles (id, email, full_name, role, is_admin)
        VALUES ($1, $2, $3, $4, FALSE)
        RETURNING id, email, full_name, role, is_admin, created_at
        "#,
    )
    .bind(user_id)
    .bind(email.as_str())
    .bind(normalize_optional(payload.full_name))
    .bind(CUSTOMER_ROLE)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = %user_id, "user registered");
    audit::record(
        &state.pool,
        user_id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::success("User created", profile, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = payload.email.trim().to_lowercase();
    let user: Option<User> = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(email.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(&state.config, user.id, &user.email)?;
    let resp = LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt_ttl_hours * 3600,
    };

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<MeResponse>> {
    let profile: Option<Profile> = sqlx::query_as(
        "SELECT id, email, full_name, role, is_admin, created_at FROM profiles WHERE id = $1",
    )
    .bind(user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    let profile = profile.ok_or_else(|| AppError::not_found("Profile"))?;
    let is_admin = profile.is_admin();
    Ok(ApiResponse::success(
        "Current user",
        MeResponse { profile, is_admin },
        Some(Meta::empty()),
    ))
}
