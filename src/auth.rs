//! Admin authentication: argon2 password hashes, HS256 bearer tokens, the
//! login endpoint, and the `require_admin` middleware guarding write routes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::admin::{Admin, AdminPublic, AdminRole, LoginRequest};
use crate::response;
use crate::state::AppState;
use crate::util::{generate_id, timestamp};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(admin: &Admin, secret: &str, expire_days: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: admin.admin_id.clone(),
        email: admin.email.clone(),
        role: ADMIN_ROLE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(expire_days)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub admin: AdminPublic,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;

    let email = body.email.to_lowercase();
    let admin = state
        .admins()
        .find_one(doc! {"email": &email})
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !admin.is_active {
        return Err(ApiError::Unauthorized("Admin account is inactive".to_string()));
    }
    if !verify_password(&body.password, &admin.password) {
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    }

    state
        .admins()
        .update_one(
            doc! {"email": &email},
            doc! {"$set": {"lastLogin": timestamp(&Utc::now())}},
        )
        .await?;

    let token = issue_token(
        &admin,
        &state.config.jwt_admin_secret,
        state.config.jwt_expire_days,
    )?;
    tracing::info!(admin = %admin.admin_id, "admin login");

    Ok(response::ok(
        "Login successful",
        LoginData { token, admin: AdminPublic::from(&admin) },
    ))
}

/// Bearer-token gate for admin routes; verified claims are stored in the
/// request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

    let claims = verify_token(token, &state.config.jwt_admin_secret)?;
    if claims.role != ADMIN_ROLE {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Create the initial admin account from the environment when the email is
/// not present yet. Idempotent across restarts.
pub async fn ensure_admin(state: &AppState) -> Result<(), ApiError> {
    let Some(seed) = &state.config.admin_seed else {
        return Ok(());
    };

    let email = seed.email.to_lowercase();
    if state.admins().find_one(doc! {"email": &email}).await?.is_some() {
        return Ok(());
    }

    let now = Utc::now();
    let admin = Admin {
        admin_id: generate_id("admin"),
        email: email.clone(),
        password: hash_password(&seed.password)?,
        name: seed.name.clone(),
        role: AdminRole::SuperAdmin,
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    };
    state.admins().insert_one(&admin).await?;
    tracing::info!(%email, "seeded initial admin account");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_admin() -> Admin {
        let now = Utc::now();
        Admin {
            admin_id: "admin_1_abcd1234".into(),
            email: "admin@example.com".into(),
            password: String::new(),
            name: "Admin User".into(),
            role: AdminRole::Admin,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn token_round_trip() {
        let token = issue_token(&sample_admin(), "secret", 7).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "admin_1_abcd1234");
        assert_eq!(claims.role, ADMIN_ROLE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&sample_admin(), "secret", 7).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(&sample_admin(), "secret", -1).unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("hunter2!").unwrap();
        assert_ne!(hash, "hunter2!");
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
        assert!(!verify_password("hunter2!", "not-a-hash"));
    }
}
