//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs minted by the identity provider that shares
//! `JWT_SECRET` with this service. Handlers take an `AuthUser` argument to
//! require authentication.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner-or-admin rule shared by every per-resume endpoint.
    pub fn can_access(&self, owner: Uuid) -> bool {
        self.id == owner || self.is_admin()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: usize,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected Bearer token".into()))?;

        verify_token(token, &state.config.jwt_secret)
    }
}

pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|err| AppError::Unauthorized(format!("invalid token: {err}")))?;

    let id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| AppError::Unauthorized("token subject is not a user id".into()))?;

    Ok(AuthUser {
        id,
        role: Role::from_claim(data.claims.role.as_deref()),
    })
}

/// GET /api/auth/me
pub async fn handle_me(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}

#[cfg(test)]
pub fn issue_test_token(user_id: Uuid, role: Option<&str>, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.map(String::from),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
