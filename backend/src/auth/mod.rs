use std::sync::Arc;

use application::errors::codes;
use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::axum_http::error_responses::ErrorResponse;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Option<String>,
}

/// HS256 verification key, installed once as a request extension by the router.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                code: codes::PERMISSION_DENIED,
                message: format!("Unauthorized: {}", self.0),
            }),
        )
            .into_response()
    }
}

pub fn validate_jwt(token: &str, keys: &JwtKeys) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_aud = false;

    let token_data = decode::<Claims>(token, &keys.decoding, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

pub fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(auth_header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| anyhow::anyhow!("Invalid Authorization header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| anyhow::anyhow!("Invalid Authorization header format").into())
}

impl AuthUser {
    pub fn from_token(token: &str, keys: &JwtKeys) -> Result<Self, AuthError> {
        let claims = validate_jwt(token, keys)?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| anyhow::anyhow!("Invalid user ID in token"))?;

        Ok(AuthUser {
            user_id,
            role: claims.role,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| anyhow::anyhow!("Missing Authorization header"))?;

        let keys = parts
            .extensions
            .get::<Arc<JwtKeys>>()
            .ok_or_else(|| anyhow::anyhow!("JWT verification is not configured"))?;

        AuthUser::from_token(token, keys)
    }
}
