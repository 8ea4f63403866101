//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::ApiError,
    state::{AppState, Backend},
};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Token verification material, loaded once at startup
#[derive(Clone)]
pub struct AuthConfig {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthConfig {
    /// Build from an RS256 public key in PEM form
    pub fn from_rsa_pem(pem: &str) -> Result<Self, String> {
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| format!("Invalid JWT public key: {}", e))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Read `JWT_PUBLIC_KEY`, either PEM text or a path to a PEM file
    pub fn from_env() -> Result<Self, String> {
        let public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| "JWT_PUBLIC_KEY environment variable not set".to_string())?;

        let public_key = if public_key.trim_start().starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .map_err(|e| format!("Failed to read public key file {}: {}", public_key, e))?
                .trim()
                .to_string()
        };

        Self::from_rsa_pem(&public_key)
    }

    /// Validate a bearer token and return the caller it names
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, ApiError> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Rejected bearer token: {}", e);
                ApiError::Unauthenticated
            })?;

        Ok(AuthUser {
            id: token_data.claims.sub,
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
fn bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthenticated)
}

/// Authentication middleware
pub async fn auth_middleware<B: Backend>(
    State(state): State<AppState<B>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let token = bearer_token(header)?;
    let user = state.auth.authenticate(token)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
