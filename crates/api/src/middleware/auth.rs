//! # Authentication Module
//!
//! Bearer-token identity for the ParkSlot API plus password hashing for
//! seeded accounts.
//!
//! Tokens are minted by the identity provider and signed with HS256 using
//! the shared `JWT_SECRET`. This module only verifies them.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher,
};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use eyre::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use parkslot_core::{
    access::{self, Identity},
    errors::ParkError,
    models::user::Role,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Hashes a password using the Argon2 algorithm
///
/// Generates a fresh random salt and returns the hash in PHC string format.
///
/// # Example
///
/// ```rust
/// use parkslot_api::middleware::auth::hash_password;
///
/// let hashed = hash_password("admin_password").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// JWT payload issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Verifies HS256 bearer tokens against one shared secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decodes `token`, checking the signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, ParkError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected bearer token");
                ParkError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ParkError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ParkError::Unauthorized("Missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ParkError::Unauthorized("Invalid Authorization header format".to_string()))
}

/// Any caller holding a valid token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub identity: Identity,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.jwt.verify(token)?;

        Ok(AuthUser {
            identity: Identity::new(claims.id, claims.role),
            email: claims.email,
        })
    }
}

/// A caller whose token carries the ADMIN role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdminUser(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        access::require_role(&user.identity, Role::Admin)?;
        Ok(AdminUser(user.identity))
    }
}
