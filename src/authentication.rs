use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::HeaderMap;
use actix_web::middleware::Next;
use actix_web::web;
use rand::{Rng, distr::Alphanumeric};
use secrecy::{ExposeSecret, SecretString};

use crate::configuration::AdminSettings;
use crate::routes::ApiError;

pub const TOKEN_PREFIX: &str = "letterbox-admin-";
const TOKEN_SUFFIX_LEN: usize = 32;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing or malformed bearer token")]
    InvalidToken,
}

/// Minimal admin guard: exact-equality credential check mints an ephemeral
/// prefixed token; validation is a shape check only. No expiry, no stored
/// session state. The `Authorization: Bearer` contract stays stable if a
/// signed token ever replaces this scheme.
pub struct AdminGuard {
    email: String,
    password: SecretString,
}

impl AdminGuard {
    pub fn new(settings: &AdminSettings) -> Self {
        Self {
            email: settings.email.clone(),
            password: settings.password.clone(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if email != self.email || password != self.password.expose_secret() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(mint_token())
    }

    pub fn validate_bearer(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let header_value = headers
            .get("Authorization")
            .ok_or(AuthError::InvalidToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let suffix = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or(AuthError::InvalidToken)?;
        if suffix.len() != TOKEN_SUFFIX_LEN || !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AuthError::InvalidToken);
        }

        Ok(())
    }
}

fn mint_token() -> String {
    let mut rng = rand::rng();
    let suffix: String = std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(TOKEN_SUFFIX_LEN)
        .collect();
    format!("{TOKEN_PREFIX}{suffix}")
}

pub async fn reject_anonymous_users(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let Some(guard) = req.app_data::<web::Data<AdminGuard>>() else {
        return Err(
            ApiError::Unexpected(anyhow::anyhow!("admin guard is not configured")).into(),
        );
    };
    guard.validate_bearer(req.headers()).map_err(ApiError::from)?;

    next.call(req).await
}
