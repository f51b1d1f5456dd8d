use actix_web::HttpRequest;
use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Caller identity
    pub exp: usize,  // Expiration timestamp
}

pub fn generate_token(subject: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (chrono::Utc::now() + chrono::Duration::days(7)).timestamp() as usize;

    let claims = Claims {
        sub: subject.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Resolves the bearer token of a write request. Reads never call this.
pub fn require_writer(req: &HttpRequest, secret: &str) -> Result<Claims, AppError> {
    let token = req.headers().get("Authorization")
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| {
            log::warn!("Rejected {} {}: missing bearer token", req.method(), req.path());
            AppError::Forbidden("Authentication credentials were not provided".to_string())
        })?;

    validate_token(token, secret).map_err(|err| {
        log::warn!("Rejected {} {}: {}", req.method(), req.path(), err);
        AppError::Forbidden("Invalid token".to_string())
    })
}
