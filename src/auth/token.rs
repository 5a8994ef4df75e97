use crate::error::{AppError, MemberErrorCode};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the member's username.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Longest token lifetime accepted; `TokenService::new` clamps to `1..=MAX_LIFETIME_HOURS`.
pub const MAX_LIFETIME_HOURS: i64 = 24 * 365;

/// Issues and verifies HS256 bearer tokens.
///
/// Keys are derived once from the configured secret, so the service can be cloned
/// into every worker's application state.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: chrono::Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: chrono::Duration::hours(lifetime_hours.clamp(1, MAX_LIFETIME_HOURS)),
        }
    }

    /// Generates a signed token for `username`.
    ///
    /// # Returns
    /// The encoded JWT. Fails with `AppError::InternalServerError` if the expiry
    /// overflows or encoding fails.
    pub fn generate(&self, username: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of `token` and returns its claims.
    ///
    /// Any failure, whether malformed input, a bad signature or an expired token, is
    /// reported as `MemberErrorCode::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        if data.claims.sub.is_empty() {
            return Err(MemberErrorCode::InvalidToken.into());
        }
        Ok(data.claims)
    }
}
