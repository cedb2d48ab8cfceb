use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use thiserror::Error;
use uuid::Uuid;

use crate::models::users::Role;

/// Durée de validité d'un token
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user_id
    pub role: Role,
    pub exp: i64,        // expiration timestamp
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to calculate expiration")]
    Expiration,

    #[error("Failed to generate token: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("Invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Génère un JWT token pour un utilisateur
pub fn generate_token(user_id: Uuid, role: Role, secret: &str) -> Result<String, TokenError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(TOKEN_VALIDITY_DAYS))
        .ok_or(TokenError::Expiration)?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(TokenError::Encode)
}

/// Vérifie la signature et l'expiration puis décode le token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_generate_and_verify_token() {
        let user_id = Uuid::new_v4();

        let token = generate_token(user_id, Role::Admin, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_token_valid_for_seven_days() {
        let token = generate_token(Uuid::new_v4(), Role::User, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        let remaining = claims.exp - Utc::now().timestamp();
        assert!(remaining > Duration::days(6).num_seconds());
        assert!(remaining <= Duration::days(7).num_seconds());
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token("invalid.token.here", SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_token(Uuid::new_v4(), Role::User, SECRET).unwrap();
        assert!(verify_token(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::User,
            exp: (Utc::now() - Duration::days(1)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }
}
