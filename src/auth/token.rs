use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Bearer token payload: the identity carried on the wire for every
/// protected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies signed bearer tokens with a fixed expiry window.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, id: Uuid, username: &str, role: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// A token that fails signature or expiry checks yields `Forbidden`; the
    /// caller decides whether that is fatal (required mode) or not (optional
    /// mode).
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Forbidden("Invalid or expired token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrip() {
        let signer = TokenSigner::new("test-secret", 3600);
        let id = Uuid::new_v4();
        let token = signer.issue(id, "alice", "user").expect("issue should succeed");

        let claims = signer.verify(&token).expect("verify should succeed");
        assert_eq!(claims.id, id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = TokenSigner::new("test-secret", 3600);
        let other = TokenSigner::new("other-secret", 3600);
        let token = signer
            .issue(Uuid::new_v4(), "alice", "user")
            .expect("issue should succeed");

        assert!(matches!(other.verify(&token), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        // jsonwebtoken applies a default 60s leeway; make the token stale
        // well past it.
        let signer = TokenSigner::new("test-secret", -120);
        let token = signer
            .issue(Uuid::new_v4(), "alice", "user")
            .expect("issue should succeed");

        assert!(matches!(signer.verify(&token), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", 3600);
        assert!(matches!(
            signer.verify("not.a.token"),
            Err(AppError::Forbidden(_))
        ));
    }
}
