//! Opaque signed token over a user identifier, with optional expiry.

use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::SignError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The signed payload — stringified user id.
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Signs and verifies an opaque payload string using symmetric HMAC.
pub struct Signer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Option<Duration>,
}

impl Signer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::default();
        validation.required_spec_claims.clear();
        validation.leeway = 0;
        Signer {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Signs `payload` and returns the opaque token.
    pub fn sign(&self, payload: &str) -> Result<String, SignError> {
        let exp = self
            .ttl
            .map(|ttl| (chrono::Utc::now() + chrono::Duration::from_std(ttl).unwrap()).timestamp());
        let claims = Claims { payload: payload.to_string(), exp };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Parses `token` and returns the signed payload.
    pub fn parse(&self, token: &str) -> Result<String, SignError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.payload),
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(SignError::TokenExpired),
                _ => Err(SignError::Other(err)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_without_ttl() {
        let signer = Signer::new(b"test-secret");
        let token = signer.sign("user-1").unwrap();
        assert_eq!(signer.parse(&token).unwrap(), "user-1");
    }

    #[test]
    fn roundtrip_with_ttl() {
        let signer = Signer::new(b"test-secret").with_ttl(Duration::from_secs(3600));
        let token = signer.sign("user-2").unwrap();
        assert_eq!(signer.parse(&token).unwrap(), "user-2");
    }

    #[test]
    fn expired_token_is_distinguished() {
        let signer = Signer::new(b"test-secret");

        let claims = Claims {
            payload: "user-3".to_string(),
            exp: Some((chrono::Utc::now() - chrono::Duration::seconds(1)).timestamp()),
        };
        let token = encode(&Header::default(), &claims, &signer.encoding_key).unwrap();

        let err = signer.parse(&token).unwrap_err();
        assert!(matches!(err, SignError::TokenExpired));
    }
}
