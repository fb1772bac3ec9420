use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::services::auth::classify::NO_TOKEN_ERROR;

/// Decoded token payload, as it came out of the signature check.
///
/// Only `claims::Identity` extraction should look inside this map.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Access tokens are signed with a shared secret using this algorithm only.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Result of validating the located credential for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenOutcome {
    Valid { claims: Claims },
    Missing,
    Invalid { reason: String },
}

impl TokenOutcome {
    /// The error string recorded for this outcome (empty when valid).
    pub fn error_text(&self) -> &str {
        match self {
            Self::Valid { .. } => "",
            Self::Missing => NO_TOKEN_ERROR,
            Self::Invalid { reason } => reason,
        }
    }
}

/// HMAC access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenValidator {
    pub fn new(secret: &str, leeway_seconds: u64) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = vec![SIGNING_ALGORITHM];
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify signature + expiry of `token`.
    ///
    /// An empty token is `Missing`; every other failure is `Invalid` carrying the
    /// library's error text.
    pub fn validate(&self, token: &str) -> TokenOutcome {
        if token.is_empty() {
            return TokenOutcome::Missing;
        }

        // Key function: refuse anything not signed with the configured algorithm
        // before the key is ever used.
        let header = match jsonwebtoken::decode_header(token) {
            Ok(header) => header,
            Err(err) => return invalid(err.to_string()),
        };
        if header.alg != SIGNING_ALGORITHM {
            return invalid(format!("unexpected signing method: {:?}", header.alg));
        }

        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => TokenOutcome::Valid {
                claims: data.claims,
            },
            Err(err) => invalid(err.to_string()),
        }
    }
}

fn invalid(reason: String) -> TokenOutcome {
    let reason = if reason.is_empty() {
        "invalid token".to_string()
    } else {
        reason
    };
    TokenOutcome::Invalid { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test_secret_key";

    fn sign(alg: Algorithm, secret: &str, claims: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn fresh_claims() -> serde_json::Value {
        let now = chrono::Utc::now().timestamp();
        json!({ "sub": "u1", "roles": ["admin"], "iat": now, "exp": now + 3600 })
    }

    #[test]
    fn valid_token_yields_claims() {
        let validator = TokenValidator::new(SECRET, 0);
        let token = sign(Algorithm::HS256, SECRET, fresh_claims());

        match validator.validate(&token) {
            TokenOutcome::Valid { claims } => {
                assert_eq!(claims.get("sub"), Some(&json!("u1")));
                assert_eq!(claims.get("roles"), Some(&json!(["admin"])));
            }
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn empty_token_is_missing() {
        let validator = TokenValidator::new(SECRET, 0);
        assert_eq!(validator.validate(""), TokenOutcome::Missing);
        assert_eq!(TokenOutcome::Missing.error_text(), NO_TOKEN_ERROR);
    }

    #[test]
    fn garbage_token_is_invalid() {
        let validator = TokenValidator::new(SECRET, 0);
        let outcome = validator.validate("garbage.token.value");
        assert!(matches!(outcome, TokenOutcome::Invalid { .. }));
        assert!(!outcome.error_text().is_empty());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let validator = TokenValidator::new(SECRET, 0);
        let token = sign(Algorithm::HS256, "another_secret", fresh_claims());
        assert!(matches!(
            validator.validate(&token),
            TokenOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn expired_token_is_invalid() {
        let validator = TokenValidator::new(SECRET, 0);
        let now = chrono::Utc::now().timestamp();
        let token = sign(
            Algorithm::HS256,
            SECRET,
            json!({ "sub": "u1", "iat": now - 7200, "exp": now - 3600 }),
        );
        assert!(matches!(
            validator.validate(&token),
            TokenOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn token_without_exp_is_invalid() {
        let validator = TokenValidator::new(SECRET, 0);
        let token = sign(Algorithm::HS256, SECRET, json!({ "sub": "u1" }));
        assert!(matches!(
            validator.validate(&token),
            TokenOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn other_hmac_algorithm_is_rejected_even_with_right_secret() {
        let validator = TokenValidator::new(SECRET, 0);
        let token = sign(Algorithm::HS512, SECRET, fresh_claims());

        match validator.validate(&token) {
            TokenOutcome::Invalid { reason } => {
                assert!(reason.contains("unexpected signing method"), "{reason}");
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }
}
