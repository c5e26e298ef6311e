use super::config::JwtConfig;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Lifetime of an access token in seconds (8 hours). Not configurable.
pub const ACCESS_TOKEN_TTL: i64 = 8 * 60 * 60;

/// Human-readable form of [`ACCESS_TOKEN_TTL`] returned to clients.
pub const ACCESS_TOKEN_TTL_LABEL: &str = "8h";

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // Subject (user ID)
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time
}

/// Stateless HS256 token issuer and validator.
///
/// Tokens are not persisted anywhere: a token is valid as long as its
/// signature checks out and `exp` has not passed. There is no leeway on
/// expiry.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        tracing::info!("JWT auth initialized");
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Issue an access token for `subject`, valid for [`ACCESS_TOKEN_TTL`].
    pub fn create_access_token(&self, subject: &str) -> eyre::Result<String> {
        self.create_token(subject, Utc::now(), ACCESS_TOKEN_TTL)
    }

    fn create_token(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let claims = JwtClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(ttl_seconds)).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify the token signature and expiry and return its claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}
