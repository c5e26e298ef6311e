//! Bearer-token authentication primitives.
//!
//! - [`JwtConfig`]: signing secret loaded from `JWT_SECRET`
//! - [`JwtAuth`]: HS256 token issuer/validator with a fixed 8 hour lifetime
//! - [`bearer_token`]: pulls the token out of the `Authorization` header
//!
//! Resolving a token to a user is left to the domain, which knows how to
//! look users up.

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{ACCESS_TOKEN_TTL, ACCESS_TOKEN_TTL_LABEL, JwtAuth, JwtClaims};
pub use middleware::bearer_token;
