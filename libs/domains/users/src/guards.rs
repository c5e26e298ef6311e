//! Request-pipeline access control.
//!
//! [`authenticate`] runs first on every protected route and stores the
//! caller's [`SessionIdentity`] in the request extensions. The `require_*`
//! middleware then apply one [`Guard`] each. Any refusal ends the request
//! with 401.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_helpers::{IdPath, bearer_token};
use std::sync::Arc;

use crate::auth::AuthService;
use crate::error::{UserError, UserResult};
use crate::models::SessionIdentity;
use crate::repository::UserRepository;

/// Authorization rule for a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Caller has the admin role (1)
    Admin,
    /// Caller has the super-admin role (3)
    SuperAdmin,
    /// Caller is the user named by the `{id}` path segment
    Owner,
    /// Either of the two above
    SuperAdminOrOwner,
}

impl Guard {
    /// Decide whether `identity` may proceed. `target` is the path id for
    /// routes that have one.
    pub fn check(self, identity: &SessionIdentity, target: Option<i32>) -> bool {
        let is_owner = target == Some(identity.id);
        match self {
            Guard::Admin => identity.role.is_admin(),
            Guard::SuperAdmin => identity.role.is_super_admin(),
            Guard::Owner => is_owner,
            Guard::SuperAdminOrOwner => identity.role.is_super_admin() || is_owner,
        }
    }

    fn enforce(self, request: &Request, target: Option<i32>) -> UserResult<()> {
        let Some(identity) = request.extensions().get::<SessionIdentity>() else {
            tracing::warn!(guard = ?self, "Guard ran without an authenticated identity");
            return Err(UserError::Unauthorized);
        };

        if self.check(identity, target) {
            Ok(())
        } else {
            tracing::debug!(guard = ?self, user_id = identity.id, ?target, "Access denied");
            Err(UserError::Unauthorized)
        }
    }
}

/// Require a valid `Authorization: Bearer <token>` for an active user.
pub async fn authenticate<R: UserRepository + 'static>(
    State(auth): State<Arc<AuthService<R>>>,
    mut request: Request,
    next: Next,
) -> UserResult<Response> {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        tracing::debug!("Missing or malformed bearer token");
        return Err(UserError::Unauthorized);
    };

    let identity = auth.authenticate(&token).await?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> UserResult<Response> {
    Guard::Admin.enforce(&request, None)?;
    Ok(next.run(request).await)
}

pub async fn require_super_admin(request: Request, next: Next) -> UserResult<Response> {
    Guard::SuperAdmin.enforce(&request, None)?;
    Ok(next.run(request).await)
}

/// A non-numeric `{id}` is rejected with 400 before the check.
pub async fn require_self(IdPath(id): IdPath, request: Request, next: Next) -> UserResult<Response> {
    Guard::Owner.enforce(&request, Some(id))?;
    Ok(next.run(request).await)
}

pub async fn require_super_admin_or_self(
    IdPath(id): IdPath,
    request: Request,
    next: Next,
) -> UserResult<Response> {
    Guard::SuperAdminOrOwner.enforce(&request, Some(id))?;
    Ok(next.run(request).await)
}
