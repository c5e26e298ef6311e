//! Login and token-to-identity resolution.

use axum_helpers::{ACCESS_TOKEN_TTL_LABEL, JwtAuth};

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, LoginResponse, SessionIdentity};
use crate::password::verify_password;
use crate::repository::UserRepository;

pub struct AuthService<R: UserRepository> {
    repository: R,
    jwt: JwtAuth,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repository: R, jwt: JwtAuth) -> Self {
        Self { repository, jwt }
    }

    /// Exchange a username and password for an access token.
    ///
    /// An unknown username and a wrong password both yield
    /// [`UserError::Unauthorized`].
    pub async fn login(&self, input: LoginRequest) -> UserResult<LoginResponse> {
        let Some(user) = self.repository.find_by_username(&input.username).await? else {
            tracing::debug!(username = %input.username, "Login for unknown user");
            return Err(UserError::Unauthorized);
        };

        if !verify_password(&input.password, &user.password_hash) {
            tracing::debug!(user_id = user.id, "Login with wrong password");
            return Err(UserError::Unauthorized);
        }

        let token = self
            .jwt
            .create_access_token(&user.id.to_string())
            .map_err(|e| UserError::Token(e.to_string()))?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expired_time: ACCESS_TOKEN_TTL_LABEL.to_string(),
        })
    }

    /// Resolve a presented token to the active user it names.
    pub async fn authenticate(&self, token: &str) -> UserResult<SessionIdentity> {
        let claims = self.jwt.verify_token(token).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            UserError::Unauthorized
        })?;

        let id: i32 = claims.sub.parse().map_err(|_| {
            tracing::debug!(sub = %claims.sub, "Token subject is not a user id");
            UserError::Unauthorized
        })?;

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::Unauthorized)?;

        Ok(SessionIdentity::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};
    use crate::password::hash_password;
    use crate::repository::InMemoryUserRepository;
    use axum_helpers::{ACCESS_TOKEN_TTL, JwtConfig};
    use chrono::Utc;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(SECRET).unwrap())
    }

    async fn setup() -> (InMemoryUserRepository, AuthService<InMemoryUserRepository>, i32) {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(NewUser {
                username: "alice1".into(),
                password_hash: hash_password("Passw0rd").unwrap(),
                role: Role::USER,
            })
            .await
            .unwrap();
        let service = AuthService::new(repo.clone(), jwt());
        (repo, service, user.id)
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user() {
        let (_, service, user_id) = setup().await;
        let now = Utc::now().timestamp();

        let response = service.login(login("alice1", "Passw0rd")).await.unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expired_time, "8h");

        let claims = jwt().verify_token(&response.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert!((claims.exp - (now + ACCESS_TOKEN_TTL)).abs() <= 5);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let (_, service, _) = setup().await;

        let unknown = service.login(login("mallory1", "Passw0rd")).await.unwrap_err();
        let wrong = service.login(login("alice1", "Wr0ngPass")).await.unwrap_err();

        assert!(matches!(unknown, UserError::Unauthorized));
        assert!(matches!(wrong, UserError::Unauthorized));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_deleted_user_cannot_log_in() {
        let (repo, service, user_id) = setup().await;
        repo.soft_delete(user_id).await.unwrap();

        let result = service.login(login("alice1", "Passw0rd")).await;
        assert!(matches!(result, Err(UserError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_resolves_identity() {
        let (_, service, user_id) = setup().await;
        let token = service.login(login("alice1", "Passw0rd")).await.unwrap().token;

        let identity = service.authenticate(&token).await.unwrap();
        assert_eq!(
            identity,
            SessionIdentity {
                id: user_id,
                username: "alice1".into(),
                role: Role::USER,
            }
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_token_of_deleted_user() {
        let (repo, service, user_id) = setup().await;
        let token = service.login(login("alice1", "Passw0rd")).await.unwrap().token;
        repo.soft_delete(user_id).await.unwrap();

        let result = service.authenticate(&token).await;
        assert!(matches!(result, Err(UserError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_tokens() {
        let (_, service, _) = setup().await;

        assert!(matches!(
            service.authenticate("garbage").await,
            Err(UserError::Unauthorized)
        ));

        let not_an_id = jwt().create_access_token("alice1").unwrap();
        assert!(matches!(
            service.authenticate(&not_an_id).await,
            Err(UserError::Unauthorized)
        ));
    }
}
