use axum::Router;
use domain_users::{AuthService, PostgresUserRepository, UserService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = PostgresUserRepository::new(state.db.clone());
    handlers::router(
        UserService::new(repository.clone()),
        AuthService::new(repository, state.jwt.clone()),
    )
}
