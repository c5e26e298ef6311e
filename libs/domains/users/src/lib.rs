//! Users Domain
//!
//! User accounts with soft delete, password login and bearer-token guards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, guard wiring
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← UserService (CRUD), AuthService (login, token → identity)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and PostgreSQL implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, role codes
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{AuthService, InMemoryUserRepository, UserService, handlers};
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-characters").unwrap());
//! let repository = InMemoryUserRepository::new();
//!
//! let router = handlers::router(
//!     UserService::new(repository.clone()),
//!     AuthService::new(repository, jwt),
//! );
//! ```

pub mod auth;
pub mod error;
pub mod guards;
pub mod handlers;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::AuthService;
pub use error::{UserError, UserResult};
pub use guards::Guard;
pub use models::{
    ChangePassword, CreateUser, LoginRequest, LoginResponse, PageQuery, Role, SessionIdentity,
    UpdateUser, User, UserResponse,
};
pub use postgres::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
