use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

const USERNAME_MESSAGE: &str = "Username must be 5-50 alphanumeric characters";
const PASSWORD_MESSAGE: &str =
    "Password must be 6-50 characters and contain a digit and an uppercase letter";

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit SQL OFFSET at any
/// page size.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PER_PAGE;

/// Stored role code.
///
/// Only 1 (admin) and 3 (super-admin) carry privileges; every other value is
/// a plain user and is kept as-is.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct Role(pub i16);

impl Role {
    pub const USER: Role = Role(0);
    pub const ADMIN: Role = Role(1);
    pub const SUPER_ADMIN: Role = Role(3);

    pub fn is_admin(self) -> bool {
        self == Self::ADMIN
    }

    pub fn is_super_admin(self) -> bool {
        self == Self::SUPER_ADMIN
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Role::ADMIN => write!(f, "admin"),
            Role::SUPER_ADMIN => write!(f, "super-admin"),
            Role(code) => write!(f, "user({})", code),
        }
    }
}

/// User entity - matches SQL schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Store-assigned identifier
    pub id: i32,
    /// Unique login name
    pub username: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete flag; deleted users are invisible to every lookup
    pub is_deleted: bool,
}

/// Row to insert. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Fields an update may change
#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub username: String,
    pub role: Role,
}

/// User response DTO (without password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The authenticated caller, rebuilt from the token and a fresh store lookup
/// on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionIdentity {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl From<&User> for SessionIdentity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[serde(default)]
    #[validate(
        length(min = 5, max = 50, message = "Username must be 5-50 alphanumeric characters"),
        custom(
            function = "validate_alphanumeric",
            message = "Username must be 5-50 alphanumeric characters"
        )
    )]
    pub username: String,
    #[serde(default)]
    #[validate(
        length(
            min = 6,
            max = 50,
            message = "Password must be 6-50 characters and contain a digit and an uppercase letter"
        ),
        custom(
            function = "validate_password_strength",
            message = "Password must be 6-50 characters and contain a digit and an uppercase letter"
        )
    )]
    pub password: String,
    /// Defaults to 0 (plain user)
    #[serde(default)]
    pub role: Role,
}

/// DTO for updating an existing user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[serde(default)]
    #[validate(
        length(min = 5, max = 50, message = "Username must be 5-50 alphanumeric characters"),
        custom(
            function = "validate_alphanumeric",
            message = "Username must be 5-50 alphanumeric characters"
        )
    )]
    pub username: String,
    /// Omitting the role resets it to 0
    #[serde(default)]
    pub role: Role,
}

/// DTO for changing a password
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    #[serde(default)]
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,
    #[serde(default)]
    #[validate(
        length(
            min = 6,
            max = 50,
            message = "Password must be 6-50 characters and contain a digit and an uppercase letter"
        ),
        custom(
            function = "validate_password_strength",
            message = "Password must be 6-50 characters and contain a digit and an uppercase letter"
        )
    )]
    pub password: String,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response with access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// Always `"Bearer"`
    pub token_type: String,
    /// Token lifetime, e.g. `"8h"`
    pub expired_time: String,
}

/// `?page=&per_page=` for listings.
///
/// Values arrive as raw strings so that a non-numeric value gets the same
/// message as an out-of-range one.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    #[validate(custom(function = "validate_page", message = "Invalid page query value"))]
    pub page: Option<String>,
    /// Items per page, 1-100 (default 10)
    #[validate(custom(function = "validate_per_page", message = "Invalid per_page query value"))]
    pub per_page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        parse_or(self.page.as_deref(), DEFAULT_PAGE)
    }

    pub fn per_page(&self) -> u64 {
        parse_or(self.per_page.as_deref(), DEFAULT_PER_PAGE)
    }

    pub fn offset(&self) -> u64 {
        self.page()
            .saturating_sub(1)
            .checked_mul(self.per_page())
            .unwrap_or(u64::MAX)
    }
}

fn parse_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn validate_alphanumeric(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphanumeric").with_message(USERNAME_MESSAGE.into()))
    }
}

fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());

    if has_digit && has_upper {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(PASSWORD_MESSAGE.into()))
    }
}

fn validate_page(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<u64>() {
        Ok(page) if (1..=MAX_PAGE).contains(&page) => Ok(()),
        _ => Err(ValidationError::new("page")),
    }
}

fn validate_per_page(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<u64>() {
        Ok(per_page) if (1..=MAX_PER_PAGE).contains(&per_page) => Ok(()),
        _ => Err(ValidationError::new("per_page")),
    }
}
