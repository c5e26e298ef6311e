use crate::error::{UserError, UserResult};
use crate::models::{
    ChangePassword, CreateUser, MAX_PER_PAGE, NewUser, Role, UpdateUser, UserChanges,
    UserResponse,
};
use crate::password::hash_password;
use crate::repository::UserRepository;

/// User account management on top of a [`UserRepository`].
///
/// Input is expected to be validated already (the handlers use
/// `ValidatedJson`); the service only enforces store-level rules.
pub struct UserService<R: UserRepository> {
    repository: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn create(&self, input: CreateUser) -> UserResult<UserResponse> {
        let user = NewUser {
            username: input.username,
            password_hash: hash_password(&input.password)?,
            role: input.role,
        };

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    pub async fn find_by_id(&self, id: i32) -> UserResult<UserResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(id))
    }

    /// One page of users plus the total number of active users.
    pub async fn find_all_paginated(
        &self,
        limit: u64,
        offset: u64,
    ) -> UserResult<(Vec<UserResponse>, u64)> {
        if limit == 0 || limit > MAX_PER_PAGE {
            return Err(UserError::Validation(format!(
                "Page size must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }

        let users = self.repository.find_all_paginated(limit, offset).await?;
        let total = self.repository.count().await?;

        Ok((users.into_iter().map(UserResponse::from).collect(), total))
    }

    pub async fn update(&self, id: i32, input: UpdateUser) -> UserResult<UserResponse> {
        let changes = UserChanges {
            username: input.username,
            role: input.role,
        };

        self.repository
            .update(id, changes)
            .await?
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(id))
    }

    /// Overwrite the password of an active user.
    ///
    /// `old_password` has to be present in the request but is not compared
    /// with the stored hash; callers reach this only through the self guard.
    pub async fn change_password(&self, id: i32, input: ChangePassword) -> UserResult<()> {
        let password_hash = hash_password(&input.password)?;

        if self.repository.change_password(id, password_hash).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }

    pub async fn delete(&self, id: i32) -> UserResult<()> {
        if self.repository.soft_delete(id).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }

    /// Create the configured super-admin unless that username already exists.
    ///
    /// Returns `true` when a user was created. An existing user is left
    /// untouched, whatever its role.
    pub async fn ensure_super_admin(&self, username: &str, password: &str) -> UserResult<bool> {
        if self.repository.find_by_username(username).await?.is_some() {
            tracing::info!(username, "Super-admin account already present");
            return Ok(false);
        }

        let user = NewUser {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role: Role::SUPER_ADMIN,
        };

        match self.repository.create(user).await {
            Ok(created) => {
                tracing::info!(user_id = created.id, username, "Created super-admin account");
                Ok(true)
            }
            // A soft-deleted row still holds the name
            Err(UserError::DuplicateUsername(_)) => {
                tracing::warn!(username, "Super-admin username is reserved by a deleted user");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
