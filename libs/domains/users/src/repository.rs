use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User, UserChanges};

/// Repository trait for User persistence
///
/// Every read and write only sees active users: a soft-deleted row behaves
/// as if it did not exist, except that its username stays reserved.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A taken username yields `DuplicateUsername`.
    async fn create(&self, user: NewUser) -> UserResult<User>;

    async fn find_by_id(&self, id: i32) -> UserResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// One page of users ordered by id
    async fn find_all_paginated(&self, limit: u64, offset: u64) -> UserResult<Vec<User>>;

    /// Number of active users (for pagination)
    async fn count(&self) -> UserResult<u64>;

    /// Apply `changes` and bump `updated_at`. `None` if there is no such user.
    async fn update(&self, id: i32, changes: UserChanges) -> UserResult<Option<User>>;

    /// Replace the password hash. `false` if there is no such user.
    async fn change_password(&self, id: i32, password_hash: String) -> UserResult<bool>;

    /// Set the soft-delete flag. `false` if there is no such user.
    async fn soft_delete(&self, id: i32) -> UserResult<bool>;
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i32, User>,
    last_id: i32,
}

impl Store {
    fn active(&self, id: i32) -> Option<&User> {
        self.users.get(&id).filter(|u| !u.is_deleted)
    }

    fn active_mut(&mut self, id: i32) -> Option<&mut User> {
        self.users.get_mut(&id).filter(|u| !u.is_deleted)
    }

    /// Usernames stay unique across deleted rows too, like the SQL constraint.
    fn username_taken(&self, username: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store.username_taken(&user.username, None) {
            return Err(UserError::DuplicateUsername(user.username));
        }

        store.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: store.last_id,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        };
        store.users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, username = %user.username, "Created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.active(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        let user = store
            .users
            .values()
            .find(|u| !u.is_deleted && u.username == username)
            .cloned();
        Ok(user)
    }

    async fn find_all_paginated(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let store = self.store.read().await;
        let users = store
            .users
            .values()
            .filter(|u| !u.is_deleted)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(users)
    }

    async fn count(&self) -> UserResult<u64> {
        let store = self.store.read().await;
        Ok(store.users.values().filter(|u| !u.is_deleted).count() as u64)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> UserResult<Option<User>> {
        let mut store = self.store.write().await;

        if store.active(id).is_none() {
            return Ok(None);
        }
        if store.username_taken(&changes.username, Some(id)) {
            return Err(UserError::DuplicateUsername(changes.username));
        }

        let Some(user) = store.active_mut(id) else {
            return Ok(None);
        };
        user.username = changes.username;
        user.role = changes.role;
        user.updated_at = Utc::now();

        tracing::info!(user_id = id, "Updated user");
        Ok(Some(user.clone()))
    }

    async fn change_password(&self, id: i32, password_hash: String) -> UserResult<bool> {
        let mut store = self.store.write().await;

        match store.active_mut(id) {
            Some(user) => {
                user.password_hash = password_hash;
                user.updated_at = Utc::now();
                tracing::info!(user_id = id, "Changed user password");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, id: i32) -> UserResult<bool> {
        let mut store = self.store.write().await;

        match store.active_mut(id) {
            Some(user) => {
                user.is_deleted = true;
                user.updated_at = Utc::now();
                tracing::info!(user_id = id, "Soft-deleted user");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
