use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, SqlErr, Statement,
    TransactionTrait,
};

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, Role, User, UserChanges};
use crate::repository::UserRepository;

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at, is_deleted";

/// PostgreSQL implementation of UserRepository using raw SeaORM statements
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: i32,
    username: String,
    password_hash: String,
    role: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_deleted: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: Role(row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_deleted: row.is_deleted,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

fn statement(sql: &str, values: impl IntoIterator<Item = sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
}

/// Map a unique-constraint violation to `DuplicateUsername`.
fn map_write_error(err: DbErr, username: &str) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::DuplicateUsername(username.to_string())
        }
        _ => UserError::Store(err),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> UserResult<User> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let stmt = statement(
            &sql,
            [
                user.username.clone().into(),
                user.password_hash.into(),
                user.role.0.into(),
            ],
        );

        let txn = self.db.begin().await?;
        let row = UserRow::find_by_statement(stmt)
            .one(&txn)
            .await
            .map_err(|e| map_write_error(e, &user.username))?
            .ok_or_else(|| DbErr::RecordNotInserted)?;
        txn.commit().await?;

        tracing::info!(user_id = row.id, username = %row.username, "Created user");
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND is_deleted = false",
            USER_COLUMNS
        );

        let row = UserRow::find_by_statement(statement(&sql, [id.into()]))
            .one(&self.db)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = $1 AND is_deleted = false",
            USER_COLUMNS
        );

        let row = UserRow::find_by_statement(statement(&sql, [username.into()]))
            .one(&self.db)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_all_paginated(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE is_deleted = false ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );

        let out_of_range = |_| UserError::Validation("Invalid page query value".to_string());
        let limit = i64::try_from(limit).map_err(out_of_range)?;
        let offset = i64::try_from(offset).map_err(out_of_range)?;

        let rows = UserRow::find_by_statement(statement(&sql, [limit.into(), offset.into()]))
        .all(&self.db)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> UserResult<u64> {
        let sql = "SELECT COUNT(*) AS total FROM users WHERE is_deleted = false";

        let row = CountRow::find_by_statement(statement(sql, []))
            .one(&self.db)
            .await?;

        Ok(row.map(|r| r.total as u64).unwrap_or(0))
    }

    async fn update(&self, id: i32, changes: UserChanges) -> UserResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET username = $2, role = $3, updated_at = now() \
             WHERE id = $1 AND is_deleted = false RETURNING {}",
            USER_COLUMNS
        );
        let stmt = statement(
            &sql,
            [
                id.into(),
                changes.username.clone().into(),
                changes.role.0.into(),
            ],
        );

        let txn = self.db.begin().await?;
        let row = UserRow::find_by_statement(stmt)
            .one(&txn)
            .await
            .map_err(|e| map_write_error(e, &changes.username))?;
        txn.commit().await?;

        if row.is_some() {
            tracing::info!(user_id = id, "Updated user");
        }
        Ok(row.map(User::from))
    }

    async fn change_password(&self, id: i32, password_hash: String) -> UserResult<bool> {
        let sql = "UPDATE users SET password_hash = $2, updated_at = now() \
                   WHERE id = $1 AND is_deleted = false";

        let txn = self.db.begin().await?;
        let result = txn
            .execute_raw(statement(sql, [id.into(), password_hash.into()]))
            .await?;
        txn.commit().await?;

        let changed = result.rows_affected() > 0;
        if changed {
            tracing::info!(user_id = id, "Changed user password");
        }
        Ok(changed)
    }

    async fn soft_delete(&self, id: i32) -> UserResult<bool> {
        let sql = "UPDATE users SET is_deleted = true, updated_at = now() \
                   WHERE id = $1 AND is_deleted = false";

        let txn = self.db.begin().await?;
        let result = txn.execute_raw(statement(sql, [id.into()])).await?;
        txn.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(user_id = id, "Soft-deleted user");
        }
        Ok(deleted)
    }
}
