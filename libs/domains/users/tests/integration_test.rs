//! Integration tests for Users domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Raw statements match the migrated schema
//! - The unique username constraint is enforced, deleted rows included
//! - Soft-deleted rows are invisible to every read
//!
//! Run with `cargo test -p domain_users -- --ignored` (needs Docker).

use domain_users::models::{NewUser, UserChanges};
use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn new_user(username: String) -> NewUser {
    NewUser {
        username,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        role: Role::USER,
    }
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_find_user() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_create_and_find");

    let created = repo.create(new_user(builder.username("a"))).await.unwrap();

    assert_eq!(created.username, builder.username("a"));
    assert_eq!(created.role, Role::USER);
    assert!(!created.is_deleted);

    let by_id = assert_some(repo.find_by_id(created.id).await.unwrap(), "by id");
    assert_id_eq(by_id.id, created.id, "find_by_id");

    let by_name = assert_some(
        repo.find_by_username(&created.username).await.unwrap(),
        "by username",
    );
    assert_id_eq(by_name.id, created.id, "find_by_username");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_username_constraint() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_duplicate");

    repo.create(new_user(builder.username("a"))).await.unwrap();
    let result = repo.create(new_user(builder.username("a"))).await;

    assert!(
        matches!(result, Err(UserError::DuplicateUsername(_))),
        "expected DuplicateUsername, got {:?}",
        result
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_soft_deleted_user_is_invisible() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_soft_delete");

    let user = repo.create(new_user(builder.username("a"))).await.unwrap();
    assert!(repo.soft_delete(user.id).await.unwrap());

    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
    assert!(repo.find_by_username(&user.username).await.unwrap().is_none());
    assert!(!repo.soft_delete(user.id).await.unwrap());
    assert!(!repo.change_password(user.id, "x".into()).await.unwrap());

    let changes = UserChanges {
        username: builder.username("b"),
        role: Role::ADMIN,
    };
    assert!(repo.update(user.id, changes).await.unwrap().is_none());

    // The name is still held by the deleted row
    let result = repo.create(new_user(user.username.clone())).await;
    assert!(matches!(result, Err(UserError::DuplicateUsername(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pagination_skips_deleted_users() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_pagination");

    let mut ids = Vec::new();
    for i in 0..7 {
        let user = repo
            .create(new_user(builder.username(&format!("n{}", i))))
            .await
            .unwrap();
        ids.push(user.id);
    }
    db.mark_deleted(ids[1]).await;

    assert_eq!(repo.count().await.unwrap(), 6);

    let first = repo.find_all_paginated(4, 0).await.unwrap();
    let first_ids: Vec<i32> = first.iter().map(|u| u.id).collect();
    assert_eq!(first_ids, [ids[0], ids[2], ids[3], ids[4]]);

    let second = repo.find_all_paginated(4, 4).await.unwrap();
    let second_ids: Vec<i32> = second.iter().map(|u| u.id).collect();
    assert_eq!(second_ids, [ids[5], ids[6]]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_change_password() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_update");

    let user = repo.create(new_user(builder.username("a"))).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UserChanges {
                username: builder.username("b"),
                role: Role::SUPER_ADMIN,
            },
        )
        .await
        .unwrap();
    let updated = assert_some(updated, "updated user");
    assert_eq!(updated.username, builder.username("b"));
    assert_eq!(updated.role, Role::SUPER_ADMIN);
    assert!(updated.updated_at >= user.updated_at);

    assert!(repo.change_password(user.id, "new-hash".into()).await.unwrap());
    let reloaded = assert_some(repo.find_by_id(user.id).await.unwrap(), "reloaded");
    assert_eq!(reloaded.password_hash, "new-hash");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_to_taken_username_conflicts() {
    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_update_conflict");

    let first = repo.create(new_user(builder.username("a"))).await.unwrap();
    let second = repo.create(new_user(builder.username("b"))).await.unwrap();

    let result = repo
        .update(
            second.id,
            UserChanges {
                username: first.username.clone(),
                role: Role::USER,
            },
        )
        .await;
    assert!(matches!(result, Err(UserError::DuplicateUsername(_))));
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_login_flow_against_postgres() {
    use axum_helpers::{JwtAuth, JwtConfig};

    let db = TestDatabase::new().await;
    let repo = PostgresUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_login_flow");

    let users = UserService::new(repo.clone());
    let created = users
        .create(CreateUser {
            username: builder.username("a"),
            password: builder.password(),
            role: Role::ADMIN,
        })
        .await
        .unwrap();

    let jwt = JwtAuth::new(&JwtConfig::new("integration-secret-that-is-long-enough").unwrap());
    let auth = AuthService::new(repo, jwt);

    let token = auth
        .login(LoginRequest {
            username: builder.username("a"),
            password: builder.password(),
        })
        .await
        .unwrap();

    let identity = auth.authenticate(&token.token).await.unwrap();
    assert_id_eq(identity.id, created.id, "authenticated id");
    assert_eq!(identity.role, Role::ADMIN);

    db.mark_deleted(created.id).await;
    assert!(matches!(
        auth.authenticate(&token.token).await,
        Err(UserError::Unauthorized)
    ));
}
