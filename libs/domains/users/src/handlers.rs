use axum::{
    Router,
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
};
use axum_helpers::{
    ApiResponse, ErrorResponse, IdPath, MessageResponse, PaginatedResponse, ValidatedJson,
    ValidatedQuery,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::AuthService;
use crate::error::UserResult;
use crate::guards::{authenticate, require_self, require_super_admin, require_super_admin_or_self};
use crate::models::{
    ChangePassword, CreateUser, LoginRequest, LoginResponse, PageQuery, Role, UpdateUser,
    UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the accounts endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        login,
        list_users,
        create_user,
        get_user,
        update_user,
        change_password,
        delete_user,
    ),
    components(schemas(
        Role,
        UserResponse,
        CreateUser,
        UpdateUser,
        ChangePassword,
        LoginRequest,
        LoginResponse,
        ErrorResponse,
        MessageResponse,
    )),
    tags(
        (name = TAG, description = "User accounts and login")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints.
///
/// | Route | Guard |
/// |---|---|
/// | `POST /login` | none |
/// | `GET /users`, `POST /users` | super-admin |
/// | `GET /users/{id}`, `PATCH /users/{id}` | super-admin or self |
/// | `PATCH /users/{id}/password` | self |
/// | `DELETE /users/{id}` | super-admin |
///
/// Every guarded route authenticates first.
pub fn router<R: UserRepository + 'static>(users: UserService<R>, auth: AuthService<R>) -> Router {
    let users = Arc::new(users);
    let auth = Arc::new(auth);

    let protected = Router::new()
        .route(
            "/users",
            get(list_users::<R>)
                .post(create_user::<R>)
                .route_layer(from_fn(require_super_admin)),
        )
        .route(
            "/users/{id}",
            get(get_user::<R>)
                .patch(update_user::<R>)
                .route_layer(from_fn(require_super_admin_or_self))
                .merge(delete(delete_user::<R>).route_layer(from_fn(require_super_admin))),
        )
        .route(
            "/users/{id}/password",
            patch(change_password::<R>).route_layer(from_fn(require_self)),
        )
        .route_layer(from_fn_with_state(auth.clone(), authenticate::<R>))
        .with_state(users);

    let public = Router::new()
        .route("/login", post(login::<R>))
        .with_state(auth);

    public.merge(protected)
}

/// Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 401, description = "Unknown user or wrong password", body = ErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(auth): State<Arc<AuthService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<ApiResponse<LoginResponse>> {
    let token = auth.login(input).await?;
    Ok(ApiResponse::new("success login", token))
}

/// List active users, ordered by id
#[utoipa::path(
    get,
    path = "/users",
    tag = TAG,
    params(PageQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One page of users", body = PaginatedResponse<UserResponse>),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 401, description = "Not a super-admin", body = ErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> UserResult<PaginatedResponse<UserResponse>> {
    let (page, per_page) = (query.page(), query.per_page());
    let (users, total) = service.find_all_paginated(per_page, query.offset()).await?;

    Ok(PaginatedResponse::new(
        "success get users data",
        users,
        total,
        page,
        per_page,
    ))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = TAG,
    request_body = CreateUser,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid username or password", body = ErrorResponse),
        (status = 401, description = "Not a super-admin", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<ApiResponse<UserResponse>> {
    let user = service.create(input).await?;
    Ok(ApiResponse::new("success create user", user))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid user id", body = ErrorResponse),
        (status = 401, description = "Neither super-admin nor the user", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    IdPath(id): IdPath,
) -> UserResult<ApiResponse<UserResponse>> {
    let user = service.find_by_id(id).await?;
    Ok(ApiResponse::new("success get user data", user))
}

/// Change username and role
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUser,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Invalid id or username", body = ErrorResponse),
        (status = 401, description = "Neither super-admin nor the user", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<MessageResponse> {
    service.update(id, input).await?;
    Ok(MessageResponse::new("success edit user"))
}

/// Set a new password for your own account
#[utoipa::path(
    patch,
    path = "/users/{id}/password",
    tag = TAG,
    params(("id" = i32, Path, description = "User id")),
    request_body = ChangePassword,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid id or password", body = ErrorResponse),
        (status = 401, description = "Not the user", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
async fn change_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<ChangePassword>,
) -> UserResult<MessageResponse> {
    service.change_password(id, input).await?;
    Ok(MessageResponse::new("success edit user password"))
}

/// Soft-delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Invalid user id", body = ErrorResponse),
        (status = 401, description = "Not a super-admin", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    IdPath(id): IdPath,
) -> UserResult<MessageResponse> {
    service.delete(id).await?;
    Ok(MessageResponse::new("success delete user"))
}
