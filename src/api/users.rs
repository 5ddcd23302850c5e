//! Reader and staff account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User},
};

use super::AuthenticatedUser;

/// List active users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_staff()?;

    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Fetch one account
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 403, description = "Not allowed to access another user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_self_or_staff(id)?;

    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_staff()?;

    let created = state.services.users.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an account's details
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Not allowed to modify another user"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(user): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    claims.require_self_or_staff(id)?;

    let updated = state.services.users.update_user(id, user).await?;
    Ok(Json(updated))
}

/// Deactivate a user account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
