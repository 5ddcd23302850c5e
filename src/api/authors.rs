//! Author management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::author::{Author, CreateAuthor, UpdateAuthor},
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct AuthorQuery {
    /// Match against author name
    pub name: Option<String>,
}

/// List authors with optional name search
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(AuthorQuery),
    responses(
        (status = 200, description = "List of authors", body = Vec<Author>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.authors.list(query.name.as_deref()).await?;
    Ok(Json(authors))
}

/// Get author details by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.get(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Author already exists")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(author): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require_staff()?;

    let created = state.services.authors.create(author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author already exists")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(author): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    claims.require_staff()?;

    let updated = state.services.authors.update(id, author).await?;
    Ok(Json(updated))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 422, description = "Author still has books in the catalog")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
