//! Publisher management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct PublisherQuery {
    /// Match against publisher name
    pub name: Option<String>,
}

/// List publishers with optional name search
#[utoipa::path(
    get,
    path = "/publishers",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(PublisherQuery),
    responses(
        (status = 200, description = "List of publishers", body = Vec<Publisher>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_publishers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<PublisherQuery>,
) -> AppResult<Json<Vec<Publisher>>> {
    let publishers = state.services.publishers.list(query.name.as_deref()).await?;
    Ok(Json(publishers))
}

/// Get publisher details by ID
#[utoipa::path(
    get,
    path = "/publishers/{id}",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Publisher ID")
    ),
    responses(
        (status = 200, description = "Publisher details", body = Publisher),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn get_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Publisher>> {
    let publisher = state.services.publishers.get(id).await?;
    Ok(Json(publisher))
}

/// Create a new publisher
#[utoipa::path(
    post,
    path = "/publishers",
    tag = "publishers",
    security(("bearer_auth" = [])),
    request_body = CreatePublisher,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Publisher already exists")
    )
)]
pub async fn create_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(publisher): Json<CreatePublisher>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    claims.require_staff()?;

    let created = state.services.publishers.create(publisher).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing publisher
#[utoipa::path(
    put,
    path = "/publishers/{id}",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Publisher ID")
    ),
    request_body = UpdatePublisher,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 404, description = "Publisher not found"),
        (status = 409, description = "Publisher already exists")
    )
)]
pub async fn update_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(publisher): Json<UpdatePublisher>,
) -> AppResult<Json<Publisher>> {
    claims.require_staff()?;

    let updated = state.services.publishers.update(id, publisher).await?;
    Ok(Json(updated))
}

/// Delete a publisher
#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "publishers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Publisher ID")
    ),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 404, description = "Publisher not found"),
        (status = 422, description = "Publisher still has books in the catalog")
    )
)]
pub async fn delete_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.publishers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
