//! Reporting endpoints for the staff dashboard

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Headline counts across the whole library
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub books: BookStats,
    pub users: UserStats,
    pub loans: LoanStats,
}

#[derive(Serialize, ToSchema)]
pub struct BookStats {
    /// Number of distinct titles
    pub titles: i64,
    /// Total copies across all titles
    pub total_copies: i64,
    /// Copies currently on the shelf
    pub available_copies: i64,
}

#[derive(Serialize, ToSchema)]
pub struct UserStats {
    /// Active accounts only; deactivated ones drop out of the count
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct LoanStats {
    pub active: i64,
    /// Subset of `active` past its due date
    pub overdue: i64,
}

/// Get library-wide statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_staff()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}

/// Get loan load statistics
#[utoipa::path(
    get,
    path = "/stats/loans",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loan statistics", body = LoanStats),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn get_loan_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LoanStats>> {
    claims.require_staff()?;

    let stats = state.services.stats.get_loan_stats().await?;
    Ok(Json(stats))
}
