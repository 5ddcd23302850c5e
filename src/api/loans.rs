//! Loan lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppResult, DenialReason},
    models::loan::{CreateLoan, LoanDateRange, LoanDetails, RenewLoan},
};

use super::AuthenticatedUser;

/// Answer to "may this user borrow right now?"
#[derive(Serialize, ToSchema)]
pub struct CanBorrowResponse {
    /// Whether a borrow request would pass the eligibility rules
    pub allowed: bool,
    /// First rule that failed, when denied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

/// Answer to "is a copy of this book on the shelf?"
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Book ID
    pub book_id: i32,
    /// Whether at least one copy is available
    pub available: bool,
}

/// Borrow a book (create a loan)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 403, description = "Borrower fails an eligibility rule"),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "User already has this book on loan"),
        (status = 422, description = "No copies available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    claims.require_staff()?;

    let loan = state.services.loans.borrow_book(&request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 204, description = "Book returned"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;

    state.services.loans.return_book(loan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Renew an active loan
///
/// The request body is optional; without one the due date is pushed back by
/// the configured renewal period.
#[utoipa::path(
    post,
    path = "/loans/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = RenewLoan,
    responses(
        (status = 200, description = "Loan renewed", body = LoanDetails),
        (status = 400, description = "Non-positive renewal period"),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan is overdue or no longer active")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
    request: Option<Json<RenewLoan>>,
) -> AppResult<Json<LoanDetails>> {
    claims.require_staff()?;

    let additional_days = request
        .and_then(|Json(r)| r.additional_days)
        .unwrap_or(state.config.loans.renew_period_days);

    let loan = state.services.loans.renew_loan(loan_id, additional_days).await?;
    Ok(Json(loan))
}

/// Get loan details by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    claims.require_staff()?;

    let loan = state.services.loans.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// List loans started within a date range
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanDateRange),
    responses(
        (status = 200, description = "Loans in the range", body = Vec<LoanDetails>),
        (status = 400, description = "Inverted date range")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(range): Query<LoanDateRange>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_staff()?;

    let loans = state
        .services
        .loans
        .get_loans_in_range(range.from, range.to)
        .await?;
    Ok(Json(loans))
}

/// List all active loans
#[utoipa::path(
    get,
    path = "/loans/active",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_active_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_staff()?;

    let loans = state.services.loans.get_active_loans().await?;
    Ok(Json(loans))
}

/// List all overdue loans
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_overdue_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_staff()?;

    let loans = state.services.loans.get_overdue_loans().await?;
    Ok(Json(loans))
}

/// Get loans for a specific user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loans, newest first", body = Vec<LoanDetails>),
        (status = 403, description = "Not allowed to access another user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_self_or_staff(user_id)?;

    let loans = state.services.loans.get_user_loans(user_id).await?;
    Ok(Json(loans))
}

/// Check whether a user may borrow right now
#[utoipa::path(
    get,
    path = "/users/{id}/can-borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Eligibility verdict", body = CanBorrowResponse),
        (status = 403, description = "Not allowed to access another user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn can_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<CanBorrowResponse>> {
    claims.require_self_or_staff(user_id)?;

    let decision = state.services.loans.can_user_borrow(user_id).await?;
    Ok(Json(CanBorrowResponse {
        allowed: decision.is_allowed(),
        reason: decision.denial(),
    }))
}

/// Check whether a book has a copy available
#[utoipa::path(
    get,
    path = "/books/{id}/availability",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Availability flag", body = AvailabilityResponse)
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<AvailabilityResponse>> {
    let available = state.services.loans.is_book_available(book_id).await;
    Ok(Json(AvailabilityResponse { book_id, available }))
}
