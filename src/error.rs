//! Error types for the Biblioteca server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes carried in every error response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    BadValue = 4,
    NoSuchUser = 5,
    NoSuchBook = 6,
    NoSuchLoan = 7,
    NoSuchAuthor = 8,
    NoSuchPublisher = 9,
    Duplicate = 10,
    NoCopiesAvailable = 11,
    OverReturn = 12,
    CannotReduceBelowBorrowed = 13,
    DuplicateActiveLoan = 14,
    LoanAlreadyReturned = 15,
    LoanNotActive = 16,
    LoanOverdue = 17,
    AccountInactive = 18,
    NotReader = 19,
    LoanLimitReached = 20,
    UserHasOverdueLoans = 21,
    BookHasActiveLoans = 22,
    HasBooks = 23,
}

/// Which entity a lookup missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Book(i32),
    User(i32),
    Loan(i32),
    Author(i32),
    Publisher(i32),
}

impl Resource {
    fn code(&self) -> ErrorCode {
        match self {
            Resource::Book(_) => ErrorCode::NoSuchBook,
            Resource::User(_) => ErrorCode::NoSuchUser,
            Resource::Loan(_) => ErrorCode::NoSuchLoan,
            Resource::Author(_) => ErrorCode::NoSuchAuthor,
            Resource::Publisher(_) => ErrorCode::NoSuchPublisher,
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Book(id) => write!(f, "Book with id {}", id),
            Resource::User(id) => write!(f, "User with id {}", id),
            Resource::Loan(id) => write!(f, "Loan with id {}", id),
            Resource::Author(id) => write!(f, "Author with id {}", id),
            Resource::Publisher(id) => write!(f, "Publisher with id {}", id),
        }
    }
}

/// Copy-counter violations raised by the availability rules on a book.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("no copies of this book are available")]
    NoCopiesAvailable,

    #[error("all copies of this book are already on the shelf")]
    OverReturn,

    #[error("total copies cannot drop below the number currently borrowed")]
    CannotReduceBelowBorrowed,
}

/// Transitions that are not legal for the loan in its current state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanError {
    #[error("an active loan for this book and user already exists")]
    DuplicateActiveLoan,

    #[error("this loan has already been returned")]
    AlreadyReturned,

    #[error("only active loans can be renewed")]
    NotActive,

    #[error("overdue loans cannot be renewed; return the book first")]
    Overdue,
}

/// Why a borrow request was denied before the shelves were touched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    #[error("user account is inactive")]
    Inactive,

    #[error("only readers can borrow books")]
    NotReader,

    #[error("user has overdue loans")]
    HasOverdueLoans,

    #[error("user has reached the active loan limit")]
    LoanLimitReached,
}

impl DenialReason {
    fn code(&self) -> ErrorCode {
        match self {
            DenialReason::Inactive => ErrorCode::AccountInactive,
            DenialReason::NotReader => ErrorCode::NotReader,
            DenialReason::HasOverdueLoans => ErrorCode::UserHasOverdueLoans,
            DenialReason::LoanLimitReached => ErrorCode::LoanLimitReached,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("{0} not found")]
    NotFound(Resource),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Borrowing denied: {0}")]
    Denied(#[from] DenialReason),

    #[error(transparent)]
    Loan(#[from] LoanError),

    #[error(transparent)]
    Availability(#[from] AvailabilityError),

    #[error("cannot delete a book that has active loans")]
    BookHasActiveLoans,

    #[error("cannot delete a record that books still reference")]
    HasBooks,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, resource.code(), self.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Denied(reason) => {
                (StatusCode::FORBIDDEN, reason.code(), reason.to_string())
            }
            AppError::Loan(e) => {
                let status = match e {
                    LoanError::DuplicateActiveLoan | LoanError::AlreadyReturned => {
                        StatusCode::CONFLICT
                    }
                    LoanError::NotActive | LoanError::Overdue => StatusCode::UNPROCESSABLE_ENTITY,
                };
                let code = match e {
                    LoanError::DuplicateActiveLoan => ErrorCode::DuplicateActiveLoan,
                    LoanError::AlreadyReturned => ErrorCode::LoanAlreadyReturned,
                    LoanError::NotActive => ErrorCode::LoanNotActive,
                    LoanError::Overdue => ErrorCode::LoanOverdue,
                };
                (status, code, e.to_string())
            }
            AppError::Availability(e) => {
                let code = match e {
                    AvailabilityError::NoCopiesAvailable => ErrorCode::NoCopiesAvailable,
                    AvailabilityError::OverReturn => ErrorCode::OverReturn,
                    AvailabilityError::CannotReduceBelowBorrowed => {
                        ErrorCode::CannotReduceBelowBorrowed
                    }
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, e.to_string())
            }
            AppError::BookHasActiveLoans => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BookHasActiveLoans,
                self.to_string(),
            ),
            AppError::HasBooks => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::HasBooks,
                self.to_string(),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_stay_stable() {
        let cases = [
            (
                AppError::Authentication("bad token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Authorization("staff only".into()),
                StatusCode::FORBIDDEN,
            ),
            (AppError::NotFound(Resource::Book(1)), StatusCode::NOT_FOUND),
            (
                AppError::Denied(DenialReason::LoanLimitReached),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::Loan(LoanError::DuplicateActiveLoan),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Loan(LoanError::AlreadyReturned),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Loan(LoanError::Overdue),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Availability(AvailabilityError::NoCopiesAvailable),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::BookHasActiveLoans, StatusCode::UNPROCESSABLE_ENTITY),
            (
                AppError::Conflict("isbn already registered".into()),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn not_found_codes_name_the_entity() {
        assert_eq!(Resource::Book(1).code(), ErrorCode::NoSuchBook);
        assert_eq!(Resource::User(1).code(), ErrorCode::NoSuchUser);
        assert_eq!(Resource::Loan(1).code(), ErrorCode::NoSuchLoan);
        assert_eq!(Resource::Author(1).code(), ErrorCode::NoSuchAuthor);
        assert_eq!(Resource::Publisher(1).code(), ErrorCode::NoSuchPublisher);
    }

    #[test]
    fn denial_reasons_map_to_distinct_codes() {
        let codes = [
            DenialReason::Inactive.code(),
            DenialReason::NotReader.code(),
            DenialReason::HasOverdueLoans.code(),
            DenialReason::LoanLimitReached.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
