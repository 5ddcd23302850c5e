//! Generated OpenAPI description plus the Swagger UI that renders it

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, loans, publishers, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "1.0.0",
        description = "Library lending ledger REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Publishers
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::renew_loan,
        loans::get_loan,
        loans::list_loans,
        loans::list_active_loans,
        loans::list_overdue_loans,
        loans::get_user_loans,
        loans::can_borrow,
        loans::check_availability,
        // Stats
        stats::get_stats,
        stats::get_loan_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Publishers
            crate::models::publisher::Publisher,
            crate::models::publisher::CreatePublisher,
            crate::models::publisher::UpdatePublisher,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::RenewLoan,
            loans::CanBorrowResponse,
            loans::AvailabilityResponse,
            // Stats
            stats::StatsResponse,
            stats::BookStats,
            stats::UserStats,
            stats::LoanStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::DenialReason,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "authors", description = "Author management"),
        (name = "publishers", description = "Publisher management"),
        (name = "users", description = "User management"),
        (name = "loans", description = "Loan lifecycle and availability"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Router for `/swagger-ui` and the JSON document behind it
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
