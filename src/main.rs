//! Biblioteca Server - Library Lending Ledger
//!
//! A Rust REST API server for tracking a library's books, readers and loans.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblioteca_server::{
    api,
    clock::SystemClock,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; deployments set real environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to read configuration");

    // RUST_LOG wins; otherwise the configured level applies to our crate
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("biblioteca_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Biblioteca Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to open the database pool");

    tracing::info!("Database pool ready");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to apply database migrations");

    tracing::info!("Migrations applied");

    // The config struct moves into AppState, so take the listen address now
    let listen_addr = format!("{}:{}", config.server.host, config.server.port);

    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.loans.clone(),
        Arc::new(SystemClock),
    );
    services.users.ensure_default_admin().await?;

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    let addr: SocketAddr = listen_addr.parse().expect("Invalid listen address");
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wires every endpoint onto one router under `/api/v1`.
fn create_router(state: AppState) -> Router {
    // The web UI is served from another origin, so CORS stays wide open
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Probes
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Sessions
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Books
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/availability", get(api::loans::check_availability))
        // Authors
        .route("/authors", get(api::authors::list_authors))
        .route("/authors", post(api::authors::create_author))
        .route("/authors/:id", get(api::authors::get_author))
        .route("/authors/:id", put(api::authors::update_author))
        .route("/authors/:id", delete(api::authors::delete_author))
        // Publishers
        .route("/publishers", get(api::publishers::list_publishers))
        .route("/publishers", post(api::publishers::create_publisher))
        .route("/publishers/:id", get(api::publishers::get_publisher))
        .route("/publishers/:id", put(api::publishers::update_publisher))
        .route("/publishers/:id", delete(api::publishers::delete_publisher))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users", post(api::users::create_user))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id", put(api::users::update_user))
        .route("/users/:id", delete(api::users::delete_user))
        .route("/users/:id/loans", get(api::loans::get_user_loans))
        .route("/users/:id/can-borrow", get(api::loans::can_borrow))
        // Loans
        .route("/loans", get(api::loans::list_loans))
        .route("/loans", post(api::loans::create_loan))
        .route("/loans/active", get(api::loans::list_active_loans))
        .route("/loans/overdue", get(api::loans::list_overdue_loans))
        .route("/loans/:id", get(api::loans::get_loan))
        .route("/loans/:id/return", post(api::loans::return_loan))
        .route("/loans/:id/renew", post(api::loans::renew_loan))
        // Reporting
        .route("/stats", get(api::stats::get_stats))
        .route("/stats/loans", get(api::stats::get_loan_stats))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
