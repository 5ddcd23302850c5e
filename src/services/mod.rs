//! Business logic services

pub mod authors;
pub mod books;
pub mod eligibility;
pub mod loans;
pub mod publishers;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::{AuthConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    pub publishers: publishers::PublishersService,
    pub stats: stats::StatsService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        loans_config: LoansConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            books: books::BooksService::new(repository.clone(), clock.clone()),
            loans: loans::LoansService::new(repository.clone(), loans_config, clock.clone()),
            publishers: publishers::PublishersService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone(), clock.clone()),
            users: users::UsersService::new(repository.clone(), auth_config, clock),
            repository,
        }
    }

    /// True when the database answers a trivial query.
    pub async fn db_ready(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await
            .is_ok()
    }
}
