//! Statistics service

use std::sync::Arc;

use crate::{
    api::stats::{BookStats, LoanStats, StatsResponse, UserStats},
    clock::Clock,
    error::AppResult,
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Snapshot of the whole library: catalog size, registered readers, loan load.
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let (titles, total_copies, available_copies) =
            self.repository.books.copy_totals().await?;
        let total_users = self.repository.users.count_active().await?;
        let loans = self.get_loan_stats().await?;

        Ok(StatsResponse {
            books: BookStats {
                titles,
                total_copies,
                available_copies,
            },
            users: UserStats { total: total_users },
            loans,
        })
    }

    pub async fn get_loan_stats(&self) -> AppResult<LoanStats> {
        let now = self.clock.now();
        let active = self.repository.loans.count_active().await?;
        let overdue = self.repository.loans.count_overdue(now).await?;

        Ok(LoanStats { active, overdue })
    }
}
