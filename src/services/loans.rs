//! Loan lifecycle engine
//!
//! Every state transition runs in one database transaction and re-reads its
//! facts under row locks, so decisions are always made against current state.
//! Lock order is fixed per transition (borrow: book then user; return: loan
//! then book; renew: loan only) and an early error drops the transaction,
//! which rolls it back.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    clock::Clock,
    config::LoansConfig,
    error::{AppError, AppResult, LoanError},
    models::{
        loan::{CreateLoan, LoanDetails},
        user::BorrowerSnapshot,
        LoanStatus,
    },
    repository::Repository,
    services::eligibility::{BorrowDecision, EligibilityChecker},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    eligibility: EligibilityChecker,
    config: LoansConfig,
    clock: Arc<dyn Clock>,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            eligibility: EligibilityChecker::new(config.max_active_loans),
            config,
            clock,
        }
    }

    /// Open a loan: check the borrower, take a copy off the shelf and write
    /// the ledger entry, all in one transaction.
    pub async fn borrow_book(&self, request: &CreateLoan) -> AppResult<LoanDetails> {
        let CreateLoan { book_id, user_id } = *request;
        let now = self.clock.now();
        let mut tx = self.repository.pool.begin().await?;

        // Book first, then user. Every transition that touches a book takes
        // its lock in this order.
        let mut book = self.repository.books.lock_by_id(&mut tx, book_id).await?;
        let user = self.repository.users.lock_by_id(&mut tx, user_id).await?;

        let borrower = BorrowerSnapshot {
            role: user.role,
            is_active: user.is_active,
            active_loan_count: self
                .repository
                .loans
                .count_active_for_user_tx(&mut tx, user_id)
                .await?,
            has_overdue_loans: self
                .repository
                .loans
                .has_overdue_for_user_tx(&mut tx, user_id, now)
                .await?,
        };
        if let BorrowDecision::Denied(reason) = self.eligibility.can_borrow(&borrower) {
            return Err(AppError::Denied(reason));
        }

        book.borrow_copy()?;

        if self
            .repository
            .loans
            .active_exists(&mut tx, book_id, user_id)
            .await?
        {
            return Err(LoanError::DuplicateActiveLoan.into());
        }

        let due_date = now + Duration::days(self.config.loan_period_days);
        let loan_id = self
            .repository
            .loans
            .insert(&mut tx, book_id, user_id, now, due_date)
            .await?;
        self.repository.books.update_copies(&mut tx, &book, now).await?;
        tx.commit().await?;

        tracing::info!(loan_id, book_id, user_id, "book borrowed");
        self.repository.loans.details_by_id(loan_id, now).await
    }

    /// Settle a loan and put the copy back on the shelf.
    pub async fn return_book(&self, loan_id: i32) -> AppResult<()> {
        let now = self.clock.now();
        let mut tx = self.repository.pool.begin().await?;

        let loan = self.repository.loans.lock_by_id(&mut tx, loan_id).await?;
        if loan.status != LoanStatus::Active {
            return Err(LoanError::AlreadyReturned.into());
        }

        let mut book = self.repository.books.lock_by_id(&mut tx, loan.book_id).await?;
        book.return_copy()?;

        self.repository.loans.mark_returned(&mut tx, loan_id, now).await?;
        self.repository.books.update_copies(&mut tx, &book, now).await?;
        tx.commit().await?;

        tracing::info!(loan_id, book_id = loan.book_id, "book returned");
        Ok(())
    }

    /// Push a loan's due date out from its current due date. Overdue loans
    /// cannot be renewed; the book has to come back first.
    pub async fn renew_loan(&self, loan_id: i32, additional_days: i64) -> AppResult<LoanDetails> {
        if additional_days <= 0 {
            return Err(AppError::Validation(
                "additional_days must be positive".to_string(),
            ));
        }

        let now = self.clock.now();
        let mut tx = self.repository.pool.begin().await?;

        let loan = self.repository.loans.lock_by_id(&mut tx, loan_id).await?;
        if loan.status != LoanStatus::Active {
            return Err(LoanError::NotActive.into());
        }
        if now > loan.due_date {
            return Err(LoanError::Overdue.into());
        }

        let new_due_date = loan.due_date + Duration::days(additional_days);
        self.repository
            .loans
            .extend_due_date(&mut tx, loan_id, new_due_date)
            .await?;
        tx.commit().await?;

        tracing::info!(loan_id, %new_due_date, "loan renewed");
        self.repository.loans.details_by_id(loan_id, now).await
    }

    /// Get one loan with its book and borrower context
    pub async fn get_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        self.repository
            .loans
            .details_by_id(loan_id, self.clock.now())
            .await
    }

    /// Get a user's full borrowing history
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.for_user(user_id, self.clock.now()).await
    }

    /// All live loans
    pub async fn get_active_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.active(self.clock.now()).await
    }

    /// Live loans past their due date
    pub async fn get_overdue_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.overdue(self.clock.now()).await
    }

    /// Loans opened inside a date window
    pub async fn get_loans_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<LoanDetails>> {
        if from > to {
            return Err(AppError::Validation(
                "from must not be after to".to_string(),
            ));
        }
        self.repository
            .loans
            .in_range(from, to, self.clock.now())
            .await
    }

    /// Would a borrow request for this user pass the eligibility rules right
    /// now? Advisory: the answer is re-checked under lock when borrowing.
    pub async fn can_user_borrow(&self, user_id: i32) -> AppResult<BorrowDecision> {
        let now = self.clock.now();
        let user = self.repository.users.get_by_id(user_id).await?;
        let borrower = BorrowerSnapshot {
            role: user.role,
            is_active: user.is_active,
            active_loan_count: self.repository.loans.count_active_for_user(user_id).await?,
            has_overdue_loans: self
                .repository
                .loans
                .has_overdue_for_user(user_id, now)
                .await?,
        };
        Ok(self.eligibility.can_borrow(&borrower))
    }

    /// Availability probe. Degrades to "unavailable" instead of failing:
    /// callers poll this from public pages.
    pub async fn is_book_available(&self, book_id: i32) -> bool {
        match self.repository.books.get_by_id(book_id).await {
            Ok(book) => book.is_available(),
            Err(AppError::NotFound(_)) => false,
            Err(e) => {
                tracing::warn!(book_id, error = %e, "availability probe failed, reporting unavailable");
                false
            }
        }
    }

    /// Count all live loans
    pub async fn count_active(&self) -> AppResult<i64> {
        self.repository.loans.count_active().await
    }

    /// Count a user's live loans
    pub async fn count_active_for_user(&self, user_id: i32) -> AppResult<i64> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.count_active_for_user(user_id).await
    }

    /// Count live loans past their due date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        self.repository.loans.count_overdue(self.clock.now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use chrono::TimeZone;
    use sqlx::postgres::PgPoolOptions;

    // A lazy pool never connects, and the mock clock panics if consulted:
    // these tests prove input validation fires before any time read or query.
    fn service() -> LoansService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        LoansService::new(
            Repository::new(pool),
            LoansConfig::default(),
            Arc::new(MockClock::new()),
        )
    }

    #[tokio::test]
    async fn renew_rejects_non_positive_days_up_front() {
        let svc = service();
        for days in [0, -1, -30] {
            let err = svc.renew_loan(1, days).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn date_range_rejects_inverted_bounds_up_front() {
        let svc = service();
        let from = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let err = svc.get_loans_in_range(from, to).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
