//! Loans repository for database operations
//!
//! Methods taking a [`Transaction`] run inside the lifecycle engine's unit of
//! work and see rows locked by it; the rest are plain ledger reads.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult, Resource},
    models::loan::{Loan, LoanDetails, LoanDetailsRow},
};

const DETAILS_SELECT: &str = r#"
SELECT l.id, l.book_id, b.title AS book_title, b.isbn AS book_isbn,
       l.user_id, u.username, l.loan_date, l.due_date, l.return_date, l.status
FROM loans l
JOIN books b ON l.book_id = b.id
JOIN users u ON l.user_id = u.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(Resource::Loan(id)))
    }

    /// Get loan by ID and hold its row lock for the rest of the transaction
    pub async fn lock_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::NotFound(Resource::Loan(id)))
    }

    /// Insert a new active loan and return its id
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        user_id: i32,
        loan_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO loans (book_id, user_id, loan_date, due_date, status)
            VALUES ($1, $2, $3, $4, 'Active')
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    /// Settle a loan
    pub async fn mark_returned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        returned_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE loans SET status = 'Returned', return_date = $1 WHERE id = $2")
            .bind(returned_at)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Push a loan's due date out
    pub async fn extend_due_date(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        new_due_date: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE loans SET due_date = $1 WHERE id = $2")
            .bind(new_due_date)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Does this user already have this book out?
    pub async fn active_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        user_id: i32,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND user_id = $2 AND status = 'Active')",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(exists)
    }

    /// Count a user's live loans, under the borrow transaction's lock
    pub async fn count_active_for_user_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND status = 'Active'",
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(count)
    }

    /// Does the user hold anything past its due date, as of `now`?
    pub async fn has_overdue_for_user_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = $1 AND status = 'Active' AND due_date < $2)",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;
        Ok(exists)
    }

    /// Loan with book and borrower context
    pub async fn details_by_id(&self, id: i32, now: DateTime<Utc>) -> AppResult<LoanDetails> {
        let sql = format!("{} WHERE l.id = $1", DETAILS_SELECT);
        let row = sqlx::query_as::<_, LoanDetailsRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(Resource::Loan(id)))?;
        Ok(row.into_details(now))
    }

    /// Every loan a user ever took, newest first
    pub async fn for_user(&self, user_id: i32, now: DateTime<Utc>) -> AppResult<Vec<LoanDetails>> {
        let sql = format!("{} WHERE l.user_id = $1 ORDER BY l.loan_date DESC", DETAILS_SELECT);
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_details(now)).collect())
    }

    /// All live loans, soonest due first
    pub async fn active(&self, now: DateTime<Utc>) -> AppResult<Vec<LoanDetails>> {
        let sql = format!(
            "{} WHERE l.status = 'Active' ORDER BY l.due_date",
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_details(now)).collect())
    }

    /// Live loans already past due as of `now`, most overdue first
    pub async fn overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<LoanDetails>> {
        let sql = format!(
            "{} WHERE l.status = 'Active' AND l.due_date < $1 ORDER BY l.due_date",
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_details(now)).collect())
    }

    /// Loans opened inside a date window, newest first
    pub async fn in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<LoanDetails>> {
        let sql = format!(
            "{} WHERE l.loan_date >= $1 AND l.loan_date <= $2 ORDER BY l.loan_date DESC",
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_details(now)).collect())
    }

    /// Count all live loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = 'Active'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count a user's live loans
    pub async fn count_active_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND status = 'Active'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count live loans past due as of `now`
    pub async fn count_overdue(&self, now: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE status = 'Active' AND due_date < $1",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Pool-level variant for the standalone eligibility probe
    pub async fn has_overdue_for_user(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = $1 AND status = 'Active' AND due_date < $2)",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Is any copy of this book still out?
    pub async fn active_exists_for_book(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND status = 'Active')",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// How many ledger entries reference this book, settled ones included
    pub async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
