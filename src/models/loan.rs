//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

/// Loan lifecycle states, stored as strings in the database.
///
/// `Active` is the only state a loan can move out of; `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    Active,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Active",
            LoanStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(LoanStatus::Active),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

impl Loan {
    /// Overdue means still out past the due date. Settled loans are never
    /// overdue, whenever they came back.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == LoanStatus::Active && now > self.due_date
    }
}

/// Internal row structure for joined loan queries
#[derive(Debug, Clone, FromRow)]
pub struct LoanDetailsRow {
    id: i32,
    book_id: i32,
    book_title: String,
    book_isbn: String,
    user_id: i32,
    username: String,
    loan_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    return_date: Option<DateTime<Utc>>,
    status: LoanStatus,
}

impl LoanDetailsRow {
    /// Attach the overdue flag, evaluated against the caller's instant.
    pub fn into_details(self, now: DateTime<Utc>) -> LoanDetails {
        let is_overdue = self.status == LoanStatus::Active && now > self.due_date;
        LoanDetails {
            id: self.id,
            book_id: self.book_id,
            book_title: self.book_title,
            book_isbn: self.book_isbn,
            user_id: self.user_id,
            username: self.username,
            loan_date: self.loan_date,
            due_date: self.due_date,
            return_date: self.return_date,
            status: self.status,
            is_overdue,
        }
    }
}

/// Loan with book and borrower context for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub book_isbn: String,
    pub user_id: i32,
    pub username: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub is_overdue: bool,
}

/// Borrow request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub book_id: i32,
    pub user_id: i32,
}

/// Renew request. Days default to the configured renewal period.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewLoan {
    pub additional_days: Option<i64>,
}

/// Date-range query over the loan ledger
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanDateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn loan(status: LoanStatus, due: DateTime<Utc>) -> Loan {
        Loan {
            id: 1,
            book_id: 1,
            user_id: 1,
            loan_date: due - Duration::days(14),
            due_date: due,
            return_date: None,
            status,
        }
    }

    #[test]
    fn active_loan_past_due_is_overdue() {
        let due = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let l = loan(LoanStatus::Active, due);
        assert!(!l.is_overdue(due));
        assert!(!l.is_overdue(due - Duration::hours(1)));
        assert!(l.is_overdue(due + Duration::seconds(1)));
    }

    #[test]
    fn returned_loan_is_never_overdue() {
        let due = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let l = loan(LoanStatus::Returned, due);
        assert!(!l.is_overdue(due + Duration::days(30)));
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [LoanStatus::Active, LoanStatus::Returned] {
            assert_eq!(status.as_str().parse::<LoanStatus>().unwrap(), status);
        }
        assert!("lost".parse::<LoanStatus>().is_err());
    }
}
