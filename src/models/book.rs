//! Book model and the copy-counter rules

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AvailabilityError;

/// Full book model from database.
///
/// `available_copies` is derived state: it only moves through
/// [`Book::borrow_copy`], [`Book::return_copy`] and
/// [`Book::update_total_copies`], and always stays within
/// `0..=total_copies`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    pub published_at: Option<NaiveDate>,
    pub price: Option<Decimal>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// A book is available while at least one copy sits on the shelf.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    pub fn borrowed_copies(&self) -> i32 {
        self.total_copies - self.available_copies
    }

    /// Take one copy off the shelf.
    pub fn borrow_copy(&mut self) -> Result<(), AvailabilityError> {
        if self.available_copies <= 0 {
            return Err(AvailabilityError::NoCopiesAvailable);
        }
        self.available_copies -= 1;
        Ok(())
    }

    /// Put one copy back on the shelf.
    pub fn return_copy(&mut self) -> Result<(), AvailabilityError> {
        if self.available_copies >= self.total_copies {
            return Err(AvailabilityError::OverReturn);
        }
        self.available_copies += 1;
        Ok(())
    }

    /// Resize the holding. Copies out on loan stay out, so the new total must
    /// cover them; the difference lands on (or leaves) the shelf.
    pub fn update_total_copies(&mut self, new_total: i32) -> Result<(), AvailabilityError> {
        if new_total < self.borrowed_copies() {
            return Err(AvailabilityError::CannotReduceBelowBorrowed);
        }
        self.available_copies += new_total - self.total_copies;
        self.total_copies = new_total;
        Ok(())
    }
}

/// Book search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Match against title or ISBN
    pub q: Option<String>,
    /// Only books with at least one copy on the shelf
    pub available: Option<bool>,
}

/// Create book request. New books start with every copy on the shelf.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 10, max = 20, message = "ISBN must be 10-20 characters"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    pub published_at: Option<NaiveDate>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    pub total_copies: i32,
}

/// Replace book request. `available_copies` is never taken from the client;
/// changing `total_copies` goes through the copy-counter rules.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 10, max = 20, message = "ISBN must be 10-20 characters"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    pub published_at: Option<NaiveDate>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    pub total_copies: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(total: i32, available: i32) -> Book {
        Book {
            id: 1,
            title: "The Name of the Rose".to_string(),
            isbn: "9780151446476".to_string(),
            author_id: None,
            publisher_id: None,
            published_at: None,
            price: None,
            total_copies: total,
            available_copies: available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn borrow_takes_one_copy_off_the_shelf() {
        let mut b = book(3, 3);
        b.borrow_copy().unwrap();
        assert_eq!(b.available_copies, 2);
        assert_eq!(b.borrowed_copies(), 1);
    }

    #[test]
    fn borrow_fails_when_the_shelf_is_empty() {
        let mut b = book(2, 0);
        assert_eq!(b.borrow_copy(), Err(AvailabilityError::NoCopiesAvailable));
        assert_eq!(b.available_copies, 0);
    }

    #[test]
    fn return_puts_one_copy_back() {
        let mut b = book(2, 0);
        b.return_copy().unwrap();
        assert_eq!(b.available_copies, 1);
    }

    #[test]
    fn return_fails_when_every_copy_is_shelved() {
        let mut b = book(2, 2);
        assert_eq!(b.return_copy(), Err(AvailabilityError::OverReturn));
        assert_eq!(b.available_copies, 2);
    }

    #[test]
    fn zero_copy_book_is_never_available() {
        let mut b = book(0, 0);
        assert!(!b.is_available());
        assert_eq!(b.borrow_copy(), Err(AvailabilityError::NoCopiesAvailable));
        assert_eq!(b.return_copy(), Err(AvailabilityError::OverReturn));
    }

    #[test]
    fn counters_stay_in_range_through_mixed_cycles() {
        let mut b = book(3, 3);
        for _ in 0..3 {
            b.borrow_copy().unwrap();
        }
        assert_eq!(b.available_copies, 0);
        b.return_copy().unwrap();
        b.borrow_copy().unwrap();
        b.return_copy().unwrap();
        b.return_copy().unwrap();
        b.return_copy().unwrap();
        assert_eq!(b.available_copies, 3);
        assert!(b.return_copy().is_err());
        assert!(b.available_copies >= 0 && b.available_copies <= b.total_copies);
    }

    #[test]
    fn growing_the_total_adds_copies_to_the_shelf() {
        let mut b = book(2, 1);
        b.update_total_copies(5).unwrap();
        assert_eq!(b.total_copies, 5);
        assert_eq!(b.available_copies, 4);
        assert_eq!(b.borrowed_copies(), 1);
    }

    #[test]
    fn shrinking_the_total_keeps_borrowed_copies_covered() {
        let mut b = book(5, 2);
        b.update_total_copies(3).unwrap();
        assert_eq!(b.total_copies, 3);
        assert_eq!(b.available_copies, 0);
        assert_eq!(b.borrowed_copies(), 3);
    }

    #[test]
    fn shrinking_below_borrowed_is_rejected() {
        let mut b = book(5, 2);
        assert_eq!(
            b.update_total_copies(2),
            Err(AvailabilityError::CannotReduceBelowBorrowed)
        );
        assert_eq!(b.total_copies, 5);
        assert_eq!(b.available_copies, 2);
    }

    #[test]
    fn negative_total_is_rejected() {
        let mut b = book(1, 1);
        assert_eq!(
            b.update_total_copies(-1),
            Err(AvailabilityError::CannotReduceBelowBorrowed)
        );
    }
}
