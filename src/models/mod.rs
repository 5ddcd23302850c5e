//! Data models for Biblioteca

pub mod author;
pub mod book;
pub mod loan;
pub mod publisher;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use loan::{Loan, LoanDetails, LoanStatus};
pub use publisher::Publisher;
pub use user::{BorrowerSnapshot, Role, User, UserClaims};
