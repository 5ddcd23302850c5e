//! Data access layer: one repository per table family, one shared pool

pub mod authors;
pub mod books;
pub mod loans;
pub mod publishers;
pub mod users;

use sqlx::{Pool, Postgres};

/// Bundle of all repositories. The pool stays public so the loan
/// engine can open its own transactions.
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub loans: loans::LoansRepository,
    pub authors: authors::AuthorsRepository,
    pub publishers: publishers::PublishersRepository,
}

impl Repository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            publishers: publishers::PublishersRepository::new(pool.clone()),
            pool,
        }
    }
}
