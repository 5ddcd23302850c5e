//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl BooksService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Register a new book. Every copy starts on the shelf.
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict("ISBN is already registered".to_string()));
        }
        if let Some(author_id) = book.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        if let Some(publisher_id) = book.publisher_id {
            self.repository.publishers.get_by_id(publisher_id).await?;
        }

        let created = self.repository.books.create(&book, self.clock.now()).await?;
        tracing::info!(book_id = created.id, isbn = %created.isbn, "book created");
        Ok(created)
    }

    /// Replace a book's bibliographic data and resize its holding. Runs under
    /// the book's row lock so the copy counters cannot move underneath it.
    pub async fn update(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.isbn_exists(&update.isbn, Some(id)).await? {
            return Err(AppError::Conflict("ISBN is already registered".to_string()));
        }
        if let Some(author_id) = update.author_id {
            self.repository.authors.get_by_id(author_id).await?;
        }
        if let Some(publisher_id) = update.publisher_id {
            self.repository.publishers.get_by_id(publisher_id).await?;
        }

        let now = self.clock.now();
        let mut tx = self.repository.pool.begin().await?;
        let mut book = self.repository.books.lock_by_id(&mut tx, id).await?;

        book.title = update.title;
        book.isbn = update.isbn;
        book.author_id = update.author_id;
        book.publisher_id = update.publisher_id;
        book.published_at = update.published_at;
        book.price = update.price;
        book.update_total_copies(update.total_copies)?;

        self.repository.books.update(&mut tx, &book, now).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, "book updated");
        Ok(book)
    }

    /// Remove a book from the catalog. Ledger entries are never deleted, so a
    /// book with loan history stays.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;

        if self.repository.loans.active_exists_for_book(id).await? {
            return Err(AppError::BookHasActiveLoans);
        }
        if self.repository.loans.count_for_book(id).await? > 0 {
            return Err(AppError::Conflict(
                "book has loan history and cannot be deleted".to_string(),
            ));
        }

        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}
