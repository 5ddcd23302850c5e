//! Books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult, Resource},
    models::book::{Book, BookQuery, CreateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(Resource::Book(id)))
    }

    /// Get book by ID and hold its row lock for the rest of the transaction.
    /// Copy counters only move while this lock is held.
    pub async fn lock_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::NotFound(Resource::Book(id)))
    }

    /// List books, optionally filtered by a title/ISBN match or availability
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();

        if query.q.is_some() {
            conditions.push("(title ILIKE $1 OR isbn ILIKE $1)".to_string());
        }
        if query.available == Some(true) {
            conditions.push("available_copies > 0".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT * FROM books {} ORDER BY title", where_clause);

        let mut builder = sqlx::query_as::<_, Book>(&sql);
        if let Some(ref q) = query.q {
            builder = builder.bind(format!("%{}%", q));
        }

        let books = builder.fetch_all(&self.pool).await?;
        Ok(books)
    }

    /// Check whether an ISBN is already registered, optionally excluding one book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::int4 IS NULL OR id != $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new book. Every copy starts on the shelf.
    pub async fn create(&self, book: &CreateBook, now: DateTime<Utc>) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, isbn, author_id, publisher_id, published_at, price,
                               total_copies, available_copies, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.publisher_id)
        .bind(book.published_at)
        .bind(book.price)
        .bind(book.total_copies)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Persist a fully updated book row inside a transaction
    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: &Book,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE books
            SET title = $1, isbn = $2, author_id = $3, publisher_id = $4,
                published_at = $5, price = $6, total_copies = $7,
                available_copies = $8, updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.publisher_id)
        .bind(book.published_at)
        .bind(book.price)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(now)
        .bind(book.id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Persist only the copy counters, inside the transaction that moved them
    pub async fn update_copies(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: &Book,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE books SET total_copies = $1, available_copies = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(now)
        .bind(book.id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Resource::Book(id)));
        }
        Ok(())
    }

    /// How many books an author still has in the catalog
    pub async fn count_by_author(&self, author_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// How many books a publisher still has in the catalog
    pub async fn count_by_publisher(&self, publisher_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE publisher_id = $1")
            .bind(publisher_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Catalog-wide copy totals: (titles, total copies, available copies)
    pub async fn copy_totals(&self) -> AppResult<(i64, i64, i64)> {
        let row: (i64, Option<i64>, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(total_copies)::int8, SUM(available_copies)::int8 FROM books",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok((row.0, row.1.unwrap_or(0), row.2.unwrap_or(0)))
    }
}
