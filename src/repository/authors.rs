//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, Resource},
    models::author::{Author, CreateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List authors, optionally filtered by a name match
    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<Author>> {
        let authors = if let Some(name) = name {
            sqlx::query_as::<_, Author>(
                "SELECT * FROM authors WHERE name ILIKE $1 ORDER BY name",
            )
            .bind(format!("%{}%", name))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Author>("SELECT * FROM authors ORDER BY name")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(authors)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(Resource::Author(id)))
    }

    /// Check if an author name is taken, optionally excluding one author
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM authors WHERE LOWER(name) = LOWER($1) AND ($2::int4 IS NULL OR id != $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, nationality, birth_date, biography)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&author.name)
        .bind(&author.nationality)
        .bind(author.birth_date)
        .bind(&author.biography)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Persist an updated author row
    pub async fn update(&self, author: &Author) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE authors
            SET name = $1, nationality = $2, birth_date = $3, biography = $4
            WHERE id = $5
            "#,
        )
        .bind(&author.name)
        .bind(&author.nationality)
        .bind(author.birth_date)
        .bind(&author.biography)
        .bind(author.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete an author
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Resource::Author(id)));
        }
        Ok(())
    }
}
