//! Publishers repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, Resource},
    models::publisher::{CreatePublisher, Publisher},
};

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool<Postgres>,
}

impl PublishersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List publishers, optionally filtered by a name match
    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<Publisher>> {
        let publishers = if let Some(name) = name {
            sqlx::query_as::<_, Publisher>(
                "SELECT * FROM publishers WHERE name ILIKE $1 ORDER BY name",
            )
            .bind(format!("%{}%", name))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY name")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(publishers)
    }

    /// Get publisher by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(Resource::Publisher(id)))
    }

    /// Check if a publisher name is taken, optionally excluding one publisher
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM publishers WHERE LOWER(name) = LOWER($1) AND ($2::int4 IS NULL OR id != $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new publisher
    pub async fn create(&self, publisher: &CreatePublisher) -> AppResult<Publisher> {
        let created = sqlx::query_as::<_, Publisher>(
            r#"
            INSERT INTO publishers (name, address, phone, email, foundation_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&publisher.name)
        .bind(&publisher.address)
        .bind(&publisher.phone)
        .bind(&publisher.email)
        .bind(publisher.foundation_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Persist an updated publisher row
    pub async fn update(&self, publisher: &Publisher) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE publishers
            SET name = $1, address = $2, phone = $3, email = $4, foundation_date = $5
            WHERE id = $6
            "#,
        )
        .bind(&publisher.name)
        .bind(&publisher.address)
        .bind(&publisher.phone)
        .bind(&publisher.email)
        .bind(publisher.foundation_date)
        .bind(publisher.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a publisher
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Resource::Publisher(id)));
        }
        Ok(())
    }
}
