//! Users repository for database operations

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult, Resource},
    models::user::{Role, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID, active or not
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(Resource::User(id)))
    }

    /// Get user by ID and hold its row lock for the rest of the transaction.
    /// Serializes every borrow decision made about this user.
    pub async fn lock_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::NotFound(Resource::User(id)))
    }

    /// Look up a user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    /// List active users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_active ORDER BY username")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    /// Check if a username is taken, optionally excluding a user
    pub async fn username_exists(
        &self,
        username: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) AND ($2::int4 IS NULL OR id != $2))",
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Check if an email is taken, optionally excluding a user
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND ($2::int4 IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new user
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Persist an updated user row
    pub async fn update(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $1, email = $2, password_hash = $3, role = $4, is_active = $5
            WHERE id = $6
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Soft-delete: the account stays behind for loan history
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Resource::User(id)));
        }
        Ok(())
    }

    /// Count active user accounts
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
