//! Authentication and user management service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    clock::Clock,
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            config,
            clock,
        }
    }

    /// Authenticate by username and password and return a JWT with the user.
    /// Inactive accounts get the same answer as unknown ones.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let claims = UserClaims::new(&user, self.clock.now(), self.config.jwt_expiration_hours);
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List active users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a new user account
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .repository
            .users
            .username_exists(&user.username, None)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash_password(&user.password)?;
        let role = user.role.unwrap_or(Role::Reader);

        let created = self
            .repository
            .users
            .create(&user.username, &user.email, &password_hash, role)
            .await?;
        tracing::info!(user_id = created.id, username = %created.username, "user created");
        Ok(created)
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i32, update: UpdateUser) -> AppResult<User> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut user = self.repository.users.get_by_id(id).await?;

        if let Some(username) = update.username {
            if self
                .repository
                .users
                .username_exists(&username, Some(id))
                .await?
            {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
            user.username = username;
        }
        if let Some(email) = update.email {
            if self.repository.users.email_exists(&email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
            user.email = email;
        }
        if let Some(ref password) = update.password {
            user.password_hash = self.hash_password(password)?;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }

        self.repository.users.update(&user).await?;
        Ok(user)
    }

    /// Soft-delete a user; the account stays behind for loan history
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.deactivate(id).await?;
        tracing::info!(user_id = id, "user deactivated");
        Ok(())
    }

    /// Create the admin account on a fresh install. Without it a new
    /// deployment has no way to log in and register real accounts.
    pub async fn ensure_default_admin(&self) -> AppResult<()> {
        if self.repository.users.count_active().await? > 0 {
            return Ok(());
        }
        let password_hash = self.hash_password("admin")?;
        let admin = self
            .repository
            .users
            .create("admin", "admin@biblioteca.local", &password_hash, Role::Admin)
            .await?;
        tracing::warn!(
            user_id = admin.id,
            "created default admin account with password 'admin', change it immediately"
        );
        Ok(())
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> UsersService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        UsersService::new(
            Repository::new(pool),
            AuthConfig::default(),
            Arc::new(SystemClock),
        )
    }

    fn user_with_hash(hash: String) -> User {
        User {
            id: 1,
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
            password_hash: hash,
            role: Role::Reader,
            is_active: true,
            registered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn password_hashes_verify_and_are_salted() {
        let svc = service();
        let h1 = svc.hash_password("correct horse").unwrap();
        let h2 = svc.hash_password("correct horse").unwrap();
        assert_ne!(h1, h2);

        let user = user_with_hash(h1);
        assert!(svc.verify_password(&user, "correct horse").unwrap());
        assert!(!svc.verify_password(&user, "wrong horse").unwrap());
    }

    #[test]
    fn jwt_round_trips_and_rejects_a_foreign_secret() {
        let user = user_with_hash(String::new());
        let claims = UserClaims::new(&user, Utc::now(), 1);
        let token = claims.create_token("secret").unwrap();

        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, user.id);
        assert_eq!(parsed.role, user.role);
        assert_eq!(parsed.sub, user.username);

        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
