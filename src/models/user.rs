//! Accounts: readers who borrow and staff who run the desk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Account roles, stored as strings in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Reader,
    Supplier,
    Assistant,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "Reader",
            Role::Supplier => "Supplier",
            Role::Assistant => "Assistant",
            Role::Admin => "Admin",
        }
    }

    /// Ordering used for permission checks; higher levels may do more.
    pub fn access_level(&self) -> u8 {
        match self {
            Role::Reader => 1,
            Role::Supplier => 2,
            Role::Assistant => 3,
            Role::Admin => 4,
        }
    }

    /// Staff run the lending desk and maintain the catalog.
    pub fn is_staff(&self) -> bool {
        self.access_level() >= Role::Assistant.access_level()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reader" => Ok(Role::Reader),
            "supplier" => Ok(Role::Supplier),
            "assistant" => Ok(Role::Assistant),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub registered_at: DateTime<Utc>,
}

/// What the borrowing rules need to know about a borrower, captured under
/// the same lock that creates the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowerSnapshot {
    pub role: Role,
    pub is_active: bool,
    pub active_loan_count: i64,
    pub has_overdue_loans: bool,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Defaults to Reader
    pub role: Option<Role>,
}

/// Update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn new(user: &User, now: DateTime<Utc>, expiration_hours: u64) -> Self {
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(expiration_hours as i64)).timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require staff privileges (assistant or admin)
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization("Staff privileges required".to_string()))
        }
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Users may act on their own account; staff may act on anyone's.
    pub fn require_self_or_staff(&self, user_id: i32) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Not allowed to access another user's data".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(user_id: i32, role: Role) -> UserClaims {
        UserClaims {
            sub: "test".to_string(),
            user_id,
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn role_strings_round_trip() {
        for role in [Role::Reader, Role::Supplier, Role::Assistant, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("reader".parse::<Role>().unwrap(), Role::Reader);
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn access_levels_are_ordered() {
        assert!(Role::Admin.access_level() > Role::Assistant.access_level());
        assert!(Role::Assistant.access_level() > Role::Supplier.access_level());
        assert!(Role::Supplier.access_level() > Role::Reader.access_level());
    }

    #[test]
    fn only_assistants_and_admins_are_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Assistant.is_staff());
        assert!(!Role::Supplier.is_staff());
        assert!(!Role::Reader.is_staff());
    }

    #[test]
    fn self_or_staff_gate() {
        assert!(claims(7, Role::Reader).require_self_or_staff(7).is_ok());
        assert!(claims(7, Role::Reader).require_self_or_staff(8).is_err());
        assert!(claims(7, Role::Assistant).require_self_or_staff(8).is_ok());
        assert!(claims(7, Role::Admin).require_self_or_staff(8).is_ok());
    }
}
