//! Publisher model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Full publisher model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub foundation_date: Option<NaiveDate>,
}

/// Create publisher request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePublisher {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub foundation_date: Option<NaiveDate>,
}

/// Update publisher request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePublisher {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub foundation_date: Option<NaiveDate>,
}
