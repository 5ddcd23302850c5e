//! Author maintenance service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor, UpdateAuthor},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<Author>> {
        self.repository.authors.list(name).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn create(&self, author: CreateAuthor) -> AppResult<Author> {
        author
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.authors.name_exists(&author.name, None).await? {
            return Err(AppError::Conflict("Author already exists".to_string()));
        }

        self.repository.authors.create(&author).await
    }

    pub async fn update(&self, id: i32, update: UpdateAuthor) -> AppResult<Author> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut author = self.repository.authors.get_by_id(id).await?;

        if let Some(name) = update.name {
            if self.repository.authors.name_exists(&name, Some(id)).await? {
                return Err(AppError::Conflict("Author already exists".to_string()));
            }
            author.name = name;
        }
        if let Some(nationality) = update.nationality {
            author.nationality = Some(nationality);
        }
        if let Some(birth_date) = update.birth_date {
            author.birth_date = Some(birth_date);
        }
        if let Some(biography) = update.biography {
            author.biography = Some(biography);
        }

        self.repository.authors.update(&author).await?;
        Ok(author)
    }

    /// Delete an author. Refused while any book still cites them.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.authors.get_by_id(id).await?;

        if self.repository.books.count_by_author(id).await? > 0 {
            return Err(AppError::HasBooks);
        }

        self.repository.authors.delete(id).await
    }
}
