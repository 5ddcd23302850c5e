//! Publisher maintenance service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
    repository::Repository,
};

#[derive(Clone)]
pub struct PublishersService {
    repository: Repository,
}

impl PublishersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<Publisher>> {
        self.repository.publishers.list(name).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Publisher> {
        self.repository.publishers.get_by_id(id).await
    }

    pub async fn create(&self, publisher: CreatePublisher) -> AppResult<Publisher> {
        publisher
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .repository
            .publishers
            .name_exists(&publisher.name, None)
            .await?
        {
            return Err(AppError::Conflict("Publisher already exists".to_string()));
        }

        self.repository.publishers.create(&publisher).await
    }

    pub async fn update(&self, id: i32, update: UpdatePublisher) -> AppResult<Publisher> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut publisher = self.repository.publishers.get_by_id(id).await?;

        if let Some(name) = update.name {
            if self
                .repository
                .publishers
                .name_exists(&name, Some(id))
                .await?
            {
                return Err(AppError::Conflict("Publisher already exists".to_string()));
            }
            publisher.name = name;
        }
        if let Some(address) = update.address {
            publisher.address = Some(address);
        }
        if let Some(phone) = update.phone {
            publisher.phone = Some(phone);
        }
        if let Some(email) = update.email {
            publisher.email = Some(email);
        }
        if let Some(foundation_date) = update.foundation_date {
            publisher.foundation_date = Some(foundation_date);
        }

        self.repository.publishers.update(&publisher).await?;
        Ok(publisher)
    }

    /// Delete a publisher. Refused while any book still carries their imprint.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.publishers.get_by_id(id).await?;

        if self.repository.books.count_by_publisher(id).await? > 0 {
            return Err(AppError::HasBooks);
        }

        self.repository.publishers.delete(id).await
    }
}
