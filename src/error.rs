use crate::models::FieldErrors;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Product {0} not found")]
    NotFound(i32),

    #[error("Product id {0:?} is not an integer")]
    InvalidId(String),

    #[error("Invalid product data: {0}")]
    Validation(FieldErrors),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<FieldErrors> for CatalogueError {
    fn from(errors: FieldErrors) -> Self {
        CatalogueError::Validation(errors)
    }
}

pub type Result<T, E = CatalogueError> = std::result::Result<T, E>;
