pub mod config;
pub mod entities;
pub mod error;
mod models;
pub mod storage;
pub mod validation;
pub mod web;

pub use error::{CatalogueError, Result};
pub use models::{FieldErrors, Product, ProductFilter, ProductInput};

use serde_json::{Map, Value};
use storage::ProductStorage;
use tracing::{info, warn};

/// Validation in front of a product store; every handler goes through here.
pub struct Catalogue<S: ProductStorage> {
    storage: S,
}

impl<S: ProductStorage> Catalogue<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        self.storage.list().await
    }

    pub async fn get(&self, id: i32) -> Result<Product> {
        self.storage.get(id).await
    }

    /// Creates a product from an untyped payload (a JSON body or a mapped
    /// form submission).
    pub async fn create(&self, data: &Value) -> Result<Product> {
        let input = validation::validate_value(data).inspect_err(|errors| {
            warn!(%errors, "rejected product creation");
        })?;
        let product = self.storage.create(input).await?;
        info!(id = product.id, name = %product.name, "created product");
        Ok(product)
    }

    pub async fn create_from_fields(&self, fields: Map<String, Value>) -> Result<Product> {
        self.create(&Value::Object(fields)).await
    }

    /// Full replacement: `data` must carry every required field, and
    /// omitted optional fields go back to their defaults. An unknown `id`
    /// is reported before any validation error.
    pub async fn replace(&self, id: i32, data: &Value) -> Result<Product> {
        self.storage.get(id).await?;
        let input = validation::validate_value(data).inspect_err(|errors| {
            warn!(id, %errors, "rejected product replacement");
        })?;
        let product = self.storage.replace(id, input).await?;
        info!(id, "replaced product");
        Ok(product)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        self.storage.delete(id).await?;
        info!(id, "deleted product");
        Ok(())
    }

    pub async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        self.storage.search(filter).await
    }
}
