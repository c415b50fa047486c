use crate::error::Result;
use crate::models::{Product, ProductFilter, ProductInput};
use async_trait::async_trait;

#[async_trait]
pub trait ProductStorage: Send + Sync + 'static {
    /// All products in ascending id order.
    async fn list(&self) -> Result<Vec<Product>>;
    async fn get(&self, id: i32) -> Result<Product>;
    async fn create(&self, input: ProductInput) -> Result<Product>;
    /// Overwrites every mutable field of an existing product.
    async fn replace(&self, id: i32, input: ProductInput) -> Result<Product>;
    async fn delete(&self, id: i32) -> Result<()>;
    /// Products matching `filter`, newest first.
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
}

pub mod database;
pub mod memory;
