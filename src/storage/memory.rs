use crate::error::{CatalogueError, Result};
use crate::models::{Product, ProductFilter, ProductInput};
use crate::storage::ProductStorage;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Default)]
pub struct MemoryStorage {
    products: DashMap<i32, Product>,
    last_id: AtomicI32,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        products.sort_by_key(|p| p.id);
        products
    }
}

#[async_trait]
impl ProductStorage for MemoryStorage {
    async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.sorted())
    }

    async fn get(&self, id: i32) -> Result<Product> {
        self.products
            .get(&id)
            .map(|product| product.clone())
            .ok_or(CatalogueError::NotFound(id))
    }

    async fn create(&self, input: ProductInput) -> Result<Product> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let product = Product {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            stock_quantity: input.stock_quantity,
            is_active: input.is_active,
            created_at: Utc::now().into(),
        };
        self.products.insert(id, product.clone());
        Ok(product)
    }

    async fn replace(&self, id: i32, input: ProductInput) -> Result<Product> {
        let mut product = self
            .products
            .get_mut(&id)
            .ok_or(CatalogueError::NotFound(id))?;
        product.name = input.name;
        product.description = input.description;
        product.price = input.price;
        product.stock_quantity = input.stock_quantity;
        product.is_active = input.is_active;
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> Result<()> {
        self.products
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogueError::NotFound(id))
    }

    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self
            .sorted()
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        products.reverse();
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tokio_test::{assert_err, assert_ok};

    fn input(name: &str, cents: i64, is_active: bool) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: None,
            price: Decimal::new(cents, 2),
            stock_quantity: 1,
            is_active,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() -> Result<()> {
        let storage = MemoryStorage::new();
        let created = storage.create(input("Test Product", 9999, true)).await?;
        let fetched = storage.get(created.id).await?;
        assert_eq!(fetched, created);
        assert_eq!(fetched.price.to_string(), "99.99");
        Ok(())
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() -> Result<()> {
        let storage = MemoryStorage::new();
        let first = storage.create(input("First", 100, true)).await?;
        storage.delete(first.id).await?;
        let second = storage.create(input("Second", 100, true)).await?;
        assert_ne!(first.id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_keeps_id_and_created_at() -> Result<()> {
        let storage = MemoryStorage::new();
        let created = storage.create(input("Old", 2500, true)).await?;
        let replaced = storage.replace(created.id, input("New", 3000, false)).await?;
        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.created_at, created.created_at);
        assert_eq!(replaced.name, "New");
        assert!(!replaced.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.get(999).await,
            Err(CatalogueError::NotFound(999))
        ));
        assert_err!(storage.replace(999, input("x", 1, true)).await);
        assert_err!(storage.delete(999).await);
    }

    #[tokio::test]
    async fn test_list_and_search() -> Result<()> {
        let storage = MemoryStorage::new();
        storage.create(input("Red Chair", 100, true)).await?;
        storage.create(input("Blue Chair", 100, false)).await?;
        storage.create(input("Red Table", 100, true)).await?;

        let all = assert_ok!(storage.list().await);
        assert_eq!(
            all.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let filter = ProductFilter {
            query: Some("chair".to_string()),
            is_active: None,
        };
        let chairs = storage.search(&filter).await?;
        assert_eq!(
            chairs.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["Blue Chair", "Red Chair"]
        );

        let filter = ProductFilter {
            query: Some("RED chair".to_string()),
            is_active: Some(true),
        };
        let found = storage.search(&filter).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Red Chair");

        let filter = ProductFilter {
            query: None,
            is_active: Some(false),
        };
        assert_eq!(storage.search(&filter).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_terms_are_literal() -> Result<()> {
        let storage = MemoryStorage::new();
        storage.create(input("Red Chair", 1000, true)).await?;
        storage.create(input("50% off lamp", 800, true)).await?;

        for (query, expected) in [("_", 0), ("%", 1), ("r_d", 0), ("50%", 1)] {
            let filter = ProductFilter {
                query: Some(query.to_string()),
                is_active: None,
            };
            assert_eq!(storage.search(&filter).await?.len(), expected, "{}", query);
        }
        Ok(())
    }
}
