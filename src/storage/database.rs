use crate::entities::products;
use crate::error::{CatalogueError, Result};
use crate::models::{Product, ProductFilter, ProductInput};
use crate::storage::ProductStorage;
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait,
    Database, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Schema, Set,
};
use tracing::{debug, info, instrument};

/// Product store backed by any database sea-orm can reach (PostgreSQL in
/// production, SQLite for tests and local runs).
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options
            .max_connections(max_connections)
            .sqlx_logging(false);
        let db = Database::connect(options).await?;

        Self::from_connection(db).await
    }

    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Self::init_database(&db).await?;
        Ok(Self { db })
    }

    async fn init_database(db: &DatabaseConnection) -> Result<()> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let mut statement = schema.create_table_from_entity(products::Entity);
        statement.if_not_exists();
        db.execute(backend.build(&statement)).await?;

        info!(backend = ?backend, "products table ready");
        Ok(())
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// `LIKE` pattern matching `term` literally anywhere in the value.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

/// Some backends round-trip decimals through floating point; rescaling on
/// the way out restores the two fixed fractional digits.
fn normalize(mut product: Product) -> Product {
    product.price.rescale(2);
    product
}

#[async_trait]
impl ProductStorage for DatabaseStorage {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>> {
        let products = products::Entity::find()
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await?;
        debug!(count = products.len(), "listed products");
        Ok(products.into_iter().map(normalize).collect())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i32) -> Result<Product> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(normalize)
            .ok_or(CatalogueError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create(&self, input: ProductInput) -> Result<Product> {
        let product = products::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            stock_quantity: Set(input.stock_quantity),
            is_active: Set(input.is_active),
            ..products::ActiveModel::new()
        };
        let product = product.insert(&self.db).await?;
        debug!(id = product.id, "inserted product");
        Ok(normalize(product))
    }

    #[instrument(skip(self, input))]
    async fn replace(&self, id: i32, input: ProductInput) -> Result<Product> {
        let existing = products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogueError::NotFound(id))?;

        let mut product: products::ActiveModel = existing.into();
        product.name = Set(input.name);
        product.description = Set(input.description);
        product.price = Set(input.price);
        product.stock_quantity = Set(input.stock_quantity);
        product.is_active = Set(input.is_active);

        let product = product.update(&self.db).await?;
        Ok(normalize(product))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<()> {
        let result = products::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(CatalogueError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let mut query = products::Entity::find();
        // SQLite's lower() folds ASCII only; non-ASCII terms are matched
        // below instead.
        for term in filter.terms().iter().filter(|t| t.is_ascii()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(products::Column::Name)))
                    .like(contains_pattern(term)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(products::Column::IsActive.eq(is_active));
        }

        let products = query
            .order_by_desc(products::Column::Id)
            .all(&self.db)
            .await?;
        Ok(products
            .into_iter()
            .filter(|p| filter.matches(p))
            .map(normalize)
            .collect())
    }
}
