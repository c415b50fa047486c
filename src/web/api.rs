use crate::error::{CatalogueError, Result};
use crate::storage::ProductStorage;
use crate::web::{parse_id, SharedCatalogue};
use crate::Product;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// An empty body is an empty object, so missing fields surface as field
/// errors rather than a parse error.
fn parse_body(body: &Bytes) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
        .map_err(|e| CatalogueError::MalformedBody(format!("JSON parse error - {}", e)))
}

#[instrument(name = "api::list_products", skip(catalogue))]
pub async fn list_products<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
) -> Result<Json<Vec<Product>>> {
    let products = catalogue.list().await?;
    debug!(count = products.len(), "listing products");
    Ok(Json(products))
}

#[instrument(name = "api::create_product", skip(catalogue, body))]
pub async fn create_product<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Product>)> {
    let data = parse_body(&body)?;
    let product = catalogue.create(&data).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(name = "api::get_product", skip(catalogue))]
pub async fn get_product<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    Ok(Json(catalogue.get(id).await?))
}

#[instrument(name = "api::replace_product", skip(catalogue, body))]
pub async fn replace_product<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Product>> {
    let id = parse_id(&id)?;
    let data = match parse_body(&body) {
        Ok(data) => data,
        Err(err) => {
            // An unknown id still answers 404 whatever the body holds.
            catalogue.get(id).await?;
            return Err(err);
        }
    };
    Ok(Json(catalogue.replace(id, &data).await?))
}

#[instrument(name = "api::delete_product", skip(catalogue))]
pub async fn delete_product<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    catalogue.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
