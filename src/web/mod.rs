//! HTTP surface: the HTML product page, the JSON API and the admin listing.

pub mod admin;
pub mod api;
pub mod pages;
mod render;

use crate::error::CatalogueError;
use crate::storage::ProductStorage;
use crate::Catalogue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub type SharedCatalogue<S> = Arc<Catalogue<S>>;

pub fn router<S: ProductStorage>(catalogue: SharedCatalogue<S>) -> Router {
    Router::new()
        .route("/", get(pages::product_page::<S>).post(pages::submit_product::<S>))
        .route(
            "/delete/:id/",
            post(pages::delete_product::<S>).get(pages::back_to_page),
        )
        .route(
            "/products/",
            get(api::list_products::<S>).post(api::create_product::<S>),
        )
        .route(
            "/products/:id/",
            get(api::get_product::<S>)
                .put(api::replace_product::<S>)
                .delete(api::delete_product::<S>),
        )
        .route("/admin/products/", get(admin::product_listing::<S>))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(catalogue)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Path ids that are not integers name no product.
pub(crate) fn parse_id(raw: &str) -> Result<i32, CatalogueError> {
    raw.parse::<i32>()
        .map_err(|_| CatalogueError::InvalidId(raw.to_string()))
}

impl IntoResponse for CatalogueError {
    fn into_response(self) -> Response {
        match self {
            CatalogueError::NotFound(id) => {
                tracing::warn!(id, "product not found");
                (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found" }))).into_response()
            }
            CatalogueError::InvalidId(segment) => {
                tracing::warn!(%segment, "product id is not an integer");
                (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found" }))).into_response()
            }
            CatalogueError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            CatalogueError::MalformedBody(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            CatalogueError::Database(err) => {
                tracing::error!(error = %err, "database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "A server error occurred." })),
                )
                    .into_response()
            }
        }
    }
}
