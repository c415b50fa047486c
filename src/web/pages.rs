use crate::error::{CatalogueError, Result};
use crate::storage::ProductStorage;
use crate::validation::form_fields;
use crate::web::render::{layout, product_list, ProductForm};
use crate::web::{parse_id, SharedCatalogue};
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use std::collections::HashMap;
use tracing::{info, instrument};

async fn render_page<S: ProductStorage>(
    catalogue: &SharedCatalogue<S>,
    form: &ProductForm,
) -> Result<Html<String>> {
    let products = catalogue.list().await?;
    let body = format!(
        "<h2>Products</h2>\n{}<h2>Add a product</h2>\n{}",
        product_list(&products),
        form.render()
    );
    Ok(Html(layout("Product catalogue", &body)))
}

#[instrument(name = "pages::product_page", skip(catalogue))]
pub async fn product_page<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
) -> Result<Html<String>> {
    render_page(&catalogue, &ProductForm::empty()).await
}

/// Creates a product from the page form, or shows the page again with the
/// submitted values and the errors next to their fields.
#[instrument(name = "pages::submit_product", skip(catalogue, form))]
pub async fn submit_product<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response> {
    match catalogue.create_from_fields(form_fields(&form)).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(CatalogueError::Validation(errors)) => {
            let form = ProductForm {
                values: form,
                errors,
            };
            Ok(render_page(&catalogue, &form).await?.into_response())
        }
        Err(err) => Err(err),
    }
}

/// Deleting from the page always lands back on the page; a product that is
/// already gone is not an error here.
#[instrument(name = "pages::delete_product", skip(catalogue))]
pub async fn delete_product<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let deleted = match parse_id(&id) {
        Ok(id) => catalogue.delete(id).await,
        Err(err) => Err(err),
    };
    match deleted {
        Ok(()) | Err(CatalogueError::NotFound(_) | CatalogueError::InvalidId(_)) => {
            Ok(Redirect::to("/"))
        }
        Err(err) => Err(err),
    }
}

pub async fn back_to_page() -> Redirect {
    info!("delete link followed without a form post");
    Redirect::to("/")
}
