use crate::error::Result;
use crate::models::ProductFilter;
use crate::storage::ProductStorage;
use crate::validation::parse_bool_str;
use crate::web::render::{escape, layout, yes_no};
use crate::web::SharedCatalogue;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use std::fmt::Write;
use tracing::{debug, instrument};

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub is_active: Option<String>,
}

impl ListingQuery {
    /// Unrecognised `is_active` values drop the filter instead of failing.
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            query: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            is_active: self.is_active.as_deref().and_then(parse_bool_str),
        }
    }
}

fn filter_link(label: &str, q: &str, is_active: Option<bool>, current: Option<bool>) -> String {
    let mut params = Vec::new();
    if !q.is_empty() {
        params.push(("q", q.to_string()));
    }
    if let Some(active) = is_active {
        params.push(("is_active", active.to_string()));
    }
    let mut href = String::from("/admin/products/");
    let query = serde_urlencoded::to_string(&params).unwrap_or_default();
    if !query.is_empty() {
        href.push('?');
        href.push_str(&query);
    }
    if is_active == current {
        format!("<li class=\"selected\"><a href=\"{}\">{}</a></li>", escape(&href), label)
    } else {
        format!("<li><a href=\"{}\">{}</a></li>", escape(&href), label)
    }
}

/// Read-only product table with a name search box and an `is_active`
/// filter, newest products first.
#[instrument(name = "admin::product_listing", skip(catalogue))]
pub async fn product_listing<S: ProductStorage>(
    State(catalogue): State<SharedCatalogue<S>>,
    Query(query): Query<ListingQuery>,
) -> Result<Html<String>> {
    let filter = query.filter();
    let products = catalogue.search(&filter).await?;
    debug!(count = products.len(), "admin listing");

    let q = filter.query.clone().unwrap_or_default();
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<form method=\"get\" action=\"/admin/products/\" id=\"changelist-search\">\
         <input type=\"text\" name=\"q\" value=\"{}\">",
        escape(&q)
    );
    if let Some(active) = filter.is_active {
        let _ = write!(
            body,
            "<input type=\"hidden\" name=\"is_active\" value=\"{}\">",
            active
        );
    }
    body.push_str("<button type=\"submit\">Search</button></form>\n");

    body.push_str("<div id=\"changelist-filter\"><h3>By is active</h3><ul>\n");
    for (label, value) in [("All", None), ("Yes", Some(true)), ("No", Some(false))] {
        body.push_str(&filter_link(label, &q, value, filter.is_active));
        body.push('\n');
    }
    body.push_str("</ul></div>\n");

    let _ = writeln!(
        body,
        "<p class=\"paginator\">{} product{}</p>",
        products.len(),
        if products.len() == 1 { "" } else { "s" }
    );
    body.push_str(
        "<table id=\"result_list\">\n<thead><tr><th>ID</th><th>Name</th><th>Price</th>\
         <th>Stock quantity</th><th>Is active</th><th>Created at</th></tr></thead>\n<tbody>\n",
    );
    for product in &products {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            product.id,
            escape(&product.name),
            product.price,
            product.stock_quantity,
            yes_no(product.is_active),
            product.created_at.to_rfc3339(),
        );
    }
    body.push_str("</tbody>\n</table>\n");

    Ok(Html(layout("Products", &body)))
}
