//! Route handlers.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::{field, Span};

use crate::catalog::{self, Product, ProductDetail};
use crate::http::instrumented::{endpoints, instrument_route, RequestTelemetry};
use crate::http::server::AppState;

pub async fn home(State(state): State<AppState>, method: Method) -> Json<Value> {
    RequestTelemetry::counted(state.metrics.clone(), endpoints::HOME, method).finish();
    Json(json!({ "message": "Product API with OpenTelemetry" }))
}

pub async fn get_products(State(state): State<AppState>, method: Method) -> Json<Vec<Product>> {
    let span = tracing::info_span!(
        "get-products",
        db.system = "mongodb",
        product.count = field::Empty,
    );
    let delay = state.list_delay;

    let products = instrument_route(&state.metrics, endpoints::PRODUCTS, method, span, async move {
        // Simulated database query
        tokio::time::sleep(delay).await;
        let products = catalog::list_products();
        Span::current().record("product.count", products.len() as u64);
        products
    })
    .await;

    Json(products)
}

/// `id` must be a run of ASCII digits; anything else does not match the route.
pub async fn get_product(
    State(state): State<AppState>,
    method: Method,
    Path(raw_id): Path<String>,
) -> Result<Json<ProductDetail>, StatusCode> {
    let id = parse_product_id(&raw_id).ok_or(StatusCode::NOT_FOUND)?;

    let span = tracing::info_span!("get-product-by-id", product.id = id);
    let delay = state.lookup_delay;
    let users = state.users.clone();

    let detail = instrument_route(&state.metrics, endpoints::PRODUCT_BY_ID, method, span, async move {
        // Simulated database query
        tokio::time::sleep(delay).await;

        // Failures are already recorded on the call-user-service span
        let owner = users.fetch_user(id).await.ok();

        ProductDetail {
            product: catalog::product_by_id(id),
            owner,
        }
    })
    .await;

    Ok(Json(detail))
}

/// `u64::from_str` also takes a leading `+`, which the route must reject.
fn parse_product_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
