use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use mercado_catalog::{NewProduct, ProductPatch};
use mercado_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/categories", get(categories))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListParams>,
) -> axum::response::Response {
    let page = services.catalog.list(&params.to_list_query());
    (StatusCode::OK, Json(dto::listing_to_json(page, &params))).into_response()
}

pub async fn categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    (StatusCode::OK, Json(services.catalog.categories())).into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.catalog.get(id) {
        Some(product) => (StatusCode::OK, Json(product)).into_response(),
        None => errors::not_found("product"),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(draft): Json<NewProduct>,
) -> axum::response::Response {
    match services.catalog.add(draft) {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.catalog.update(id, patch) {
        Ok(Some(product)) => (StatusCode::OK, Json(product)).into_response(),
        Ok(None) => errors::not_found("product"),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.catalog.delete(id) {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "product deleted" })),
        )
            .into_response(),
        Ok(false) => errors::not_found("product"),
        Err(e) => errors::domain_error_to_response(e),
    }
}
