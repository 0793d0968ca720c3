use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use mercado_carts::LineItemDraft;
use mercado_core::{CartId, ProductId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_cart))
        .route("/default", get(default_cart))
        .route(
            "/:cid",
            get(get_cart).put(replace_items).delete(clear_cart),
        )
        .route(
            "/:cid/products/:pid",
            post(add_product).put(set_quantity).delete(remove_product),
        )
}

pub async fn create_cart(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.carts.create() {
        Ok(cart) => (StatusCode::CREATED, Json(cart)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Single-tenant convenience for view flows without explicit cart selection.
pub async fn default_cart(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.carts.default_cart() {
        Ok(cart) => (StatusCode::OK, Json(cart)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cid): Path<String>,
) -> axum::response::Response {
    let cid: CartId = match cid.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.carts.get(cid) {
        Ok(Some((view, cleaned))) => (
            StatusCode::OK,
            Json(dto::cart_with_cleanup_to_json(&view, cleaned)),
        )
            .into_response(),
        Ok(None) => errors::not_found("cart"),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn add_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path((cid, pid)): Path<(String, String)>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> axum::response::Response {
    let (cid, pid) = match parse_ids(&cid, &pid) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    // Quantity defaults to 1 when the body or the field is absent. A present
    // field must be a positive integer; an unparseable body is a 400, not a
    // silent default.
    let quantity: u32 = match body {
        Ok(Json(value)) => match value.get("quantity") {
            None => 1,
            Some(q) => match q.as_u64().and_then(|q| u32::try_from(q).ok()) {
                Some(q) if q >= 1 => q,
                _ => {
                    return errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "quantity must be a positive integer",
                    );
                }
            },
        },
        Err(JsonRejection::MissingJsonContentType(_)) => 1,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match services.carts.add_product(cid, pid, quantity) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path((cid, pid)): Path<(String, String)>,
    body: Result<Json<dto::SetQuantityRequest>, JsonRejection>,
) -> axum::response::Response {
    let (cid, pid) = match parse_ids(&cid, &pid) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match services.carts.set_quantity(cid, pid, body.quantity.unwrap_or(0)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path((cid, pid)): Path<(String, String)>,
) -> axum::response::Response {
    let (cid, pid) = match parse_ids(&cid, &pid) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.carts.remove_product(cid, pid) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn replace_items(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cid): Path<String>,
    Json(items): Json<Vec<LineItemDraft>>,
) -> axum::response::Response {
    let cid: CartId = match cid.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.carts.replace_items(cid, items) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Path(cid): Path<String>,
) -> axum::response::Response {
    let cid: CartId = match cid.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.carts.clear(cid) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn parse_ids(cid: &str, pid: &str) -> Result<(CartId, ProductId), axum::response::Response> {
    let cid: CartId = cid.parse().map_err(errors::domain_error_to_response)?;
    let pid: ProductId = pid.parse().map_err(errors::domain_error_to_response)?;
    Ok((cid, pid))
}
