use axum::Router;

pub mod carts;
pub mod live;
pub mod products;
pub mod system;

/// Router for the `/api` surface.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/carts", carts::router())
}
