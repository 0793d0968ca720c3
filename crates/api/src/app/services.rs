use std::path::PathBuf;
use std::sync::Arc;

use mercado_carts::CartService;
use mercado_catalog::{CatalogService, Product};
use mercado_carts::Cart;
use mercado_feed::Feed;
use mercado_store::{Collection, StoreError};

/// Wired-up service layer shared by all handlers.
#[derive(Debug)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub carts: CartService,
    pub feed: Arc<Feed>,
}

/// Build services against either backend.
///
/// With a data directory the collections run the whole-file snapshot
/// strategy (`products.json` / `carts.json`); without one they are purely
/// in-memory (tests, dev).
pub fn build_services(data_dir: Option<PathBuf>) -> Result<AppServices, StoreError> {
    let (products, carts) = match data_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let products: Collection<Product> = Collection::open(dir.join("products.json"))?;
            let carts: Collection<Cart> = Collection::open(dir.join("carts.json"))?;
            (products, carts)
        }
        None => (Collection::in_memory(), Collection::in_memory()),
    };

    let products = Arc::new(products);
    let carts = Arc::new(carts);
    let feed = Arc::new(Feed::default());

    Ok(AppServices {
        catalog: CatalogService::new(products.clone(), feed.clone()),
        carts: CartService::new(carts, products),
        feed,
    })
}
