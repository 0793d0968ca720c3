//! `mercado-catalog` — product catalog: model, fixed category set, and the
//! CRUD + pagination service.

pub mod category;
pub mod page;
pub mod product;
pub mod service;

pub use category::{CATEGORIES, is_valid_category};
pub use page::Page;
pub use product::{NewProduct, Product, ProductPatch};
pub use service::{CatalogService, ListQuery, PriceSort, ProductFilter};
