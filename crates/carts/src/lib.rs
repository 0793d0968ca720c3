//! `mercado-carts` — shopping carts: model, populated views, and the
//! stock-validated mutation service.

pub mod cart;
pub mod service;

pub use cart::{Cart, CartEntry, CartView, LineItem, LineItemDraft};
pub use service::CartService;
