//! `mercado-api` — HTTP surface for the catalog and cart services.

pub mod app;
