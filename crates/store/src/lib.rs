//! `mercado-store` — persistence adapter.
//!
//! A typed document collection with two interchangeable backends behind one
//! API: pure in-memory (tests/dev) and an in-memory map mirrored to a
//! whole-file JSON snapshot that is atomically rewritten on every mutation.

pub mod collection;
pub mod document;
pub mod error;

pub use collection::Collection;
pub use document::Document;
pub use error::StoreError;
