use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mercado_core::{CartId, ProductId};
use mercado_catalog::Product;
use mercado_store::Document;

/// One entry in a cart: a weak product reference plus a quantity.
///
/// The reference may dangle after the product is deleted; carts do not own
/// products. Product refs are unique within one cart (quantities merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: ProductId,
    pub quantity: u32,
}

/// A shopping cart as stored.
///
/// Carts are never deleted; the only state is the line-item collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: CartId::new(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn line(&self, product: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|l| l.product == product)
    }

    /// Drop line items whose referenced product no longer exists.
    ///
    /// Explicit, idempotent compaction step; returns the number of lines
    /// removed so callers can surface a warning.
    pub fn prune_missing(&mut self, exists: impl Fn(ProductId) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|l| exists(l.product));
        before - self.items.len()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for Cart {
    fn id(&self) -> Uuid {
        self.id.into()
    }
}

/// Line item as accepted on wholesale replacement.
///
/// The quantity is coerced to a non-negative integer by the service
/// (invalid or missing becomes 0).
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemDraft {
    pub product: ProductId,
    pub quantity: Option<i64>,
}

/// A cart with its product references resolved for responses.
///
/// Entries whose product has vanished are omitted; persisting that cleanup
/// is the service's job, not the view's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: u32,
}
