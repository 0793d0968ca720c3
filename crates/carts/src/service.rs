use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use mercado_catalog::Product;
use mercado_core::{CartId, DomainError, DomainResult, ProductId};
use mercado_store::Collection;

use crate::cart::{Cart, CartEntry, CartView, LineItem, LineItemDraft};

/// Cart lifecycle and line-item mutation with stock validation.
///
/// Every check-then-update sequence runs under a per-cart lock, so two
/// concurrent `add_product` calls against the same cart cannot both pass the
/// stock check against a stale quantity. Locks are keyed by cart id and kept
/// for the process lifetime (carts are never deleted).
#[derive(Debug)]
pub struct CartService {
    carts: Arc<Collection<Cart>>,
    products: Arc<Collection<Product>>,
    locks: Mutex<HashMap<CartId, Arc<Mutex<()>>>>,
}

impl CartService {
    pub fn new(carts: Arc<Collection<Cart>>, products: Arc<Collection<Product>>) -> Self {
        Self {
            carts,
            products,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// New cart with an empty line-item collection.
    pub fn create(&self) -> DomainResult<Cart> {
        let cart = self.carts.insert(Cart::new())?;
        tracing::info!(id = %cart.id, "cart created");
        Ok(cart)
    }

    /// The first cart in storage, creating one if none exists.
    ///
    /// Single-tenant convenience for view flows without explicit cart
    /// selection; there is no per-user or per-session cart identity here.
    pub fn default_cart(&self) -> DomainResult<Cart> {
        match self.carts.first() {
            Some(cart) => Ok(cart),
            None => self.create(),
        }
    }

    /// Fetch a cart with product references populated.
    ///
    /// Line items whose product was deleted are compacted away and the
    /// compaction persisted; the second tuple element is the number of items
    /// removed, for caller-facing warnings.
    pub fn get(&self, id: CartId) -> DomainResult<Option<(CartView, usize)>> {
        let guard = self.cart_lock(id)?;
        let _held = guard.lock().map_err(poisoned)?;

        let Some(cart) = self.carts.get(id.into()) else {
            return Ok(None);
        };

        let mut compacted = cart.clone();
        let removed = compacted.prune_missing(|p| self.products.get(p.into()).is_some());
        let cart = if removed > 0 {
            tracing::info!(%id, removed, "compacted dangling cart lines");
            compacted.updated_at = Utc::now();
            self.carts.insert(compacted)?
        } else {
            cart
        };

        Ok(Some((self.populate(&cart), removed)))
    }

    /// Add `quantity` units of a product, merging with any existing line.
    ///
    /// Fails with `NotFound` if the cart or product is missing and with
    /// `InsufficientStock` if the merged quantity would exceed the product's
    /// stock at the time of the call.
    pub fn add_product(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> DomainResult<CartView> {
        let guard = self.cart_lock(cart_id)?;
        let _held = guard.lock().map_err(poisoned)?;

        let cart = self.carts.get(cart_id.into()).ok_or(DomainError::NotFound)?;
        let product = self
            .products
            .get(product_id.into())
            .ok_or(DomainError::NotFound)?;

        let in_cart = cart.line(product_id).map(|l| l.quantity).unwrap_or(0);
        let new_total = in_cart
            .checked_add(quantity)
            .ok_or(DomainError::insufficient_stock(product.stock, in_cart))?;
        if new_total > product.stock {
            return Err(DomainError::insufficient_stock(product.stock, in_cart));
        }

        let now = Utc::now();
        let updated = self
            .carts
            .update(cart_id.into(), |c| {
                match c.items.iter_mut().find(|l| l.product == product_id) {
                    Some(line) => line.quantity = new_total,
                    None => c.items.push(LineItem {
                        product: product_id,
                        quantity: new_total,
                    }),
                }
                c.updated_at = now;
            })?
            .ok_or(DomainError::NotFound)?;

        Ok(self.populate(&updated))
    }

    /// Remove a product's line item. Removing an absent product is a no-op;
    /// only a missing cart is an error.
    pub fn remove_product(&self, cart_id: CartId, product_id: ProductId) -> DomainResult<CartView> {
        let guard = self.cart_lock(cart_id)?;
        let _held = guard.lock().map_err(poisoned)?;

        let now = Utc::now();
        let updated = self
            .carts
            .update(cart_id.into(), |c| {
                c.items.retain(|l| l.product != product_id);
                c.updated_at = now;
            })?
            .ok_or(DomainError::NotFound)?;

        Ok(self.populate(&updated))
    }

    /// Wholesale replace the line-item collection.
    ///
    /// Quantities are coerced to non-negative integers (invalid/missing
    /// become 0); duplicate product refs in the input are merged by summing
    /// so the unique-ref invariant holds at rest. No stock validation here.
    pub fn replace_items(&self, cart_id: CartId, drafts: Vec<LineItemDraft>) -> DomainResult<CartView> {
        let guard = self.cart_lock(cart_id)?;
        let _held = guard.lock().map_err(poisoned)?;

        let mut items: Vec<LineItem> = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let quantity = draft
                .quantity
                .and_then(|q| u32::try_from(q).ok())
                .unwrap_or(0);
            match items.iter_mut().find(|l| l.product == draft.product) {
                Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                None => items.push(LineItem {
                    product: draft.product,
                    quantity,
                }),
            }
        }

        let now = Utc::now();
        let updated = self
            .carts
            .update(cart_id.into(), |c| {
                c.items = items;
                c.updated_at = now;
            })?
            .ok_or(DomainError::NotFound)?;

        Ok(self.populate(&updated))
    }

    /// Set an existing line item's quantity.
    ///
    /// `NotFound` if the cart, the line item, or the referenced product is
    /// missing; `InsufficientStock` if the requested quantity exceeds stock.
    /// The quantity is coerced to a non-negative integer (invalid becomes 0).
    pub fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<CartView> {
        let guard = self.cart_lock(cart_id)?;
        let _held = guard.lock().map_err(poisoned)?;

        let cart = self.carts.get(cart_id.into()).ok_or(DomainError::NotFound)?;
        let line = cart.line(product_id).ok_or(DomainError::NotFound)?;
        let product = self
            .products
            .get(product_id.into())
            .ok_or(DomainError::NotFound)?;

        let quantity = u32::try_from(quantity).unwrap_or(0);
        if quantity > product.stock {
            return Err(DomainError::insufficient_stock(product.stock, line.quantity));
        }

        let now = Utc::now();
        let updated = self
            .carts
            .update(cart_id.into(), |c| {
                if let Some(l) = c.items.iter_mut().find(|l| l.product == product_id) {
                    l.quantity = quantity;
                }
                c.updated_at = now;
            })?
            .ok_or(DomainError::NotFound)?;

        Ok(self.populate(&updated))
    }

    /// Empty the line-item collection. `NotFound` if the cart is missing.
    pub fn clear(&self, cart_id: CartId) -> DomainResult<CartView> {
        let guard = self.cart_lock(cart_id)?;
        let _held = guard.lock().map_err(poisoned)?;

        let now = Utc::now();
        let updated = self
            .carts
            .update(cart_id.into(), |c| {
                c.items.clear();
                c.updated_at = now;
            })?
            .ok_or(DomainError::NotFound)?;

        Ok(self.populate(&updated))
    }

    /// Resolve product references for a response. Dangling refs are omitted
    /// from the view (persisted compaction happens in [`get`](Self::get)).
    fn populate(&self, cart: &Cart) -> CartView {
        let items = cart
            .items
            .iter()
            .filter_map(|l| {
                self.products.get(l.product.into()).map(|product| CartEntry {
                    product,
                    quantity: l.quantity,
                })
            })
            .collect();

        CartView {
            id: cart.id,
            items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }

    fn cart_lock(&self, id: CartId) -> DomainResult<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(poisoned)?;
        Ok(locks.entry(id).or_default().clone())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DomainError {
    DomainError::storage("cart lock poisoned")
}
