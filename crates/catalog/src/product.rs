use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mercado_core::{DomainError, DomainResult, ProductId};
use mercado_store::Document;

use crate::category::is_valid_category;

/// A catalog product.
///
/// Invariants (enforced at the service boundary, held at rest):
/// - `title` and `description` are non-empty
/// - `price` is finite and non-negative
/// - `category` is a member of the fixed category set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Active/sellable flag.
    pub status: bool,
    pub stock: u32,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Available for purchase: active and at least one unit in stock.
    pub fn is_available(&self) -> bool {
        self.status && self.stock > 0
    }
}

impl Document for Product {
    fn id(&self) -> Uuid {
        self.id.into()
    }
}

/// Fields accepted when creating a product.
///
/// All fields except `status` are required; presence is validated here (not
/// by deserialization) so a missing field maps to a validation error rather
/// than a malformed-body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub status: Option<bool>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

impl NewProduct {
    /// Validate and build the product to persist.
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> DomainResult<Product> {
        let title = required_text(self.title, "title")?;
        let description = required_text(self.description, "description")?;
        let price = self
            .price
            .ok_or_else(|| DomainError::validation("price is required"))?;
        validate_price(price)?;
        let stock = self
            .stock
            .ok_or_else(|| DomainError::validation("stock is required"))?;
        let stock = validate_stock(stock)?;
        let category = self
            .category
            .ok_or_else(|| DomainError::validation("category is required"))?;
        validate_category(&category)?;

        Ok(Product {
            id,
            title,
            description,
            price,
            status: self.status.unwrap_or(true),
            stock,
            category,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Absent fields are left untouched; the id is immutable
/// (an `id` key in a request body is ignored by deserialization).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub status: Option<bool>,
    pub stock: Option<i64>,
    pub category: Option<String>,
}

impl ProductPatch {
    /// Check every present field against the product invariants.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title cannot be empty"));
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(DomainError::validation("description cannot be empty"));
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        if let Some(category) = &self.category {
            validate_category(category)?;
        }
        Ok(())
    }

    /// Merge the present fields into `product` and bump `updated_at`.
    ///
    /// Callers must run [`validate`](Self::validate) first.
    pub fn apply_to(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(stock) = self.stock {
            // Checked conversion: a negative stock never wraps into the
            // product, even if a caller skipped validate().
            if let Ok(stock) = validate_stock(stock) {
                product.stock = stock;
            }
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        product.updated_at = now;
    }
}

fn required_text(value: Option<String>, field: &str) -> DomainResult<String> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        Some(_) => Err(DomainError::validation(format!("{field} cannot be empty"))),
        None => Err(DomainError::validation(format!("{field} is required"))),
    }
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be a non-negative number"));
    }
    Ok(())
}

fn validate_stock(stock: i64) -> DomainResult<u32> {
    u32::try_from(stock)
        .map_err(|_| DomainError::validation("stock must be a non-negative integer"))
}

fn validate_category(category: &str) -> DomainResult<()> {
    if !is_valid_category(category) {
        return Err(DomainError::validation(format!(
            "unknown category: {category}"
        )));
    }
    Ok(())
}
