use serde::Deserialize;
use serde_json::{Value, json};

use mercado_carts::CartView;
use mercado_catalog::{ListQuery, Page, PriceSort, Product, ProductFilter};

// -------------------------
// Request DTOs
// -------------------------

/// Listing query string. Values are coerced leniently, matching the views
/// this API was written for: a non-numeric or zero `limit`/`page` falls back
/// to the defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub sort: Option<String>,
    pub query: Option<String>,
}

impl ListParams {
    pub fn to_list_query(&self) -> ListQuery {
        let sort = match self.sort.as_deref() {
            Some("asc") => Some(PriceSort::Ascending),
            Some("desc") => Some(PriceSort::Descending),
            _ => None,
        };

        let filter = match self.query.as_deref() {
            None | Some("") => None,
            Some("available") => Some(ProductFilter::Available),
            Some(category) => Some(ProductFilter::Category(category.to_string())),
        };

        ListQuery {
            limit: self.limit.as_deref().and_then(|s| s.parse().ok()),
            page: self.page.as_deref().and_then(|s| s.parse().ok()),
            sort,
            filter,
        }
    }

    /// Navigable link for `page`, preserving the other query params.
    pub fn link_for(&self, page: u32) -> String {
        let mut link = format!("/api/products?page={page}");
        if let Some(limit) = &self.limit {
            link.push_str(&format!("&limit={limit}"));
        }
        if let Some(sort) = &self.sort {
            link.push_str(&format!("&sort={sort}"));
        }
        if let Some(query) = &self.query {
            link.push_str(&format!("&query={query}"));
        }
        link
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: Option<i64>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

/// Listing response in the shape the views consume: payload plus pagination
/// metadata and prev/next links.
pub fn listing_to_json(page: Page<Product>, params: &ListParams) -> Value {
    json!({
        "status": "success",
        "payload": page.items,
        "totalPages": page.total_pages,
        "prevPage": page.prev_page,
        "nextPage": page.next_page,
        "page": page.page,
        "hasPrevPage": page.has_prev_page,
        "hasNextPage": page.has_next_page,
        "prevLink": page.prev_page.map(|p| params.link_for(p)),
        "nextLink": page.next_page.map(|p| params.link_for(p)),
    })
}

/// Populated cart plus the count of line items dropped because their product
/// no longer exists (so callers can surface a warning).
pub fn cart_with_cleanup_to_json(view: &CartView, cleaned_items: usize) -> Value {
    let mut value = json!(view);
    if let Some(obj) = value.as_object_mut() {
        obj.insert("cleaned_items".to_string(), json!(cleaned_items));
    }
    value
}
