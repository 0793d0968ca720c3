use std::sync::Arc;

use chrono::Utc;

use mercado_core::{DomainResult, ProductId};
use mercado_feed::{Feed, PRODUCTS_TOPIC};
use mercado_store::Collection;

use crate::page::{Page, paginate};
use crate::product::{NewProduct, Product, ProductPatch};

/// Listing filter: the literal `available` token or an exact category match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// `status == true && stock > 0`.
    Available,
    Category(String),
}

/// Price sort order for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Ascending,
    Descending,
}

/// Listing parameters. `None`/zero limit and page fall back to the defaults
/// (10 and 1).
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<PriceSort>,
    pub filter: Option<ProductFilter>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: u32 = 10;

    fn limit(&self) -> u32 {
        self.limit.filter(|&l| l > 0).unwrap_or(Self::DEFAULT_LIMIT)
    }

    fn page(&self) -> u32 {
        self.page.filter(|&p| p > 0).unwrap_or(1)
    }
}

/// Product catalog: CRUD, pagination/filter/sort, category enumeration.
///
/// Create and delete publish a refreshed full listing on the feed; update
/// deliberately does not (observed behavior of the views this serves).
#[derive(Debug, Clone)]
pub struct CatalogService {
    products: Arc<Collection<Product>>,
    feed: Arc<Feed>,
}

impl CatalogService {
    pub fn new(products: Arc<Collection<Product>>, feed: Arc<Feed>) -> Self {
        Self { products, feed }
    }

    /// The fixed category list, unchanged.
    pub fn categories(&self) -> &'static [&'static str] {
        &crate::category::CATEGORIES
    }

    pub fn list(&self, query: &ListQuery) -> Page<Product> {
        let mut products: Vec<Product> = self
            .products
            .list()
            .into_iter()
            .filter(|p| match &query.filter {
                None => true,
                Some(ProductFilter::Available) => p.is_available(),
                Some(ProductFilter::Category(name)) => p.category == *name,
            })
            .collect();

        match query.sort {
            Some(PriceSort::Ascending) => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
            Some(PriceSort::Descending) => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
            None => {}
        }

        paginate(products, query.limit(), query.page())
    }

    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.products.get(id.into())
    }

    /// Validate, persist, and broadcast the refreshed listing.
    ///
    /// Validation runs before any persistence, so a rejected draft leaves no
    /// partial record behind.
    pub fn add(&self, draft: NewProduct) -> DomainResult<Product> {
        let product = draft.into_product(ProductId::new(), Utc::now())?;
        let created = self.products.insert(product)?;
        tracing::info!(id = %created.id, title = %created.title, "product created");
        self.broadcast_listing();
        Ok(created)
    }

    /// Merge a partial update. Returns `None` if the product does not exist.
    pub fn update(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Option<Product>> {
        patch.validate()?;
        let now = Utc::now();
        let updated = self.products.update(id.into(), |p| patch.apply_to(p, now))?;
        Ok(updated)
    }

    /// Hard delete. Returns whether the product existed; a deletion
    /// broadcasts the refreshed listing.
    pub fn delete(&self, id: ProductId) -> DomainResult<bool> {
        let existed = self.products.remove(id.into())?;
        if existed {
            tracing::info!(%id, "product deleted");
            self.broadcast_listing();
        }
        Ok(existed)
    }

    fn broadcast_listing(&self) {
        let listing = self.products.list();
        match serde_json::to_value(&listing) {
            Ok(payload) => self.feed.publish(PRODUCTS_TOPIC, payload),
            Err(err) => tracing::warn!(%err, "failed to serialize listing for broadcast"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercado_core::DomainError;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(Collection::in_memory()), Arc::new(Feed::default()))
    }

    fn draft(title: &str, price: f64, stock: i64, category: &str) -> NewProduct {
        NewProduct {
            title: Some(title.to_string()),
            description: Some("d".to_string()),
            price: Some(price),
            status: None,
            stock: Some(stock),
            category: Some(category.to_string()),
        }
    }

    #[test]
    fn created_ids_are_unique_and_stable_across_reads() {
        let svc = service();
        let a = svc.add(draft("A", 1.0, 1, "Audio")).unwrap();
        let b = svc.add(draft("B", 2.0, 1, "Audio")).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(svc.get(a.id).unwrap(), a);
        assert_eq!(svc.get(a.id).unwrap(), a);
    }

    #[test]
    fn add_with_missing_category_persists_nothing() {
        let svc = service();
        let mut d = draft("A", 1.0, 1, "Audio");
        d.category = None;

        let err = svc.add(d).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.list(&ListQuery::default()).items.is_empty());
    }

    #[test]
    fn available_filter_excludes_inactive_and_out_of_stock() {
        let svc = service();
        svc.add(draft("in stock", 1.0, 3, "Audio")).unwrap();
        svc.add(draft("sold out", 1.0, 0, "Audio")).unwrap();
        let mut inactive = draft("inactive", 1.0, 3, "Audio");
        inactive.status = Some(false);
        svc.add(inactive).unwrap();

        let page = svc.list(&ListQuery {
            filter: Some(ProductFilter::Available),
            ..Default::default()
        });
        let titles: Vec<&str> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["in stock"]);
    }

    #[test]
    fn category_filter_matches_exactly() {
        let svc = service();
        svc.add(draft("cam", 1.0, 1, "Cámaras")).unwrap();
        svc.add(draft("kb", 1.0, 1, "Periféricos")).unwrap();

        let page = svc.list(&ListQuery {
            filter: Some(ProductFilter::Category("Cámaras".to_string())),
            ..Default::default()
        });
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "cam");
    }

    #[test]
    fn price_sort_orders_listing() {
        let svc = service();
        svc.add(draft("mid", 20.0, 1, "Audio")).unwrap();
        svc.add(draft("cheap", 5.0, 1, "Audio")).unwrap();
        svc.add(draft("dear", 90.0, 1, "Audio")).unwrap();

        let asc = svc.list(&ListQuery {
            sort: Some(PriceSort::Ascending),
            ..Default::default()
        });
        let prices: Vec<f64> = asc.items.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![5.0, 20.0, 90.0]);

        let desc = svc.list(&ListQuery {
            sort: Some(PriceSort::Descending),
            ..Default::default()
        });
        let prices: Vec<f64> = desc.items.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![90.0, 20.0, 5.0]);
    }

    #[test]
    fn update_merges_fields_and_keeps_id() {
        let svc = service();
        let created = svc.add(draft("A", 10.0, 2, "Audio")).unwrap();

        let updated = svc
            .update(
                created.id,
                ProductPatch {
                    price: Some(12.5),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.title, "A");
    }

    #[test]
    fn update_of_missing_product_returns_none() {
        let svc = service();
        let result = svc.update(ProductId::new(), ProductPatch::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn update_with_invalid_category_is_rejected() {
        let svc = service();
        let created = svc.add(draft("A", 10.0, 2, "Audio")).unwrap();
        let err = svc
            .update(
                created.id,
                ProductPatch {
                    category: Some("Drones".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(svc.get(created.id).unwrap().category, "Audio");
    }

    #[test]
    fn delete_is_reported_and_notifies_only_when_something_was_removed() {
        let svc = service();
        let created = svc.add(draft("A", 1.0, 1, "Audio")).unwrap();

        assert!(svc.delete(created.id).unwrap());
        assert!(!svc.delete(created.id).unwrap());
    }

    #[test]
    fn create_and_delete_broadcast_update_does_not() {
        let products = Arc::new(Collection::in_memory());
        let feed = Arc::new(Feed::default());
        let svc = CatalogService::new(products, feed.clone());
        let mut rx = feed.subscribe();

        let created = svc.add(draft("A", 1.0, 1, "Audio")).unwrap();
        let note = rx.try_recv().unwrap();
        assert_eq!(note.topic, PRODUCTS_TOPIC);
        assert_eq!(note.payload.as_array().unwrap().len(), 1);

        svc.update(
            created.id,
            ProductPatch {
                price: Some(2.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(rx.try_recv().is_err(), "update must not broadcast");

        svc.delete(created.id).unwrap();
        let note = rx.try_recv().unwrap();
        assert!(note.payload.as_array().unwrap().is_empty());
    }

    #[test]
    fn pagination_flags_follow_the_listing_boundaries() {
        let svc = service();
        for i in 0..12 {
            svc.add(draft(&format!("p{i}"), i as f64, 1, "Audio")).unwrap();
        }

        let first = svc.list(&ListQuery::default());
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 2);
        assert!(!first.has_prev_page);
        assert!(first.has_next_page);

        let second = svc.list(&ListQuery {
            page: Some(2),
            ..Default::default()
        });
        assert_eq!(second.items.len(), 2);
        assert!(second.has_prev_page);
        assert!(!second.has_next_page);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Pages partition the listing: nothing duplicated, nothing lost,
            /// and the boundary flags flip exactly at the ends.
            #[test]
            fn pages_partition_the_catalog(total in 0usize..60, limit in 1u32..12) {
                let svc = service();
                for i in 0..total {
                    svc.add(draft(&format!("p{i}"), i as f64, 1, "Audio")).unwrap();
                }

                let expected_pages = ((total as u32).div_ceil(limit)).max(1);
                let mut seen = Vec::new();

                for page_no in 1..=expected_pages {
                    let page = svc.list(&ListQuery {
                        limit: Some(limit),
                        page: Some(page_no),
                        ..Default::default()
                    });

                    prop_assert_eq!(page.total_pages, expected_pages);
                    prop_assert_eq!(page.has_prev_page, page_no > 1);
                    prop_assert_eq!(page.has_next_page, page_no < expected_pages);

                    seen.extend(page.items.into_iter().map(|p| p.id));
                }

                prop_assert_eq!(seen.len(), total);
                let mut unique = seen.clone();
                unique.sort();
                unique.dedup();
                prop_assert_eq!(unique.len(), total);
            }
        }
    }
}
