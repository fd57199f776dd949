//! Cache tiers for products API responses.
//!
//! Two independent `moka` caches, both bounded and optionally expiring:
//!
//! - list tier: whole list responses keyed by [`ListQuery`]
//! - product tier: single products keyed by the identifier or slug they
//!   were requested with
//!
//! Entries are only replaced on a successful fetch, on expiry or capacity
//! eviction, by [`CacheTiers::apply_write`], or by [`CacheTiers::invalidate_all`].

use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::debug;

use teslo_core::{ListQuery, Product, ProductsResponse};

use crate::config::CacheSettings;

pub struct CacheTiers {
    lists: Cache<ListQuery, Arc<ProductsResponse>>,
    products: Cache<String, Product>,
    // Serializes list patching so two writes cannot interleave their read-modify-write.
    write_lock: Mutex<()>,
}

impl CacheTiers {
    pub fn new(settings: &CacheSettings) -> Self {
        let mut lists = Cache::builder().max_capacity(settings.list_capacity);
        let mut products = Cache::builder().max_capacity(settings.product_capacity);
        if let Some(ttl) = settings.ttl {
            lists = lists.time_to_live(ttl);
            products = products.time_to_live(ttl);
        }

        Self {
            lists: lists.build(),
            products: products.build(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Option<Arc<ProductsResponse>> {
        self.lists.get(query).await
    }

    pub async fn put_list(&self, query: ListQuery, page: Arc<ProductsResponse>) {
        self.lists.insert(query, page).await;
    }

    pub async fn product(&self, key: &str) -> Option<Product> {
        self.products.get(key).await
    }

    pub async fn put_product(&self, key: String, product: Product) {
        self.products.insert(key, product).await;
    }

    /// Bring both tiers in line with a product the backend just stored.
    ///
    /// Overwrites the product tier entry keyed by the product's id and
    /// replaces the product inside every cached page that contains it.
    /// Pages that do not contain it are left alone; new products are never
    /// added to a cached page. Returns the number of pages patched.
    pub async fn apply_write(&self, product: &Product) -> usize {
        let _guard = self.write_lock.lock().await;

        self.products
            .insert(product.id.clone(), product.clone())
            .await;

        let stale: Vec<(Arc<ListQuery>, Arc<ProductsResponse>)> = self
            .lists
            .iter()
            .filter(|(_, page)| page.contains(&product.id))
            .collect();

        let patched = stale.len();
        for (query, page) in stale {
            let mut page = ProductsResponse::clone(&page);
            page.replace_product(product);
            self.lists.insert(ListQuery::clone(&query), Arc::new(page)).await;
        }

        debug!(product_id = %product.id, patched, "Applied product write to cache");
        patched
    }

    /// Drop every entry from both tiers.
    pub async fn invalidate_all(&self) {
        self.lists.invalidate_all();
        self.products.invalidate_all();
        self.lists.run_pending_tasks().await;
        self.products.run_pending_tasks().await;
    }

    #[cfg(test)]
    pub async fn entry_counts(&self) -> (u64, u64) {
        self.lists.run_pending_tasks().await;
        self.products.run_pending_tasks().await;
        (self.lists.entry_count(), self.products.entry_count())
    }
}
