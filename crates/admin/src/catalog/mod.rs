//! Cached product catalog service.
//!
//! # Architecture
//!
//! - [`ProductCatalog`] is the single point of access for product reads,
//!   writes and image uploads. Construct it once and share it (it is cheap
//!   to clone).
//! - Transport sits behind the [`ProductsApi`] trait; [`HttpProductsApi`]
//!   is the production implementation.
//! - Two cache tiers (list pages and single products) live in
//!   [`cache::CacheTiers`], bounded and expiring via `moka`.
//!
//! # Example
//!
//! ```rust,ignore
//! use teslo_admin::catalog::ProductCatalog;
//! use teslo_admin::config::CatalogConfig;
//!
//! let catalog = ProductCatalog::new(&CatalogConfig::from_env()?)?;
//!
//! let page = catalog.list_products(ListQuery::default()).await?;
//! let product = catalog.get_product_by_id("new").await?; // draft, no request
//! ```

mod backend;
mod cache;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{HttpProductsApi, ProductsApi};

use std::sync::Arc;

use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, info, instrument};

use teslo_core::{ImageFile, ListQuery, Product, ProductPayload, ProductsResponse, is_draft_id};

use crate::config::{CacheSettings, CatalogConfig};
use cache::CacheTiers;

/// Errors that can occur when talking to the products API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// One file of an upload batch failed; the whole batch is abandoned.
    #[error("Upload of {file_name} failed: {source}")]
    Upload {
        file_name: String,
        #[source]
        source: Box<CatalogError>,
    },
}

// =============================================================================
// ProductCatalog
// =============================================================================

/// Cached access to the products API.
pub struct ProductCatalog<A = HttpProductsApi> {
    inner: Arc<ProductCatalogInner<A>>,
}

impl<A> Clone for ProductCatalog<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ProductCatalogInner<A> {
    api: A,
    cache: CacheTiers,
}

impl ProductCatalog<HttpProductsApi> {
    /// Create a catalog backed by the HTTP API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_api(HttpProductsApi::new(config)?, &config.cache))
    }
}

impl<A: ProductsApi> ProductCatalog<A> {
    /// Create a catalog over any [`ProductsApi`].
    #[must_use]
    pub fn with_api(api: A, settings: &CacheSettings) -> Self {
        Self {
            inner: Arc::new(ProductCatalogInner {
                api,
                cache: CacheTiers::new(settings),
            }),
        }
    }

    /// The underlying transport.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get one page of products.
    ///
    /// A cached page is returned as the same shared value until it expires,
    /// is evicted, or is patched by a write.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is not cached and the API request fails.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn list_products(
        &self,
        query: ListQuery,
    ) -> Result<Arc<ProductsResponse>, CatalogError> {
        if let Some(page) = self.inner.cache.list(&query).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let page = Arc::new(self.inner.api.list_products(&query).await?);
        self.inner.cache.put_list(query, Arc::clone(&page)).await;

        Ok(page)
    }

    /// Get a product by id or slug.
    ///
    /// The draft sentinel resolves to [`Product::draft`] without touching the
    /// cache or the network. Otherwise the product is cached under exactly
    /// the identifier requested, so a slug lookup and an id lookup of the same
    /// product are separate entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not cached and the API request fails.
    #[instrument(skip(self))]
    pub async fn get_product_by_slug_or_id(
        &self,
        id_or_slug: &str,
    ) -> Result<Product, CatalogError> {
        if is_draft_id(id_or_slug) {
            return Ok(Product::draft());
        }

        if let Some(product) = self.inner.cache.product(id_or_slug).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product = self.inner.api.get_product(id_or_slug).await?;
        self.inner
            .cache
            .put_product(id_or_slug.to_string(), product.clone())
            .await;

        Ok(product)
    }

    /// Get a product by id. See [`Self::get_product_by_slug_or_id`].
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not cached and the API request fails.
    pub async fn get_product_by_id(&self, id: &str) -> Result<Product, CatalogError> {
        self.get_product_by_slug_or_id(id).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Upload `files`, then create a product from `payload` with the stored
    /// file names appended to its images.
    ///
    /// # Errors
    ///
    /// Returns an error if any upload fails (no product request is sent) or
    /// the create request fails. The cache is untouched on error.
    #[instrument(skip(self, payload, files), fields(files = files.len()))]
    pub async fn create_product(
        &self,
        payload: ProductPayload,
        files: &[ImageFile],
    ) -> Result<Product, CatalogError> {
        let uploaded = self.upload_images(files).await?;
        let payload = payload.with_uploaded_images(uploaded);

        let product = self.inner.api.create_product(&payload).await?;
        info!(product_id = %product.id, "Product created");

        self.update_product_cache(&product).await;
        Ok(product)
    }

    /// Upload `files`, then update product `id` from `payload` with the
    /// stored file names appended to its images.
    ///
    /// # Errors
    ///
    /// Returns an error if any upload fails (no product request is sent) or
    /// the update request fails. The cache is untouched on error.
    #[instrument(skip(self, payload, files), fields(files = files.len()))]
    pub async fn update_product(
        &self,
        id: &str,
        payload: ProductPayload,
        files: &[ImageFile],
    ) -> Result<Product, CatalogError> {
        let uploaded = self.upload_images(files).await?;
        let payload = payload.with_uploaded_images(uploaded);

        let product = self.inner.api.update_product(id, &payload).await?;
        info!(product_id = %product.id, "Product updated");

        self.update_product_cache(&product).await;
        Ok(product)
    }

    /// Record a stored product in both cache tiers.
    ///
    /// Overwrites the single-product entry for its id and replaces it inside
    /// every cached page that already lists it.
    pub async fn update_product_cache(&self, product: &Product) {
        self.inner.cache.apply_write(product).await;
    }

    /// Drop every cached page and product.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all().await;
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// Upload all `files` concurrently, returning stored names in input order.
    ///
    /// # Errors
    ///
    /// Returns the first upload error; the other uploads are abandoned.
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_images(&self, files: &[ImageFile]) -> Result<Vec<String>, CatalogError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        try_join_all(files.iter().map(|file| self.upload_image(file))).await
    }

    /// Upload one file, returning the name the backend stored it under.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Upload` if the request fails.
    pub async fn upload_image(&self, file: &ImageFile) -> Result<String, CatalogError> {
        self.inner
            .api
            .upload_image(file)
            .await
            .map_err(|e| CatalogError::Upload {
                file_name: file.file_name.clone(),
                source: Box::new(e),
            })
    }
}
