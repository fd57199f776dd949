//! In-memory [`ProductsApi`] used by unit tests.

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use teslo_core::{ImageFile, ListQuery, Product, ProductPayload, ProductsResponse};

use super::{CatalogError, ProductsApi};

/// Per-endpoint call counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub list: AtomicUsize,
    pub get: AtomicUsize,
    pub create: AtomicUsize,
    pub update: AtomicUsize,
    pub upload: AtomicUsize,
}

impl Calls {
    pub fn list(&self) -> usize {
        self.list.load(Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.get.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.create.load(Ordering::SeqCst) + self.update.load(Ordering::SeqCst)
    }

    pub fn upload(&self) -> usize {
        self.upload.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.list() + self.get() + self.writes() + self.upload()
    }
}

/// Fake backend holding products in a map.
///
/// Lookups match on id or slug. Created products get sequential ids, uploads
/// return `stored-{file_name}`.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Calls,
    products: Mutex<Vec<Product>>,
    next_id: AtomicUsize,
    failing_uploads: Mutex<HashSet<String>>,
    fail_writes: Mutex<bool>,
    payloads: Mutex<HashMap<String, ProductPayload>>,
}

impl FakeApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            next_id: AtomicUsize::new(100),
            ..Self::default()
        }
    }

    pub fn fail_upload_of(&self, file_name: &str) {
        self.failing_uploads
            .lock()
            .unwrap()
            .insert(file_name.to_string());
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    /// Last payload received for `id` (`"created"` for creates).
    pub fn last_payload(&self, id: &str) -> Option<ProductPayload> {
        self.payloads.lock().unwrap().get(id).cloned()
    }

    fn write_error() -> CatalogError {
        CatalogError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "rejected".to_string(),
        }
    }
}

#[async_trait]
impl ProductsApi for FakeApi {
    async fn list_products(&self, query: &ListQuery) -> Result<ProductsResponse, CatalogError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        let products = self.products.lock().unwrap();
        let page: Vec<Product> = products
            .iter()
            .filter(|p| query.gender.is_empty() || p.gender.as_str() == query.gender)
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(ProductsResponse {
            count: products.len() as u64,
            pages: 1,
            products: page,
        })
    }

    async fn get_product(&self, id_or_slug: &str) -> Result<Product, CatalogError> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id_or_slug || p.slug == id_or_slug)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("product {id_or_slug}")))
    }

    async fn create_product(&self, payload: &ProductPayload) -> Result<Product, CatalogError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        if *self.fail_writes.lock().unwrap() {
            return Err(Self::write_error());
        }
        let mut product = Product::draft();
        product.id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        payload.apply_to(&mut product);
        self.payloads
            .lock()
            .unwrap()
            .insert("created".to_string(), payload.clone());
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<Product, CatalogError> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        if *self.fail_writes.lock().unwrap() {
            return Err(Self::write_error());
        }
        self.payloads
            .lock()
            .unwrap()
            .insert(id.to_string(), payload.clone());
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;
        payload.apply_to(product);
        Ok(product.clone())
    }

    async fn upload_image(&self, file: &ImageFile) -> Result<String, CatalogError> {
        self.calls.upload.fetch_add(1, Ordering::SeqCst);
        if self.failing_uploads.lock().unwrap().contains(&file.file_name) {
            return Err(CatalogError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "disk full".to_string(),
            });
        }
        Ok(format!("stored-{}", file.file_name))
    }
}

/// A product with the given id, title and slug `slug-{id}`.
pub fn product(id: &str, title: &str) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        slug: format!("slug-{id}"),
        ..Product::draft()
    }
}
