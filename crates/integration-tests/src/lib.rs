//! Integration tests for the Teslo admin catalog.
//!
//! [`MockApi`] serves the products API in-process on `127.0.0.1:0` with
//! `axum`, so the tests drive the real HTTP backend end to end without any
//! external service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p teslo-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let api = MockApi::start(vec![sample_product("5", "Tee")]).await;
//! let catalog = api.catalog();
//!
//! catalog.list_products(ListQuery::default()).await?;
//! assert_eq!(api.hits(Route::List), 1);
//! ```

#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation
)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use teslo_admin::config::CatalogConfig;
use teslo_admin::ProductCatalog;
use teslo_core::{DEFAULT_LIMIT, Product, ProductPayload, ProductsResponse};

/// Endpoints of the mock API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    List,
    Get,
    Create,
    Update,
    Upload,
}

/// A file received by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub len: usize,
}

#[derive(Default)]
struct MockState {
    products: Mutex<Vec<Product>>,
    hits: Mutex<HashMap<Route, usize>>,
    failing_uploads: Mutex<HashSet<String>>,
    uploads: Mutex<Vec<ReceivedFile>>,
    authorization: Mutex<Option<String>>,
    next_id: Mutex<u64>,
}

impl MockState {
    fn record(&self, route: Route, headers: &HeaderMap) {
        *self.hits.lock().unwrap().entry(route).or_default() += 1;
        *self.authorization.lock().unwrap() = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
    }
}

/// In-process products API.
///
/// The server task is aborted when the value is dropped.
pub struct MockApi {
    pub base_url: String,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Start a server holding `products`.
    pub async fn start(products: Vec<Product>) -> Self {
        let state = Arc::new(MockState {
            products: Mutex::new(products),
            next_id: Mutex::new(1000),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/api/products", get(list_products).post(create_product))
            .route("/api/products/{id}", get(get_product).patch(update_product))
            .route("/api/files/product", post(upload_file))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            server,
        }
    }

    /// Catalog configuration pointing at this server.
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig::new(&self.base_url).unwrap()
    }

    /// A fresh catalog over the real HTTP backend.
    pub fn catalog(&self) -> ProductCatalog {
        ProductCatalog::new(&self.config()).unwrap()
    }

    /// Number of requests received on `route`.
    pub fn hits(&self, route: Route) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(&route)
            .copied()
            .unwrap_or_default()
    }

    /// Requests received on the create and update endpoints.
    pub fn writes(&self) -> usize {
        self.hits(Route::Create) + self.hits(Route::Update)
    }

    /// Make uploads of `file_name` answer 500.
    pub fn fail_upload_of(&self, file_name: &str) {
        self.state
            .failing_uploads
            .lock()
            .unwrap()
            .insert(file_name.to_string());
    }

    /// Files accepted by the upload endpoint, in arrival order.
    pub fn uploads(&self) -> Vec<ReceivedFile> {
        self.state.uploads.lock().unwrap().clone()
    }

    /// `Authorization` header of the most recent request.
    pub fn last_authorization(&self) -> Option<String> {
        self.state.authorization.lock().unwrap().clone()
    }

    /// The server-side copy of product `id`.
    pub fn stored(&self, id: &str) -> Option<Product> {
        self.state
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Change a product behind the catalog's back.
    pub fn set_title(&self, id: &str, title: &str) {
        if let Some(product) = self
            .state
            .products
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == id)
        {
            product.title = title.to_string();
        }
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A valid product with slug `product_{id}`.
pub fn sample_product(id: &str, title: &str) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        slug: format!("product_{id}"),
        stock: 5,
        ..Product::draft()
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<usize>,
    offset: Option<usize>,
    #[serde(default)]
    gender: String,
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{what} not found"), "statusCode": 404 })),
    )
        .into_response()
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Json<ProductsResponse> {
    state.record(Route::List, &headers);

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT as usize);
    let products = state.products.lock().unwrap();
    let matching: Vec<&Product> = products
        .iter()
        .filter(|p| params.gender.is_empty() || p.gender.as_str() == params.gender)
        .collect();

    Json(ProductsResponse {
        count: matching.len() as u64,
        pages: matching.len().div_ceil(limit.max(1)) as u64,
        products: matching
            .into_iter()
            .skip(params.offset.unwrap_or_default())
            .take(limit)
            .cloned()
            .collect(),
    })
}

async fn get_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id_or_slug): Path<String>,
) -> Response {
    state.record(Route::Get, &headers);

    state
        .products
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.id == id_or_slug || p.slug == id_or_slug)
        .cloned()
        .map_or_else(
            || not_found(&format!("Product {id_or_slug}")),
            |p| Json(p).into_response(),
        )
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(payload): Json<ProductPayload>,
) -> Json<Product> {
    state.record(Route::Create, &headers);

    let id = {
        let mut next = state.next_id.lock().unwrap();
        *next += 1;
        next.to_string()
    };
    let mut product = Product {
        id,
        ..Product::draft()
    };
    payload.apply_to(&mut product);
    state.products.lock().unwrap().push(product.clone());
    Json(product)
}

async fn update_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Response {
    state.record(Route::Update, &headers);

    let mut products = state.products.lock().unwrap();
    let Some(product) = products.iter_mut().find(|p| p.id == id) else {
        return not_found(&format!("Product {id}"));
    };
    payload.apply_to(product);
    Json(product.clone()).into_response()
}

async fn upload_file(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.record(Route::Upload, &headers);

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(ToString::to_string);
        let Ok(bytes) = field.bytes().await else {
            return StatusCode::BAD_REQUEST.into_response();
        };

        if state.failing_uploads.lock().unwrap().contains(&file_name) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "disk full").into_response();
        }

        state.uploads.lock().unwrap().push(ReceivedFile {
            file_name: file_name.clone(),
            content_type,
            len: bytes.len(),
        });
        return Json(json!({ "fileName": format!("stored-{file_name}") })).into_response();
    }

    (StatusCode::BAD_REQUEST, "Make sure that the file is an image").into_response()
}
