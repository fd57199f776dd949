//! Teslo admin product management.
//!
//! Two layers:
//! - [`catalog`] talks to the products API and keeps two cache tiers
//!   (paginated lists and individual products) consistent after writes.
//! - [`editor`] holds the state of the product edit form and submits it
//!   through the catalog.
//!
//! # Configuration
//!
//! [`config::CatalogConfig::from_env`] reads `TESLO_API_BASE_URL` and the
//! optional cache and HTTP settings. See the [`config`] module.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;

pub use catalog::{CatalogError, ProductCatalog};
pub use config::CatalogConfig;
pub use editor::{ProductEditor, SubmitOutcome};
pub use error::AppError;
