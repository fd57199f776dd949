//! Teslo Core - Shared types library.
//!
//! This crate provides the product types used across all Teslo admin components:
//! - `admin` - Catalog service and product editor
//! - `cli` - Command-line tools for listing and editing products
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no caches. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Products, list queries, upload files and image URL resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
