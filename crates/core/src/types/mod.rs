//! Core types for the Teslo admin.
//!
//! This module provides the product catalog's domain concepts.

pub mod image;
pub mod product;
pub mod query;

pub use image::{
    ImageFile, LOCAL_PREVIEW_SCHEME, NO_IMAGE_PLACEHOLDER, is_local_preview, new_local_preview,
    resolve_first_image, resolve_image_url,
};
pub use product::{
    DRAFT_PRODUCT_ID, Gender, ParseGenderError, Product, ProductOwner, ProductPayload,
    ProductsResponse, SIZE_CATALOG, is_draft_id,
};
pub use query::{DEFAULT_LIMIT, ListQuery};
