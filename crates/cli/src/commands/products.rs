//! Read-only product commands.

use serde::Serialize;

use teslo_admin::{AppError, CatalogError, ProductCatalog};
use teslo_core::{ListQuery, Product, resolve_first_image, resolve_image_url};

/// Print one page of products as JSON.
pub async fn list(
    catalog: &ProductCatalog,
    limit: Option<u32>,
    offset: Option<u32>,
    gender: Option<&str>,
) -> Result<(), AppError> {
    if limit == Some(0) {
        return Err(AppError::InvalidArgument(
            "limit must be greater than zero".to_string(),
        ));
    }

    let query = ListQuery::new(limit, offset, gender);
    tracing::debug!(%query, "Listing products");

    let page = catalog.list_products(query).await?;
    print_json(page.as_ref())
}

/// Print one product as JSON.
///
/// With `base_url`, stored image names are replaced by their URLs and a
/// product without images shows the placeholder.
pub async fn show(
    catalog: &ProductCatalog,
    id_or_slug: &str,
    base_url: Option<&str>,
) -> Result<(), AppError> {
    let mut product = catalog.get_product_by_slug_or_id(id_or_slug).await?;

    if let Some(base_url) = base_url {
        product.images = absolute_images(base_url, &product);
    }

    print_json(&product)
}

fn absolute_images(base_url: &str, product: &Product) -> Vec<String> {
    if product.images.is_empty() {
        return vec![resolve_first_image(base_url, &product.images)];
    }
    product
        .images
        .iter()
        .map(|image| resolve_image_url(base_url, Some(image)))
        .collect()
}

#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value).map_err(CatalogError::from)?;
    println!("{json}");
    Ok(())
}
