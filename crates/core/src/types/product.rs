//! Product domain types as exchanged with the Teslo products API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a product that has not been persisted yet.
pub const DRAFT_PRODUCT_ID: &str = "new";

/// Size labels a product can be offered in, in display order.
pub const SIZE_CATALOG: &[&str] = &["XS", "S", "M", "L", "XL", "XXL"];

/// Returns `true` if `id` is the draft sentinel.
#[must_use]
pub fn is_draft_id(id: &str) -> bool {
    id == DRAFT_PRODUCT_ID
}

// =============================================================================
// Gender
// =============================================================================

/// Audience category a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Men,
    Women,
    Kid,
    Unisex,
}

impl Gender {
    /// All categories, in catalog order.
    pub const ALL: [Self; 4] = [Self::Men, Self::Women, Self::Kid, Self::Unisex];

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
            Self::Kid => "kid",
            Self::Unisex => "unisex",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`Gender`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid gender: {0} (expected men, women, kid or unisex)")]
pub struct ParseGenderError(pub String);

impl std::str::FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "men" => Ok(Self::Men),
            "women" => Ok(Self::Women),
            "kid" => Ok(Self::Kid),
            "unisex" => Ok(Self::Unisex),
            _ => Err(ParseGenderError(s.to_string())),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// The user a product belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductOwner {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub roles: Vec<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID, or [`DRAFT_PRODUCT_ID`] for an unsaved draft.
    pub id: String,
    pub title: String,
    /// Unit price, sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    /// URL-safe token used in storefront links.
    pub slug: String,
    pub stock: u32,
    /// Size labels from [`SIZE_CATALOG`].
    #[serde(default)]
    pub sizes: Vec<String>,
    pub gender: Gender,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Stored image file names, in display order.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ProductOwner>,
}

impl Product {
    /// The canonical empty draft handed out for [`DRAFT_PRODUCT_ID`].
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: DRAFT_PRODUCT_ID.to_string(),
            title: String::new(),
            price: Decimal::ZERO,
            description: String::new(),
            slug: String::new(),
            stock: 0,
            sizes: Vec::new(),
            gender: Gender::Men,
            tags: Vec::new(),
            images: Vec::new(),
            user: None,
        }
    }

    /// Returns `true` if this product has not been persisted yet.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        is_draft_id(&self.id)
    }
}

/// One page of products from the list endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductsResponse {
    /// Total number of products matching the query.
    #[serde(default)]
    pub count: u64,
    /// Total number of pages at the requested page size.
    #[serde(default)]
    pub pages: u64,
    pub products: Vec<Product>,
}

impl ProductsResponse {
    /// Returns `true` if a product with `id` is on this page.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    /// Replace every product with the same id as `product`, leaving the rest in place.
    ///
    /// Returns the number of entries replaced.
    pub fn replace_product(&mut self, product: &Product) -> usize {
        let mut replaced = 0;
        for current in &mut self.products {
            if current.id == product.id {
                current.clone_from(product);
                replaced += 1;
            }
        }
        replaced
    }
}

// =============================================================================
// Payload
// =============================================================================

/// Partial product sent on create and update.
///
/// Absent fields are omitted from the request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ProductPayload {
    /// Append uploaded file names after the images already on the payload.
    #[must_use]
    pub fn with_uploaded_images(mut self, uploaded: Vec<String>) -> Self {
        let mut images = self.images.take().unwrap_or_default();
        images.extend(uploaded);
        self.images = Some(images);
        self
    }

    /// Overwrite the fields of `product` that are present on the payload, the
    /// way the API merges a `PATCH`. Only for fake backends in tests.
    #[cfg(any(test, feature = "testing"))]
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(slug) = &self.slug {
            product.slug.clone_from(slug);
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(sizes) = &self.sizes {
            product.sizes.clone_from(sizes);
        }
        if let Some(gender) = self.gender {
            product.gender = gender;
        }
        if let Some(tags) = &self.tags {
            product.tags.clone_from(tags);
        }
        if let Some(images) = &self.images {
            product.images.clone_from(images);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: &str, title: &str) -> Product {
        Product {
            id: id.to_string(),
            title: title.to_string(),
            ..Product::draft()
        }
    }

    #[test]
    fn test_gender_round_trips_through_str() {
        for gender in Gender::ALL {
            assert_eq!(gender.as_str().parse::<Gender>().unwrap(), gender);
        }
        assert!("children".parse::<Gender>().is_err());
    }

    #[test]
    fn test_draft_is_canonical() {
        let draft = Product::draft();
        assert!(draft.is_draft());
        assert_eq!(draft.gender, Gender::Men);
        assert!(draft.images.is_empty());
        assert!(draft.user.is_none());
        assert_eq!(draft, Product::draft());
    }

    #[test]
    fn test_product_deserializes_api_shape() {
        let json = r#"{
            "id": "5",
            "title": "Men's Chill Crew Neck Sweatshirt",
            "price": 75,
            "description": "Cozy",
            "slug": "mens_chill_crew_neck_sweatshirt",
            "stock": 7,
            "sizes": ["XS", "S"],
            "gender": "men",
            "tags": ["sweatshirt"],
            "images": ["1740176-00-A_0_2000.jpg"],
            "user": {"id": "u1", "email": "admin@example.com", "fullName": "Admin", "isActive": true, "roles": ["admin"]}
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Decimal::from(75));
        assert_eq!(product.gender, Gender::Men);
        assert_eq!(product.user.unwrap().full_name, "Admin");
    }

    #[test]
    fn test_price_serializes_as_number() {
        let mut p = product("1", "Tee");
        p.price = Decimal::new(1999, 2);
        let value = serde_json::to_value(&p).unwrap();
        assert!(value["price"].is_number());
        assert!((value["price"].as_f64().unwrap() - 19.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_payload_omits_absent_fields() {
        let payload = ProductPayload {
            title: Some("Tee".to_string()),
            ..ProductPayload::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({ "title": "Tee" }));
    }

    #[test]
    fn test_with_uploaded_images_appends_after_existing() {
        let payload = ProductPayload {
            images: Some(vec!["a.jpg".to_string(), "b.jpg".to_string()]),
            ..ProductPayload::default()
        };
        let merged = payload.with_uploaded_images(vec!["c.jpg".to_string()]);
        assert_eq!(
            merged.images.unwrap(),
            vec!["a.jpg".to_string(), "b.jpg".to_string(), "c.jpg".to_string()]
        );

        let merged = ProductPayload::default().with_uploaded_images(vec![]);
        assert_eq!(merged.images, Some(vec![]));
    }

    #[test]
    fn test_apply_to_only_touches_present_fields() {
        let mut target = product("5", "Tee");
        target.tags = vec!["old".to_string()];
        let payload = ProductPayload {
            title: Some("Renamed".to_string()),
            stock: Some(9),
            ..ProductPayload::default()
        };

        payload.apply_to(&mut target);

        assert_eq!(target.title, "Renamed");
        assert_eq!(target.stock, 9);
        assert_eq!(target.tags, vec!["old".to_string()]);
        assert_eq!(target.id, "5");
    }

    #[test]
    fn test_replace_product_leaves_other_entries() {
        let mut page = ProductsResponse {
            count: 3,
            pages: 1,
            products: vec![product("4", "a"), product("5", "b"), product("6", "c")],
        };

        let replaced = page.replace_product(&product("5", "updated"));

        assert_eq!(replaced, 1);
        assert_eq!(page.products[0].title, "a");
        assert_eq!(page.products[1].title, "updated");
        assert_eq!(page.products[2].title, "c");
        assert!(page.contains("5"));
        assert!(!page.contains("7"));
    }
}
