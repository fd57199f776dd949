//! Editable product form values and their validation rules.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use validator::{Validate, ValidationError, ValidationErrors};

use teslo_core::{Gender, Product, ProductPayload, SIZE_CATALOG};

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+(?:-[a-z0-9_]+)*$").expect("Invalid regex"));

/// Fields of the product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Description,
    Slug,
    Price,
    Stock,
    Sizes,
    Images,
    Tags,
    Gender,
}

impl FormField {
    pub const ALL: [Self; 9] = [
        Self::Title,
        Self::Description,
        Self::Slug,
        Self::Price,
        Self::Stock,
        Self::Sizes,
        Self::Images,
        Self::Tags,
        Self::Gender,
    ];

    /// Name used in validation errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Slug => "slug",
            Self::Price => "price",
            Self::Stock => "stock",
            Self::Sizes => "sizes",
            Self::Images => "images",
            Self::Tags => "tags",
            Self::Gender => "gender",
        }
    }
}

/// Raw form values, as typed by the user.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(range(
        min = 0_i64,
        max = 4_294_967_295_i64,
        message = "Stock must be between 0 and 4294967295"
    ))]
    pub stock: i64,
    #[validate(custom(function = "validate_sizes"))]
    pub sizes: Vec<String>,
    pub images: Vec<String>,
    /// Comma-delimited tags.
    pub tags: String,
    #[validate(custom(function = "validate_gender"))]
    pub gender: String,
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            slug: product.slug.clone(),
            price: product.price,
            stock: i64::from(product.stock),
            sizes: product.sizes.clone(),
            images: product.images.clone(),
            tags: product.tags.join(","),
            gender: product.gender.as_str().to_string(),
        }
    }
}

impl ProductForm {
    /// Add `size` if absent (at the end), remove it if present (keeping the
    /// order of the rest).
    pub fn toggle_size(&mut self, size: &str) {
        match self.sizes.iter().position(|s| s == size) {
            Some(index) => {
                self.sizes.remove(index);
            }
            None => self.sizes.push(size.to_string()),
        }
    }

    /// Build the save payload from valid form values.
    ///
    /// # Errors
    ///
    /// Returns the validation errors if the form is invalid.
    pub fn to_payload(&self) -> Result<ProductPayload, ValidationErrors> {
        self.validate()?;

        // Both conversions are guaranteed by the validation above.
        let gender = self.gender.parse::<Gender>().ok();
        let stock = u32::try_from(self.stock).ok();

        Ok(ProductPayload {
            title: Some(self.title.clone()),
            price: Some(self.price),
            description: Some(self.description.clone()),
            slug: Some(self.slug.clone()),
            stock,
            sizes: Some(self.sizes.clone()),
            gender,
            tags: Some(parse_tags(&self.tags)),
            images: Some(self.images.clone()),
        })
    }
}

/// Lower-case, split on commas and trim each tag.
///
/// Empty tags are kept: `"a,,b"` yields `["a", "", "b"]`.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(',')
        .map(|tag| tag.trim().to_string())
        .collect()
}

/// Per-field "touched" flags; errors are only shown for touched fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Touched(HashSet<FormField>);

impl Touched {
    pub fn mark(&mut self, field: FormField) {
        self.0.insert(field);
    }

    pub fn mark_all(&mut self) {
        self.0.extend(FormField::ALL);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn is_touched(&self, field: FormField) -> bool {
        self.0.contains(&field)
    }

    #[must_use]
    pub fn all(&self) -> bool {
        FormField::ALL.iter().all(|f| self.0.contains(f))
    }
}

/// First error message for each field that has one.
#[must_use]
pub fn error_messages(errors: &ValidationErrors) -> Vec<(FormField, String)> {
    let field_errors = errors.field_errors();
    FormField::ALL
        .into_iter()
        .filter_map(|field| {
            let error = field_errors.get(field.name())?.first()?;
            let message = error
                .message
                .as_ref()
                .map_or_else(|| format!("Invalid {}", field.name()), ToString::to_string);
            Some((field, message))
        })
        .collect()
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(
            ValidationError::new("required").with_message(Cow::Borrowed("Slug is required"))
        );
    }
    if !SLUG_RE.is_match(slug) {
        return Err(ValidationError::new("pattern").with_message(Cow::Borrowed(
            "Slug may only contain lowercase letters, digits, underscores and single dashes",
        )));
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("range")
            .with_message(Cow::Borrowed("Price cannot be negative")));
    }
    Ok(())
}

fn validate_sizes(sizes: &[String]) -> Result<(), ValidationError> {
    if sizes.iter().all(|size| SIZE_CATALOG.contains(&size.as_str())) {
        return Ok(());
    }
    Err(ValidationError::new("size")
        .with_message(Cow::Borrowed("Sizes must be XS, S, M, L, XL or XXL")))
}

fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    gender.parse::<Gender>().map(|_| ()).map_err(|_| {
        ValidationError::new("pattern")
            .with_message(Cow::Borrowed("Gender must be men, women, kid or unisex"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            title: "Tee".to_string(),
            description: "Cotton tee".to_string(),
            slug: "cotton_tee".to_string(),
            price: Decimal::new(1999, 2),
            stock: 3,
            sizes: vec!["M".to_string()],
            images: vec!["a.jpg".to_string()],
            tags: "shirt".to_string(),
            gender: "unisex".to_string(),
        }
    }

    #[test]
    fn test_parse_tags_lowercases_and_trims() {
        assert_eq!(parse_tags("A, b ,C"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_tags_keeps_empty_tags() {
        assert_eq!(parse_tags("a,,b"), vec!["a", "", "b"]);
        assert_eq!(parse_tags(""), vec![""]);
    }

    #[test]
    fn test_toggle_size_is_its_own_inverse() {
        let mut form = valid_form();
        form.sizes = vec!["S".to_string(), "M".to_string(), "L".to_string()];
        let original = form.sizes.clone();

        // Absent sizes come back out exactly.
        form.toggle_size("XL");
        form.toggle_size("XL");
        assert_eq!(form.sizes, original);

        // Present sizes come back as the same set, re-appended at the end.
        for size in ["M", "S", "L"] {
            form.toggle_size(size);
            form.toggle_size(size);
            let mut now = form.sizes.clone();
            let mut expected = original.clone();
            now.sort();
            expected.sort();
            assert_eq!(now, expected);
            assert_eq!(form.sizes.last().map(String::as_str), Some(size));
        }
    }

    #[test]
    fn test_toggle_size_removes_positionally_and_appends() {
        let mut form = valid_form();
        form.sizes = vec!["S".to_string(), "M".to_string(), "L".to_string()];

        form.toggle_size("M");
        assert_eq!(form.sizes, vec!["S", "L"]);

        form.toggle_size("M");
        assert_eq!(form.sizes, vec!["S", "L", "M"]);
    }

    #[test]
    fn test_form_from_product_joins_tags() {
        let product = Product {
            tags: vec!["shirt".to_string(), "summer".to_string()],
            stock: 4,
            ..Product::draft()
        };
        let form = ProductForm::from(&product);
        assert_eq!(form.tags, "shirt,summer");
        assert_eq!(form.stock, 4);
        assert_eq!(form.gender, "men");
    }

    #[test]
    fn test_valid_form_builds_payload() {
        let mut form = valid_form();
        form.tags = "Shirt, Summer ".to_string();

        let payload = form.to_payload().unwrap();

        assert_eq!(payload.title.as_deref(), Some("Tee"));
        assert_eq!(payload.stock, Some(3));
        assert_eq!(payload.gender, Some(Gender::Unisex));
        assert_eq!(payload.tags.unwrap(), vec!["shirt", "summer"]);
        assert_eq!(payload.images.unwrap(), vec!["a.jpg"]);
    }

    #[test]
    fn test_invalid_fields_are_reported() {
        let form = ProductForm {
            title: String::new(),
            slug: "Not A Slug".to_string(),
            price: Decimal::new(-1, 0),
            stock: -2,
            gender: "children".to_string(),
            ..valid_form()
        };

        let errors = form.validate().unwrap_err();
        let fields: Vec<FormField> = error_messages(&errors)
            .into_iter()
            .map(|(field, _)| field)
            .collect();

        assert_eq!(
            fields,
            vec![
                FormField::Title,
                FormField::Slug,
                FormField::Price,
                FormField::Stock,
                FormField::Gender,
            ]
        );
        assert!(form.to_payload().is_err());
    }

    #[test]
    fn test_slug_pattern() {
        assert!(validate_slug("mens_chill_crew_neck_sweatshirt").is_ok());
        assert!(validate_slug("kids-tee-2").is_ok());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("Upper").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_stock_upper_bound() {
        let at_max = ProductForm {
            stock: i64::from(u32::MAX),
            ..valid_form()
        };
        assert_eq!(at_max.to_payload().unwrap().stock, Some(u32::MAX));

        let too_large = ProductForm {
            stock: i64::from(u32::MAX) + 1,
            ..valid_form()
        };
        let errors = too_large.to_payload().unwrap_err();
        let fields: Vec<FormField> = error_messages(&errors)
            .into_iter()
            .map(|(field, _)| field)
            .collect();
        assert_eq!(fields, vec![FormField::Stock]);
    }

    #[test]
    fn test_sizes_outside_catalog_are_rejected() {
        let mut form = valid_form();
        form.toggle_size("banana");

        let errors = form.validate().unwrap_err();
        let fields: Vec<FormField> = error_messages(&errors)
            .into_iter()
            .map(|(field, _)| field)
            .collect();
        assert_eq!(fields, vec![FormField::Sizes]);

        form.toggle_size("banana");
        form.toggle_size("XXL");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_zero_price_and_stock_are_valid() {
        let form = ProductForm {
            price: Decimal::ZERO,
            stock: 0,
            ..valid_form()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_touched_flags() {
        let mut touched = Touched::default();
        assert!(!touched.is_touched(FormField::Title));

        touched.mark(FormField::Title);
        assert!(touched.is_touched(FormField::Title));
        assert!(!touched.all());

        touched.mark_all();
        assert!(touched.all());

        touched.clear();
        assert!(!touched.is_touched(FormField::Title));
    }
}
