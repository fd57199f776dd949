//! Product edit workflow.
//!
//! A [`ProductEditor`] owns the form state for one product: field values,
//! touched flags, the selected size list, and image files staged for upload.
//! [`ProductEditor::submit`] validates, builds the payload and hands it to
//! the [`ProductCatalog`] as a create (draft products) or an update.
//!
//! # Example
//!
//! ```rust,ignore
//! let product = catalog.get_product_by_id("new").await?;
//! let mut editor = ProductEditor::new(product);
//!
//! editor.form_mut().title = "Cotton Tee".to_string();
//! editor.toggle_size("M");
//! editor.select_files(vec![ImageFile::new("front.jpg", bytes)]);
//!
//! match editor.submit(&catalog).await? {
//!     SubmitOutcome::Created { edit_path, .. } => println!("saved, now at {edit_path}"),
//!     SubmitOutcome::Updated(_) => {}
//!     SubmitOutcome::Invalid(_) => eprintln!("{:?}", editor.errors()),
//! }
//! ```

mod form;
mod staging;

pub use form::{FormField, ProductForm, Touched, error_messages, parse_tags};
pub use staging::{StagedImages, display_images};

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use validator::{Validate, ValidationErrors};

use teslo_core::{ImageFile, Product};

use crate::catalog::{CatalogError, ProductCatalog, ProductsApi};

/// How long the "saved" indicator stays up after a successful submit.
pub const SAVED_INDICATOR_DURATION: Duration = Duration::from_secs(3);

/// Errors returned by [`ProductEditor::submit`].
#[derive(Debug, Error)]
pub enum EditorError {
    /// Upload or save failed; the form keeps its values and staged files.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The form could not be turned into a payload.
    #[error("Invalid product form: {0}")]
    InvalidForm(#[from] ValidationErrors),
}

/// Result of a submit that reached a decision.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Validation failed. Every field is now touched; nothing was sent.
    Invalid(ValidationErrors),
    /// A draft was created. The editor now edits the stored product.
    Created { product: Product, edit_path: String },
    /// An existing product was updated.
    Updated(Product),
}

/// Admin path of the edit view for product `id`.
#[must_use]
pub fn edit_path(id: &str) -> String {
    format!("/admin/products/{id}")
}

/// Form state for editing one product.
#[derive(Debug, Clone)]
pub struct ProductEditor {
    product: Product,
    form: ProductForm,
    touched: Touched,
    staged: StagedImages,
    saved_at: Option<Instant>,
}

impl ProductEditor {
    /// Create an editor seeded from `product`.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            form: ProductForm::from(&product),
            product,
            touched: Touched::default(),
            staged: StagedImages::default(),
            saved_at: None,
        }
    }

    /// Reseed every field from `product`, dropping touched flags and staged files.
    pub fn initialize(&mut self, product: Product) {
        self.form = ProductForm::from(&product);
        self.product = product;
        self.touched.clear();
        self.staged.clear();
    }

    /// The product being edited, as last loaded or saved.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub const fn form(&self) -> &ProductForm {
        &self.form
    }

    /// Mutable access to the field values.
    pub const fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    pub fn touch(&mut self, field: FormField) {
        self.touched.mark(field);
    }

    #[must_use]
    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.is_touched(field)
    }

    pub fn toggle_size(&mut self, size: &str) {
        self.form.toggle_size(size);
    }

    /// Stage `files` for upload on the next submit, replacing any earlier selection.
    pub fn select_files(&mut self, files: Vec<ImageFile>) {
        debug!(files = files.len(), "Staging image files");
        self.staged.replace(files);
    }

    #[must_use]
    pub const fn staged(&self) -> &StagedImages {
        &self.staged
    }

    /// Stored images of the product followed by previews of staged files.
    #[must_use]
    pub fn display_images(&self) -> Vec<String> {
        display_images(&self.product.images, self.staged.previews())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.form.validate().is_ok()
    }

    /// Validation messages for touched fields only.
    #[must_use]
    pub fn errors(&self) -> Vec<(FormField, String)> {
        match self.form.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => error_messages(&errors)
                .into_iter()
                .filter(|(field, _)| self.touched.is_touched(*field))
                .collect(),
        }
    }

    /// Whether the "saved" indicator is currently up.
    #[must_use]
    pub fn was_saved(&self) -> bool {
        self.saved_at
            .is_some_and(|at| at.elapsed() < SAVED_INDICATOR_DURATION)
    }

    /// Validate and save the form.
    ///
    /// Marks every field touched. An invalid form yields
    /// [`SubmitOutcome::Invalid`] without any request. A valid form is sent
    /// along with the staged files: as a create when the product is a draft,
    /// otherwise as an update of the product's id. On success the "saved"
    /// indicator goes up for [`SAVED_INDICATOR_DURATION`].
    ///
    /// # Errors
    ///
    /// Returns an error if an upload or the save fails. The indicator is not
    /// raised and the form keeps its values and staged files.
    #[instrument(skip(self, catalog), fields(product_id = %self.product.id))]
    pub async fn submit<A: ProductsApi>(
        &mut self,
        catalog: &ProductCatalog<A>,
    ) -> Result<SubmitOutcome, EditorError> {
        self.touched.mark_all();

        if let Err(errors) = self.form.validate() {
            debug!(%errors, "Product form is invalid");
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let payload = self.form.to_payload()?;

        let outcome = if self.product.is_draft() {
            let product = catalog
                .create_product(payload, self.staged.files())
                .await?;
            info!(product_id = %product.id, "Product created from editor");
            let edit_path = edit_path(&product.id);
            self.initialize(product.clone());
            SubmitOutcome::Created { product, edit_path }
        } else {
            let product = catalog
                .update_product(&self.product.id, payload, self.staged.files())
                .await?;
            info!(product_id = %product.id, "Product updated from editor");
            SubmitOutcome::Updated(product)
        };

        self.saved_at = Some(Instant::now());
        Ok(outcome)
    }
}
