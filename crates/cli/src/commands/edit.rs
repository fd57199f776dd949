//! Create and update commands.
//!
//! Both drive a [`ProductEditor`] the way the admin edit view does: load the
//! product (the draft for `create`), apply the field overrides, stage image
//! files and submit.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use teslo_admin::editor::FormField;
use teslo_admin::{AppError, ProductCatalog, ProductEditor, SubmitOutcome};
use teslo_core::{DRAFT_PRODUCT_ID, ImageFile, is_draft_id};

use super::products::print_json;
use crate::ProductFields;

/// Create a product from `fields` and print it.
pub async fn create(catalog: &ProductCatalog, fields: ProductFields) -> Result<(), AppError> {
    let draft = catalog.get_product_by_id(DRAFT_PRODUCT_ID).await?;
    submit(catalog, ProductEditor::new(draft), fields).await
}

/// Apply `fields` to product `id` and print the result.
pub async fn update(
    catalog: &ProductCatalog,
    id: &str,
    fields: ProductFields,
) -> Result<(), AppError> {
    if is_draft_id(id) {
        return Err(AppError::InvalidArgument(format!(
            "`{id}` is not a stored product, use `create`"
        )));
    }

    let product = catalog.get_product_by_id(id).await?;
    submit(catalog, ProductEditor::new(product), fields).await
}

async fn submit(
    catalog: &ProductCatalog,
    mut editor: ProductEditor,
    mut fields: ProductFields,
) -> Result<(), AppError> {
    let images = std::mem::take(&mut fields.images);
    apply_fields(&mut editor, fields);

    let files = read_images(&images).await?;
    if !files.is_empty() {
        editor.select_files(files);
    }

    match editor.submit(catalog).await? {
        SubmitOutcome::Invalid(_) => {
            for (field, message) in editor.errors() {
                tracing::error!(field = field.name(), "{message}");
            }
            Err(AppError::InvalidArgument(
                "product form is invalid".to_string(),
            ))
        }
        SubmitOutcome::Created { product, edit_path } => {
            tracing::info!(%edit_path, "Product created");
            print_json(&product)
        }
        SubmitOutcome::Updated(product) => print_json(&product),
    }
}

/// Write overrides into the form, marking each changed field touched.
fn apply_fields(editor: &mut ProductEditor, fields: ProductFields) {
    let ProductFields {
        title,
        description,
        slug,
        price,
        stock,
        gender,
        tags,
        sizes,
        images: _,
    } = fields;

    let form = editor.form_mut();
    let mut changed = Vec::new();

    if let Some(title) = title {
        form.title = title;
        changed.push(FormField::Title);
    }
    if let Some(description) = description {
        form.description = description;
        changed.push(FormField::Description);
    }
    if let Some(slug) = slug {
        form.slug = slug;
        changed.push(FormField::Slug);
    }
    if let Some(price) = price {
        form.price = price;
        changed.push(FormField::Price);
    }
    if let Some(stock) = stock {
        form.stock = stock;
        changed.push(FormField::Stock);
    }
    if let Some(gender) = gender {
        form.gender = gender;
        changed.push(FormField::Gender);
    }
    if let Some(tags) = tags {
        form.tags = tags;
        changed.push(FormField::Tags);
    }

    for size in &sizes {
        editor.toggle_size(size);
    }
    if !sizes.is_empty() {
        changed.push(FormField::Sizes);
    }

    for field in changed {
        editor.touch(field);
    }
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageFile>, AppError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await?;
        files.push(ImageFile::new(file_name(path)?, bytes));
    }
    Ok(files)
}

fn file_name(path: &Path) -> Result<&str, AppError> {
    path.file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| AppError::InvalidArgument(format!("not a file: {}", path.display())))
}
