//! Product image files and display URL resolution.

use std::path::Path;

use uuid::Uuid;

/// Asset shown when a product has no image.
pub const NO_IMAGE_PLACEHOLDER: &str = "./assets/images/No_Image_Available.jpg";

/// Scheme prefix of locally generated preview references.
pub const LOCAL_PREVIEW_SCHEME: &str = "blob:";

/// A file picked for upload but not yet stored by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    /// Create an image file, deriving the content type from the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Returns `true` if `image` is a local preview rather than a stored file name.
#[must_use]
pub fn is_local_preview(image: &str) -> bool {
    image.starts_with(LOCAL_PREVIEW_SCHEME)
}

/// Generate a fresh local preview reference for a staged file.
#[must_use]
pub fn new_local_preview() -> String {
    format!("{LOCAL_PREVIEW_SCHEME}{}", Uuid::new_v4())
}

/// Resolve a single image value to a displayable URL.
///
/// Local previews pass through, stored names resolve under
/// `{base_url}/files/product/`, and `None` resolves to the placeholder.
#[must_use]
pub fn resolve_image_url(base_url: &str, image: Option<&str>) -> String {
    match image {
        None => NO_IMAGE_PLACEHOLDER.to_string(),
        Some(image) if is_local_preview(image) => image.to_string(),
        Some(image) => format!("{}/files/product/{image}", base_url.trim_end_matches('/')),
    }
}

/// Resolve the first image of a list, or the placeholder if the list is empty.
#[must_use]
pub fn resolve_first_image(base_url: &str, images: &[String]) -> String {
    resolve_image_url(base_url, images.first().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:3000/api";

    #[test]
    fn test_missing_image_resolves_to_placeholder() {
        assert_eq!(resolve_image_url(BASE, None), NO_IMAGE_PLACEHOLDER);
        assert_eq!(resolve_first_image(BASE, &[]), NO_IMAGE_PLACEHOLDER);
    }

    #[test]
    fn test_local_preview_passes_through() {
        let preview = "blob:5c0f4e5a-8d5e-4c57-9a43-3f1b0b6f1e0d";
        assert_eq!(resolve_image_url(BASE, Some(preview)), preview);
    }

    #[test]
    fn test_stored_name_resolves_under_files_endpoint() {
        assert_eq!(
            resolve_image_url(BASE, Some("shirt.jpg")),
            "http://localhost:3000/api/files/product/shirt.jpg"
        );
        assert_eq!(
            resolve_image_url("http://localhost:3000/api/", Some("shirt.jpg")),
            "http://localhost:3000/api/files/product/shirt.jpg"
        );
    }

    #[test]
    fn test_first_image_wins() {
        let images = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        assert_eq!(
            resolve_first_image(BASE, &images),
            "http://localhost:3000/api/files/product/a.jpg"
        );
    }

    #[test]
    fn test_new_local_preview_is_unique_preview() {
        let a = new_local_preview();
        let b = new_local_preview();
        assert!(is_local_preview(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(ImageFile::new("a.JPG", vec![]).content_type, "image/jpeg");
        assert_eq!(ImageFile::new("a.png", vec![]).content_type, "image/png");
        assert_eq!(
            ImageFile::new("notes", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_debug_hides_bytes() {
        let file = ImageFile::new("a.png", vec![1, 2, 3]);
        let debug = format!("{file:?}");
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }
}
