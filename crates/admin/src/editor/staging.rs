//! Locally staged image files awaiting upload.

use teslo_core::{ImageFile, new_local_preview};

/// Files picked for upload, each with a local preview reference.
#[derive(Debug, Clone, Default)]
pub struct StagedImages {
    files: Vec<ImageFile>,
    previews: Vec<String>,
}

impl StagedImages {
    /// Replace the staged set with `files`, generating a fresh preview for each.
    pub fn replace(&mut self, files: Vec<ImageFile>) {
        self.previews = files.iter().map(|_| new_local_preview()).collect();
        self.files = files;
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.previews.clear();
    }

    #[must_use]
    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    #[must_use]
    pub fn previews(&self) -> &[String] {
        &self.previews
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Images to show for a product being edited: stored images first, then
/// previews of the staged files.
#[must_use]
pub fn display_images(persisted: &[String], previews: &[String]) -> Vec<String> {
    persisted.iter().chain(previews).cloned().collect()
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use teslo_core::is_local_preview;

    use super::*;

    #[test]
    fn test_replace_discards_previous_selection() {
        let mut staged = StagedImages::default();
        staged.replace(vec![
            ImageFile::new("a.jpg", vec![1]),
            ImageFile::new("b.jpg", vec![2]),
        ]);
        let first_previews = staged.previews().to_vec();

        staged.replace(vec![ImageFile::new("c.jpg", vec![3])]);

        assert_eq!(staged.files().len(), 1);
        assert_eq!(staged.previews().len(), 1);
        assert!(!first_previews.contains(&staged.previews()[0]));
        assert!(staged.previews().iter().all(|p| is_local_preview(p)));
    }

    #[test]
    fn test_display_images_keeps_stored_first() {
        let persisted = vec!["a.jpg".to_string(), "b.jpg".to_string()];
        let previews = vec!["blob:1".to_string()];

        assert_eq!(
            display_images(&persisted, &previews),
            vec!["a.jpg", "b.jpg", "blob:1"]
        );
        assert_eq!(display_images(&persisted, &[]), persisted);
        assert!(display_images(&[], &[]).is_empty());
    }

    #[test]
    fn test_clear_empties_both_lists() {
        let mut staged = StagedImages::default();
        staged.replace(vec![ImageFile::new("a.jpg", vec![1])]);
        staged.clear();
        assert!(staged.is_empty());
        assert!(staged.previews().is_empty());
    }
}
