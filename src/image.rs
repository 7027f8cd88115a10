//! Image source resolution for ingredients and recipes
//!
//! A record can point at its image in several ways. Exactly one source wins:
//! a URL, then a stored file path (if the file still exists), then a
//! placeholder file named after the record id.

use crate::catalog::IngredientId;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The authoritative image for a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageSource {
    Url { url: String },
    File { path: PathBuf },
    Placeholder { path: PathBuf },
}

/// Pick the image to show for a record.
///
/// Returns `None` when nothing usable exists; drawing a substitute is left
/// to the caller.
pub fn resolve_image(
    id: &IngredientId,
    image_url: Option<&str>,
    image_path: Option<&str>,
    placeholder_dir: &Path,
) -> Option<ImageSource> {
    if let Some(url) = image_url.filter(|u| !u.is_empty()) {
        return Some(ImageSource::Url {
            url: url.to_string(),
        });
    }

    if let Some(path) = image_path.filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(ImageSource::File { path });
        }
        tracing::warn!(id = %id, path = %path.display(), "image path does not exist");
    }

    let placeholder = placeholder_dir.join(format!("{}.png", id));
    if placeholder.exists() {
        return Some(ImageSource::Placeholder { path: placeholder });
    }

    tracing::debug!(id = %id, "no image available");
    None
}
