//! Content-source image references.
//!
//! Catalog records carry an image object pointing at an uploaded asset rather
//! than a URL. The asset reference encodes the asset id, its pixel dimensions
//! and its file format (`image-<id>-<W>x<H>-<format>`), which is enough to
//! build a CDN URL without another request.

use serde::{Deserialize, Serialize};

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Image object as stored on a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    #[serde(rename = "_type", default = "default_image_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<ImageAsset>,
}

/// Reference to an uploaded image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    #[serde(rename = "_ref", default)]
    pub reference: String,
    #[serde(rename = "_type", default = "default_reference_type")]
    pub kind: String,
}

/// Parsed components of an asset reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetParts<'a> {
    pub id: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: &'a str,
}

fn default_image_type() -> String {
    "image".to_string()
}

fn default_reference_type() -> String {
    "reference".to_string()
}

impl ImageReference {
    /// Build an image object from a raw asset reference string.
    #[must_use]
    pub fn from_asset_ref(reference: impl Into<String>) -> Self {
        Self {
            kind: default_image_type(),
            asset: Some(ImageAsset {
                reference: reference.into(),
                kind: default_reference_type(),
            }),
        }
    }

    /// Parse the asset reference, if present and well-formed.
    #[must_use]
    pub fn asset_parts(&self) -> Option<AssetParts<'_>> {
        let reference = self.asset.as_ref()?.reference.as_str();
        let rest = reference.strip_prefix("image-")?;

        let mut parts = rest.rsplitn(3, '-');
        let format = parts.next()?;
        let dimensions = parts.next()?;
        let id = parts.next()?;

        let (width, height) = dimensions.split_once('x')?;
        let width = width.parse().ok()?;
        let height = height.parse().ok()?;

        if id.is_empty() || format.is_empty() {
            return None;
        }

        Some(AssetParts {
            id,
            width,
            height,
            format,
        })
    }

    /// Resolve the CDN URL for this image.
    ///
    /// Returns `None` when the asset reference is missing or malformed; the
    /// caller renders a placeholder instead.
    #[must_use]
    pub fn url(&self, project_id: &str, dataset: &str) -> Option<String> {
        let parts = self.asset_parts()?;
        Some(format!(
            "{CDN_BASE}/{project_id}/{dataset}/{}-{}x{}.{}",
            parts.id, parts.width, parts.height, parts.format
        ))
    }

    /// Resolve the CDN URL with a requested display size.
    #[must_use]
    pub fn sized_url(&self, project_id: &str, dataset: &str, width: u32, height: u32) -> Option<String> {
        self.url(project_id, dataset)
            .map(|url| format!("{url}?w={width}&h={height}&fit=max"))
    }
}
