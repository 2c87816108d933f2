//! Conversion output types: document, manifest, and counters.

use crate::model::{DocumentMetadata, ImageAsset};
use serde::{Deserialize, Serialize};

/// Everything one conversion produces.
#[derive(Debug, Clone)]
pub struct EmitResult {
    /// The complete LaTeX document, preamble included.
    pub latex: String,

    /// Inferred document metadata.
    pub metadata: DocumentMetadata,

    /// Manifest of emitted image assets.
    pub manifest: AssetManifest,

    /// Conversion counters.
    pub stats: ConversionStats,

    /// The emitted assets, in manifest order.
    pub assets: Vec<ImageAsset>,
}

/// Manifest of the image assets a conversion emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// One entry per emitted asset, in emission order.
    pub entries: Vec<ManifestEntry>,

    /// True when at least one image payload failed to decode; the document
    /// carries placeholders for the missing figures.
    pub truncated: bool,
}

impl AssetManifest {
    /// Number of emitted assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no assets were emitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One emitted asset in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Filename the asset should be persisted under.
    pub filename: String,

    /// Content fingerprint.
    pub fingerprint: String,

    /// First source page the asset appeared on.
    pub page: u32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl ManifestEntry {
    /// Build an entry from an emitted asset.
    pub fn from_asset(asset: &ImageAsset) -> Self {
        Self {
            filename: asset.suggested_filename(),
            fingerprint: asset.fingerprint.clone(),
            page: asset.page,
            width: asset.width,
            height: asset.height,
        }
    }
}

/// Counters accumulated over one conversion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages consumed.
    pub pages: u32,

    /// Fragments consumed.
    pub fragments: u32,

    /// Paragraph blocks emitted.
    pub paragraphs: u32,

    /// Heading blocks emitted.
    pub headings: u32,

    /// Display-math groups emitted.
    pub math_groups: u32,

    /// Inline-math spans emitted.
    pub inline_math_spans: u32,

    /// List items emitted.
    pub list_items: u32,

    /// Figures emitted.
    pub figures: u32,

    /// Duplicate image references collapsed.
    pub duplicate_images: u32,

    /// Image payloads that failed to decode.
    pub image_failures: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorSpace, RawImage};

    #[test]
    fn test_manifest_entry_from_asset() {
        let raw = RawImage::new("obj1", vec![1, 2, 3], 1, 1, ColorSpace::Rgb);
        let asset = ImageAsset::from_raw(&raw, 2).unwrap();
        let entry = ManifestEntry::from_asset(&asset);
        assert_eq!(entry.page, 2);
        assert_eq!(entry.fingerprint, asset.fingerprint);
        assert!(entry.filename.starts_with("fig_p2_"));
    }

    #[test]
    fn test_manifest_default_not_truncated() {
        let manifest = AssetManifest::default();
        assert!(manifest.is_empty());
        assert!(!manifest.truncated);
    }
}
