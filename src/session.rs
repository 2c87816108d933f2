//! Per-document conversion session and image deduplication cache.

use crate::error::Result;
use crate::model::{ImageAsset, RawImage};
use std::collections::HashSet;

/// Session-scoped image deduplication cache.
///
/// Two levels: object identifiers (a document may reference one physical
/// image via many distinct ids, common for repeated bullets and icons) and
/// content fingerprints (visually identical images occasionally arrive under
/// different encodings). Both sets live and die with the session.
#[derive(Debug, Default)]
pub struct ImageDedupCache {
    seen_ids: HashSet<String>,
    seen_fingerprints: HashSet<String>,
}

impl ImageDedupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a raw image reference; returns the asset to emit, or `None`
    /// when it duplicates an already-emitted asset.
    ///
    /// An object id, once resolved, is never re-extracted; a fingerprint,
    /// once emitted, is never re-emitted even under a different id.
    pub fn offer(&mut self, raw: &RawImage, page: u32) -> Result<Option<ImageAsset>> {
        if self.seen_ids.contains(&raw.object_id) {
            log::debug!("skipping duplicate object id {} on page {}", raw.object_id, page);
            return Ok(None);
        }

        let asset = ImageAsset::from_raw(raw, page)?;

        if self.seen_fingerprints.contains(&asset.fingerprint) {
            log::debug!(
                "object id {} on page {} duplicates fingerprint {}",
                raw.object_id,
                page,
                asset.fingerprint
            );
            // Record the id so future references short-circuit above.
            self.seen_ids.insert(raw.object_id.clone());
            return Ok(None);
        }

        self.seen_ids.insert(raw.object_id.clone());
        self.seen_fingerprints.insert(asset.fingerprint.clone());
        Ok(Some(asset))
    }

    /// Number of distinct object ids resolved so far.
    pub fn seen_id_count(&self) -> usize {
        self.seen_ids.len()
    }

    /// Number of distinct fingerprints emitted so far.
    pub fn seen_fingerprint_count(&self) -> usize {
        self.seen_fingerprints.len()
    }
}

/// The scope of one document conversion.
///
/// Owns the dedup cache and the ordered list of persisted assets. Created at
/// the start of a conversion, discarded at the end; never shared across
/// documents or threads.
#[derive(Debug, Default)]
pub struct ConversionSession {
    cache: ImageDedupCache,
    assets: Vec<ImageAsset>,
    duplicates_skipped: u32,
    decode_failures: u32,
}

impl ConversionSession {
    /// Create a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an image for emission. Returns the manifest index of the asset
    /// when it is new, `None` for duplicates, and an error on decode failure
    /// (which the caller treats as recoverable).
    pub fn offer_image(&mut self, raw: &RawImage, page: u32) -> Result<Option<usize>> {
        match self.cache.offer(raw, page) {
            Ok(Some(asset)) => {
                self.assets.push(asset);
                Ok(Some(self.assets.len() - 1))
            }
            Ok(None) => {
                self.duplicates_skipped += 1;
                Ok(None)
            }
            Err(err) => {
                self.decode_failures += 1;
                Err(err)
            }
        }
    }

    /// Persisted assets in emission order.
    pub fn assets(&self) -> &[ImageAsset] {
        &self.assets
    }

    /// Consume the session, yielding the assets in emission order.
    pub fn into_assets(self) -> Vec<ImageAsset> {
        self.assets
    }

    /// How many duplicate references were collapsed.
    pub fn duplicates_skipped(&self) -> u32 {
        self.duplicates_skipped
    }

    /// How many image payloads failed to decode.
    pub fn decode_failures(&self) -> u32 {
        self.decode_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorSpace;

    fn pixel(id: &str, value: u8) -> RawImage {
        RawImage::new(id, vec![value, value, value], 1, 1, ColorSpace::Rgb)
    }

    #[test]
    fn test_same_id_offered_once() {
        let mut cache = ImageDedupCache::new();
        assert!(cache.offer(&pixel("a", 1), 1).unwrap().is_some());
        assert!(cache.offer(&pixel("a", 1), 1).unwrap().is_none());
        assert_eq!(cache.seen_fingerprint_count(), 1);
    }

    #[test]
    fn test_same_content_different_id() {
        let mut cache = ImageDedupCache::new();
        assert!(cache.offer(&pixel("a", 7), 1).unwrap().is_some());
        // Identical content under a new id on another page: suppressed.
        assert!(cache.offer(&pixel("b", 7), 4).unwrap().is_none());
        // And the new id is now known, so re-offering short-circuits.
        assert!(cache.offer(&pixel("b", 7), 4).unwrap().is_none());
        assert_eq!(cache.seen_id_count(), 2);
        assert_eq!(cache.seen_fingerprint_count(), 1);
    }

    #[test]
    fn test_distinct_content_both_emitted() {
        let mut cache = ImageDedupCache::new();
        assert!(cache.offer(&pixel("a", 1), 1).unwrap().is_some());
        assert!(cache.offer(&pixel("b", 2), 1).unwrap().is_some());
        assert_eq!(cache.seen_fingerprint_count(), 2);
    }

    #[test]
    fn test_session_counts() {
        let mut session = ConversionSession::new();
        assert_eq!(session.offer_image(&pixel("a", 1), 1).unwrap(), Some(0));
        assert_eq!(session.offer_image(&pixel("b", 1), 2).unwrap(), None);
        assert_eq!(session.duplicates_skipped(), 1);

        let bad = RawImage::new("broken", vec![1], 4, 4, ColorSpace::Rgb);
        assert!(session.offer_image(&bad, 3).is_err());
        assert_eq!(session.decode_failures(), 1);
        assert_eq!(session.assets().len(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = ConversionSession::new();
        first.offer_image(&pixel("a", 1), 1).unwrap();
        drop(first);

        // A fresh session has no memory of the previous one.
        let mut second = ConversionSession::new();
        assert_eq!(second.offer_image(&pixel("a", 1), 1).unwrap(), Some(0));
    }
}
