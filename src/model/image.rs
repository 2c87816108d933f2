//! Extracted image assets and content fingerprinting.

use crate::error::{Error, Result};
use crate::model::{ColorSpace, RawImage};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// One extracted visual asset, normalized and fingerprinted.
///
/// Two assets with equal fingerprints are semantically identical and are
/// collapsed to a single emitted asset by the session's dedup cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Object identifier this asset was first resolved from.
    pub object_id: String,

    /// Hex MD5 over the normalized RGB payload plus dimensions.
    pub fingerprint: String,

    /// Normalized RGB8 pixel payload (3 bytes per pixel, row-major).
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Source page number (1-indexed).
    pub page: u32,
}

impl ImageAsset {
    /// Normalize a raw image reference and compute its content fingerprint.
    ///
    /// Fails with [`Error::ImageDecode`] when the payload length does not
    /// match the declared dimensions and colour space.
    pub fn from_raw(raw: &RawImage, page: u32) -> Result<Self> {
        let data = normalize_pixels(raw, page)?;
        let fingerprint = fingerprint(&data, raw.width, raw.height);
        Ok(Self {
            object_id: raw.object_id.clone(),
            fingerprint,
            data,
            width: raw.width,
            height: raw.height,
            page,
        })
    }

    /// Suggested filename for persisting this asset.
    pub fn suggested_filename(&self) -> String {
        format!("fig_p{}_{}.ppm", self.page, &self.fingerprint[..8])
    }

    /// Encode the normalized payload as a binary PPM (P6) image.
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + self.data.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Size of the normalized payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Resolve the payload into canonical RGB8 so that visually identical images
/// arriving under different encodings collapse to one fingerprint.
fn normalize_pixels(raw: &RawImage, page: u32) -> Result<Vec<u8>> {
    let expected = raw.width as usize * raw.height as usize * raw.color_space.bytes_per_pixel();
    if raw.data.len() != expected {
        return Err(Error::ImageDecode {
            object_id: raw.object_id.clone(),
            page,
            reason: format!(
                "payload is {} bytes, expected {} for {}x{} {:?}",
                raw.data.len(),
                expected,
                raw.width,
                raw.height,
                raw.color_space
            ),
        });
    }

    let pixel_count = raw.width as usize * raw.height as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);

    match raw.color_space {
        ColorSpace::Rgb => rgb.extend_from_slice(&raw.data),
        ColorSpace::Gray => {
            for &g in &raw.data {
                rgb.extend_from_slice(&[g, g, g]);
            }
        }
        ColorSpace::Rgba => {
            // Composite over white, matching how the source tool flattened
            // transparency before saving.
            for px in raw.data.chunks_exact(4) {
                let a = px[3] as u16;
                for &c in &px[..3] {
                    let v = (c as u16 * a + 255 * (255 - a)) / 255;
                    rgb.push(v as u8);
                }
            }
        }
        ColorSpace::Cmyk => {
            for px in raw.data.chunks_exact(4) {
                let k = px[3] as u16;
                for &c in &px[..3] {
                    let v = (255 - c as u16) * (255 - k) / 255;
                    rgb.push(v as u8);
                }
            }
        }
    }

    Ok(rgb)
}

/// Deterministic hex fingerprint over normalized pixels and dimensions.
fn fingerprint(rgb: &[u8], width: u32, height: u32) -> String {
    let mut hasher = Md5::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(rgb);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_normalizes_to_rgb() {
        let raw = RawImage::new("g", vec![0, 128, 255, 7], 2, 2, ColorSpace::Gray);
        let asset = ImageAsset::from_raw(&raw, 1).unwrap();
        assert_eq!(asset.data.len(), 12);
        assert_eq!(&asset.data[..3], &[0, 0, 0]);
        assert_eq!(&asset.data[3..6], &[128, 128, 128]);
    }

    #[test]
    fn test_equal_content_equal_fingerprint() {
        // Same visual content under Gray and Rgb encodings.
        let gray = RawImage::new("a", vec![10, 20], 2, 1, ColorSpace::Gray);
        let rgb = RawImage::new("b", vec![10, 10, 10, 20, 20, 20], 2, 1, ColorSpace::Rgb);
        let fa = ImageAsset::from_raw(&gray, 1).unwrap().fingerprint;
        let fb = ImageAsset::from_raw(&rgb, 2).unwrap().fingerprint;
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_opaque_rgba_matches_rgb() {
        let rgba = RawImage::new("a", vec![9, 8, 7, 255], 1, 1, ColorSpace::Rgba);
        let rgb = RawImage::new("b", vec![9, 8, 7], 1, 1, ColorSpace::Rgb);
        let fa = ImageAsset::from_raw(&rgba, 1).unwrap().fingerprint;
        let fb = ImageAsset::from_raw(&rgb, 1).unwrap().fingerprint;
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_short_payload_is_decode_error() {
        let raw = RawImage::new("bad", vec![1, 2, 3], 4, 4, ColorSpace::Rgb);
        let err = ImageAsset::from_raw(&raw, 3).unwrap_err();
        assert!(matches!(err, Error::ImageDecode { page: 3, .. }));
    }

    #[test]
    fn test_ppm_header() {
        let raw = RawImage::new("p", vec![1, 2, 3], 1, 1, ColorSpace::Rgb);
        let asset = ImageAsset::from_raw(&raw, 1).unwrap();
        let ppm = asset.to_ppm();
        assert!(ppm.starts_with(b"P6\n1 1\n255\n"));
        assert!(asset.suggested_filename().starts_with("fig_p1_"));
        assert!(asset.suggested_filename().ends_with(".ppm"));
    }
}
