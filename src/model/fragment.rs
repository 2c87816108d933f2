//! Raw fragment types produced by the page-extraction layer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One contiguous run of text on a page, with font and position metadata.
///
/// Fragments are immutable once produced by the extraction layer and are
/// owned by the page that produced them for the duration of one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// Text content of the run.
    pub text: String,

    /// Font family name as reported by the extraction layer.
    pub font_name: String,

    /// Font size in points.
    pub font_size: f32,

    /// Style flags for the run.
    #[serde(default)]
    pub style: FontStyle,

    /// Vertical order index within the page (reading order).
    pub order: u32,

    /// Leading whitespace columns, used for list nesting depth.
    #[serde(default)]
    pub indent: u32,
}

impl Fragment {
    /// Create a fragment with default style at the given order index.
    pub fn new(text: impl Into<String>, font_size: f32, order: u32) -> Self {
        Self {
            text: text.into(),
            font_name: String::new(),
            font_size,
            style: FontStyle::default(),
            order,
            indent: 0,
        }
    }

    /// Set the font family name.
    pub fn with_font(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    /// Set the style flags.
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the indentation column.
    pub fn with_indent(mut self, indent: u32) -> Self {
        self.indent = indent;
        self
    }

    /// Check if the fragment carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Style flags attached to a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontStyle {
    /// Bold text
    #[serde(default)]
    pub bold: bool,

    /// Italic text
    #[serde(default)]
    pub italic: bool,

    /// Underlined text
    #[serde(default)]
    pub underline: bool,
}

impl FontStyle {
    /// Check if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline
    }
}

/// Colour space of a raw image payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// One byte per pixel
    Gray,
    /// Three bytes per pixel
    Rgb,
    /// Four bytes per pixel with alpha
    Rgba,
    /// Four bytes per pixel, subtractive
    Cmyk,
}

impl ColorSpace {
    /// Bytes per pixel for this colour space.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Rgba => 4,
            ColorSpace::Cmyk => 4,
        }
    }
}

/// One raw image reference on a page, as handed over by the extraction layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawImage {
    /// Object identifier, unique within the source document.
    pub object_id: String,

    /// Raw pixel payload.
    #[serde(with = "serde_bytes_vec")]
    pub data: Vec<u8>,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,

    /// Colour space of the payload.
    pub color_space: ColorSpace,
}

impl RawImage {
    /// Create a raw image reference.
    pub fn new(
        object_id: impl Into<String>,
        data: Vec<u8>,
        width: u32,
        height: u32,
        color_space: ColorSpace,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            data,
            width,
            height,
            color_space,
        }
    }
}

// Raw payloads serialize as base64-free byte arrays; compact enough for the
// JSON interchange the CLI uses and lossless for tests.
mod serde_bytes_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_seq(data)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        Vec::<u8>::deserialize(de)
    }
}

/// All fragments and image references extracted from one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFragments {
    /// Page number (1-indexed).
    pub number: u32,

    /// Text fragments in reading order.
    pub fragments: Vec<Fragment>,

    /// Image references in reading order.
    #[serde(default)]
    pub images: Vec<RawImage>,
}

impl PageFragments {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            fragments: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Append a fragment.
    pub fn add_fragment(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Append an image reference.
    pub fn add_image(&mut self, image: RawImage) {
        self.images.push(image);
    }

    /// Check if the page has no content.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.images.is_empty()
    }
}

/// The full input to one conversion: ordered per-page fragments plus the
/// caller-supplied title fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentStream {
    /// Pages in ascending order.
    pub pages: Vec<PageFragments>,

    /// Default title used when no plausible candidate is found,
    /// typically derived from the source filename.
    pub default_title: String,
}

impl FragmentStream {
    /// Create a stream with the given title fallback.
    pub fn new(default_title: impl Into<String>) -> Self {
        Self {
            pages: Vec::new(),
            default_title: default_title.into(),
        }
    }

    /// Append a page.
    pub fn add_page(&mut self, page: PageFragments) {
        self.pages.push(page);
    }

    /// Total fragment count across all pages.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(|p| p.fragments.len()).sum()
    }

    /// Validate the reading-order invariant: pages strictly ascending,
    /// fragment order indices strictly ascending within each page.
    ///
    /// Conversion refuses to start on a stream that fails validation,
    /// so the emitter never has to abort mid-pass.
    pub fn validate(&self) -> Result<()> {
        let mut last_page = 0u32;
        for (idx, page) in self.pages.iter().enumerate() {
            if page.number <= last_page {
                return Err(Error::MalformedFragmentStream {
                    page: idx as u32,
                    reason: format!(
                        "page number {} does not ascend past {}",
                        page.number, last_page
                    ),
                });
            }
            last_page = page.number;

            let mut last_order: Option<u32> = None;
            for frag in &page.fragments {
                if let Some(prev) = last_order {
                    if frag.order <= prev {
                        return Err(Error::MalformedFragmentStream {
                            page: idx as u32,
                            reason: format!(
                                "fragment order index {} does not ascend past {}",
                                frag.order, prev
                            ),
                        });
                    }
                }
                last_order = Some(frag.order);
            }
        }
        Ok(())
    }
}
