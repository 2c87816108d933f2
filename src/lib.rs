//! # texforge
//!
//! Reconstructs structured LaTeX documents from per-page text fragments with
//! font metadata plus raw image payloads, as produced by a PDF extraction
//! layer.
//!
//! The pipeline runs in three stages: classification (fragments become
//! role-tagged blocks), asset resolution (image references are normalized,
//! fingerprinted, and deduplicated), and a single forward-only emission pass
//! that produces the final document.
//!
//! ## Quick start
//!
//! ```no_run
//! use texforge::{FragmentStream, Texforge};
//!
//! # fn main() -> texforge::Result<()> {
//! let json = std::fs::read_to_string("fragments.json")?;
//! let stream: FragmentStream = serde_json::from_str(&json)?;
//!
//! let result = Texforge::new().convert(&stream)?;
//! std::fs::write("out.tex", &result.latex)?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod emit;
pub mod error;
pub mod extract;
pub mod model;
pub mod session;

pub use emit::{AssetManifest, ConversionStats, EmitOptions, EmitResult, ManifestEntry, Template};
pub use error::{Error, Result};
pub use model::{
    Block, BlockRole, ColorSpace, DocumentMetadata, FontStyle, Fragment, FragmentStream,
    ImageAsset, Inferred, ListKind, PageFragments, RawImage,
};

use classify::{modal_font_size, LineKind, MathClassifier, StructureClassifier};
use emit::LatexEmitter;
use extract::MetadataExtractor;
use rayon::prelude::*;
use session::ConversionSession;
use unicode_normalization::UnicodeNormalization;

/// High-level converter with builder-style configuration.
///
/// One `Texforge` value can convert any number of streams; each conversion
/// runs in its own session with no shared mutable state, so conversions may
/// run concurrently (see [`Texforge::convert_all`]).
#[derive(Debug, Clone, Default)]
pub struct Texforge {
    options: EmitOptions,
}

impl Texforge {
    /// Create a converter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with the given options.
    pub fn with_options(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Set the document class template.
    pub fn template(mut self, template: Template) -> Self {
        self.options.template = template;
        self
    }

    /// Enable or disable image extraction.
    pub fn images(mut self, include: bool) -> Self {
        self.options.include_images = include;
        self
    }

    /// Emit page breaks between source pages.
    pub fn page_breaks(mut self, breaks: bool) -> Self {
        self.options.page_breaks = breaks;
        self
    }

    /// Set the heading font-size ratio.
    pub fn heading_ratio(mut self, ratio: f32) -> Self {
        self.options.heading_ratio = ratio;
        self
    }

    /// Access the effective options.
    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Convert one fragment stream into a LaTeX document.
    ///
    /// The stream is validated up front; a malformed stream fails before any
    /// output is produced.
    pub fn convert(&self, stream: &FragmentStream) -> Result<EmitResult> {
        convert_stream(stream, &self.options)
    }

    /// Convert a JSON-encoded fragment stream.
    pub fn convert_json(&self, json: &str) -> Result<EmitResult> {
        let stream: FragmentStream = serde_json::from_str(json)?;
        self.convert(&stream)
    }

    /// Convert many streams in parallel, one session per stream.
    ///
    /// Parallelism is across documents only; within one document the
    /// pipeline stays strictly sequential so block order and figure
    /// numbering remain deterministic.
    pub fn convert_all(&self, streams: &[FragmentStream]) -> Vec<Result<EmitResult>> {
        streams
            .par_iter()
            .map(|stream| self.convert(stream))
            .collect()
    }
}

/// Run the full pipeline over one validated stream.
pub fn convert_stream(stream: &FragmentStream, options: &EmitOptions) -> Result<EmitResult> {
    stream.validate()?;

    let math = MathClassifier::with_marker_words(options.marker_words.clone());
    let mut structure = StructureClassifier::new(options.heading_ratio);
    let mut session = ConversionSession::new();
    let mut stats = ConversionStats::default();
    let mut blocks: Vec<Block> = Vec::new();

    for page in &stream.pages {
        stats.pages += 1;
        let modal = modal_font_size(page.fragments.iter().map(|f| f.font_size));

        for fragment in &page.fragments {
            stats.fragments += 1;
            if fragment.is_blank() {
                continue;
            }
            blocks.push(classify_fragment(
                fragment,
                page.number,
                modal,
                &math,
                &mut structure,
            ));
        }

        if options.include_images {
            for raw in &page.images {
                match session.offer_image(raw, page.number) {
                    Ok(Some(index)) => {
                        blocks.push(Block::new(
                            BlockRole::FigureReference { asset: Some(index) },
                            "",
                            page.number,
                        ));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        // Recoverable: the document keeps a placeholder and
                        // the manifest is marked truncated.
                        log::warn!("image {} on page {} dropped: {}", raw.object_id, page.number, err);
                        blocks.push(Block::new(
                            BlockRole::FigureReference { asset: None },
                            "",
                            page.number,
                        ));
                    }
                }
            }
        }
    }

    stats.duplicate_images = session.duplicates_skipped();
    stats.image_failures = session.decode_failures();

    let metadata =
        MetadataExtractor::new(options.metadata_window).extract(&blocks, &stream.default_title);

    let assets = session.into_assets();
    let manifest = AssetManifest {
        entries: assets.iter().map(ManifestEntry::from_asset).collect(),
        truncated: stats.image_failures > 0,
    };

    let mut emitter = LatexEmitter::new(options.clone());
    let latex = emitter.emit_document(&blocks, &metadata, &assets, &mut stats);

    log::debug!(
        "converted {} pages, {} fragments into {} bytes of output",
        stats.pages,
        stats.fragments,
        latex.len()
    );

    Ok(EmitResult {
        latex,
        metadata,
        manifest,
        stats,
        assets,
    })
}

/// Decide one fragment's block role.
///
/// Structural roles (list, heading, quote) are checked first; plain lines
/// then go through the math classifier, and prose carrying recognizable
/// sub-expressions is tagged for inline wrapping at emission.
fn classify_fragment(
    fragment: &Fragment,
    page: u32,
    modal: f32,
    math: &MathClassifier,
    structure: &mut StructureClassifier,
) -> Block {
    // NFC first, so composed and decomposed forms classify identically.
    let text: String = fragment.text.nfc().collect();
    let role = structure.classify(&text, fragment.font_size, fragment.indent, modal);

    match role {
        BlockRole::ListItem { .. } => {
            let stripped = structure.strip_list_marker(&text).to_string();
            Block::new(role, stripped, page).with_font_size(fragment.font_size)
        }
        BlockRole::Paragraph => {
            let trimmed = text.trim();
            let role = match math.classify(trimmed) {
                LineKind::Expression => BlockRole::MathDisplay,
                LineKind::Prose if !math.find_inline(trimmed).is_empty() => {
                    BlockRole::InlineMathParagraph
                }
                LineKind::Prose => BlockRole::Paragraph,
            };
            Block::new(role, trimmed, page).with_font_size(fragment.font_size)
        }
        other => Block::new(other, text.trim(), page).with_font_size(fragment.font_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let forge = Texforge::new()
            .template(Template::Report)
            .images(false)
            .page_breaks(true);
        assert_eq!(forge.options().template, Template::Report);
        assert!(!forge.options().include_images);
        assert!(forge.options().page_breaks);
    }

    #[test]
    fn test_malformed_stream_refused() {
        let mut stream = FragmentStream::new("doc");
        stream.add_page(PageFragments::new(3));
        stream.add_page(PageFragments::new(1));
        let err = Texforge::new().convert(&stream).unwrap_err();
        assert!(matches!(err, Error::MalformedFragmentStream { .. }));
    }

    #[test]
    fn test_empty_stream_yields_document_frame() {
        let stream = FragmentStream::new("empty-doc");
        let result = Texforge::new().convert(&stream).unwrap();
        assert!(result.latex.contains("\\begin{document}"));
        assert!(result.latex.contains("\\end{document}"));
        // Fallback title still present, with low confidence.
        assert_eq!(result.metadata.title.as_ref().unwrap(), "empty-doc");
    }

    #[test]
    fn test_convert_json_roundtrip() {
        let mut stream = FragmentStream::new("doc");
        let mut page = PageFragments::new(1);
        page.add_fragment(Fragment::new("Plain text here.", 11.0, 0));
        stream.add_page(page);
        let json = serde_json::to_string(&stream).unwrap();

        let result = Texforge::new().convert_json(&json).unwrap();
        assert!(result.latex.contains("Plain text here."));
    }
}
