//! Emission and classification tunables.

use crate::classify::default_marker_words;

/// Document class used for the generated preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    /// `article`, the default.
    #[default]
    Article,
    /// `report`.
    Report,
    /// `book`.
    Book,
}

impl Template {
    /// LaTeX document class name.
    pub fn class_name(&self) -> &'static str {
        match self {
            Template::Article => "article",
            Template::Report => "report",
            Template::Book => "book",
        }
    }
}

/// Conversion options.
///
/// All tunables carry defaults chosen for prose-heavy documents; callers
/// override individual knobs through the builder methods.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Document class for the preamble.
    pub template: Template,

    /// Font-size multiple of the modal body size above which a line is a
    /// heading candidate.
    pub heading_ratio: f32,

    /// Whether image assets are extracted and figure environments emitted.
    pub include_images: bool,

    /// Maximum inline-math span length in characters; longer spans stay
    /// inside the surrounding prose untouched.
    pub inline_threshold: usize,

    /// Emit `\newpage` between source pages.
    pub page_breaks: bool,

    /// Number of leading blocks the metadata extractor inspects.
    pub metadata_window: usize,

    /// Prose marker words that veto weak math signals.
    pub marker_words: Vec<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            template: Template::Article,
            heading_ratio: 1.15,
            include_images: true,
            inline_threshold: 50,
            page_breaks: false,
            metadata_window: 12,
            marker_words: default_marker_words(),
        }
    }
}

impl EmitOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document class template.
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Set the heading font-size ratio.
    pub fn with_heading_ratio(mut self, ratio: f32) -> Self {
        self.heading_ratio = ratio;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Set the inline-math span length threshold.
    pub fn with_inline_threshold(mut self, threshold: usize) -> Self {
        self.inline_threshold = threshold;
        self
    }

    /// Emit page breaks between source pages.
    pub fn with_page_breaks(mut self, breaks: bool) -> Self {
        self.page_breaks = breaks;
        self
    }

    /// Set the metadata inspection window.
    pub fn with_metadata_window(mut self, window: usize) -> Self {
        self.metadata_window = window;
        self
    }

    /// Replace the marker-word list.
    pub fn with_marker_words(mut self, words: Vec<String>) -> Self {
        self.marker_words = words;
        self
    }
}
