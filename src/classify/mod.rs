//! Classifiers deciding line kind and block role from noisy signals.

mod math;
mod structure;

pub use math::{default_marker_words, InlineSpan, LineKind, MathClassifier};
pub use structure::{modal_font_size, StructureClassifier};
