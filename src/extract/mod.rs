//! Heuristic extraction of document-level metadata.

mod metadata;

pub use metadata::MetadataExtractor;
