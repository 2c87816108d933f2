//! Data model types for fragments, blocks, images, and metadata.

mod block;
mod fragment;
mod image;
mod metadata;

pub use block::{Block, BlockRole, ListKind};
pub use fragment::{ColorSpace, FontStyle, Fragment, FragmentStream, PageFragments, RawImage};
pub use image::ImageAsset;
pub use metadata::{DocumentMetadata, Inferred};
