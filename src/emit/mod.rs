//! LaTeX document emission.

mod escape;
mod latex;
mod options;
mod result;

pub use escape::escape_latex;
pub use latex::LatexEmitter;
pub use options::{EmitOptions, Template};
pub use result::{AssetManifest, ConversionStats, EmitResult, ManifestEntry};
