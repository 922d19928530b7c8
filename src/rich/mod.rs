//! Rich text: inline `{name}` image references mixed with wrapped text
//!
//! - `token`: split source text into text runs and image references
//! - `measure`: text width measurement seam
//! - `resolver`: async, de-duplicated image resolution owned by the caller
//! - `layout`: version-guarded incremental layout producing positioned atoms

pub mod layout;
pub mod measure;
pub mod resolver;
pub mod token;

pub use layout::{AtomKind, IncrementalRichLayout, LayoutRun, LayoutStyle, PlacedAtom};
pub use measure::{AverageGlyphMeasure, TextMeasure};
pub use resolver::{ImageHandle, ImageLoader, ImageResolver};
pub use token::{RichToken, split_segments, to_source, tokenize};
