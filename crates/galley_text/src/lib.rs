//! Inline text layout for Galley
//!
//! This crate provides:
//! - Attributed phrases (fonts, colors, alignment, annotations, embeddings)
//! - Whitespace processing and run segmentation
//! - Word and character break iteration (UAX #14, UAX #29)
//! - Greedy line breaking into line areas with character fallback
//! - Ruby-style annotation placement and inline alignment
//! - Font discovery and caching via fontdb
//! - TOML layout configuration

pub mod align;
pub mod annotation;
pub mod breaks;
pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod phrase;
pub mod registry;
pub mod run;
pub mod state;

#[cfg(test)]
mod test_support;

pub use align::{align_line, Justifier, NoJustify};
pub use annotation::AnnotationLayout;
pub use breaks::{BreakIterator, BreakProvider, CharacterBreaks, WordBreaks};
pub use config::{ConfigError, FontsConfig, LayoutConfig};
pub use document::{layout_paragraphs, stack_lines};
pub use error::{LayoutError, Result};
pub use layout::{Consume, LineLayout};
pub use phrase::{AttributeValue, Phrase, StyleAttribute, StyleAttributeInterval};
pub use registry::FontCache;
pub use run::{InlineBreak, WhitespaceState};
pub use state::{LayoutState, DEFAULT_MAX_DEPTH};
