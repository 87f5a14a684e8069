//! Galley Core
//!
//! Shared vocabulary for the galley text layout engine:
//!
//! - Writing-mode geometry (axes, IPD/BPD, directions, transforms)
//! - Resolved style values (color, alignment, wrap, whitespace)
//! - Fonts with lazily loaded outlines and their metrics
//! - The area tree produced by layout

pub mod area;
pub mod chars;
pub mod font;
pub mod geometry;
pub mod outline;
pub mod style;

pub use area::{
    AnnotationArea, AreaError, AreaKind, AreaNode, BlockArea, GlyphArea, InlineBlockArea,
    InlineFillerArea, LineArea, SpaceArea,
};
pub use font::{
    FeatureArgument, Font, FontFeature, FontKerning, FontKey, FontStyle, FontWeight, LoadStatus,
};
pub use geometry::{Axis, Dimension, Direction, Extent, TransformMatrix, WritingMode};
pub use outline::{FontError, FontOutline, OutlineLoader, TtfOutline, TtfOutlineLoader};
pub use style::{
    AnnotationPosition, Color, InlineAlignment, LineFeedTreatment, SuppressAtLineBreakTreatment,
    Whitespace, Wrap,
};
