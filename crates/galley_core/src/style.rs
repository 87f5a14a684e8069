//! Resolved style values consumed by layout
//!
//! These are the already-computed values an upstream style resolver attaches
//! to text; no cascading or inheritance happens here.

use serde::{Deserialize, Serialize};

use crate::geometry::{Dimension, Direction, WritingMode};

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Inline alignment keyword (text-align, annotation align)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InlineAlignment {
    Left,
    Right,
    Center,
    #[default]
    Start,
    End,
    Justify,
}

impl InlineAlignment {
    /// Map physical LEFT/RIGHT onto START/END for the writing mode's inline
    /// direction. Other keywords pass through.
    pub fn relativize(self, writing_mode: WritingMode) -> InlineAlignment {
        let direction = writing_mode.direction(Dimension::Ipd);
        match (self, direction) {
            (InlineAlignment::Left, Direction::LR) => InlineAlignment::Start,
            (InlineAlignment::Left, Direction::RL) => InlineAlignment::End,
            (InlineAlignment::Right, Direction::RL) => InlineAlignment::Start,
            (InlineAlignment::Right, Direction::LR) => InlineAlignment::End,
            (alignment, _) => alignment,
        }
    }
}

/// Wrap option
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Wrap {
    #[default]
    Wrap,
    NoWrap,
}

/// Whitespace policy preset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Whitespace {
    #[default]
    Default,
    Preserve,
}

/// What happens to line feeds inside whitespace
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineFeedTreatment {
    Preserve,
    Ignore,
    TreatAsSpace,
    TreatAsZeroWidthSpace,
}

/// Whether whitespace adjacent to a line break is dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressAtLineBreakTreatment {
    Retain,
    Suppress,
    /// Suppress only when the whitespace consists of plain spaces
    Auto,
}

/// Placement of an annotation relative to its base line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationPosition {
    /// Resolved when attached: before on the first line, after otherwise
    #[default]
    Auto,
    Before,
    After,
    Outside,
}
