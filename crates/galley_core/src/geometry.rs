//! Geometry for text layout
//!
//! Layout works in writing-mode relative terms: the inline progression
//! dimension (IPD) runs along a line, the block progression dimension (BPD)
//! stacks lines. [`WritingMode`] maps those onto physical axes and
//! directions.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Axes and Directions
// ─────────────────────────────────────────────────────────────────────────────

/// Physical axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Writing-mode relative dimension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Inline progression dimension
    Ipd,
    /// Block progression dimension
    Bpd,
}

/// Physical progression direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right
    LR,
    /// Right to left
    RL,
    /// Top to bottom
    TB,
    /// Bottom to top
    BT,
}

/// Writing mode of a region or paragraph
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritingMode {
    /// Horizontal lines, left to right, stacked top to bottom
    #[default]
    LrTb,
    /// Horizontal lines, right to left, stacked top to bottom
    RlTb,
    /// Vertical lines, top to bottom, stacked right to left
    TbRl,
    /// Vertical lines, top to bottom, stacked left to right
    TbLr,
}

impl WritingMode {
    /// Direction in which the given dimension progresses
    pub fn direction(self, dimension: Dimension) -> Direction {
        match (self, dimension) {
            (WritingMode::LrTb, Dimension::Ipd) => Direction::LR,
            (WritingMode::RlTb, Dimension::Ipd) => Direction::RL,
            (WritingMode::TbRl | WritingMode::TbLr, Dimension::Ipd) => Direction::TB,
            (WritingMode::LrTb | WritingMode::RlTb, Dimension::Bpd) => Direction::TB,
            (WritingMode::TbRl, Dimension::Bpd) => Direction::RL,
            (WritingMode::TbLr, Dimension::Bpd) => Direction::LR,
        }
    }

    /// Physical axis along which the given dimension runs
    pub fn axis(self, dimension: Dimension) -> Axis {
        match self.direction(dimension) {
            Direction::LR | Direction::RL => Axis::Horizontal,
            Direction::TB | Direction::BT => Axis::Vertical,
        }
    }

    /// Whether lines run vertically
    pub fn is_vertical(self) -> bool {
        self.axis(Dimension::Ipd) == Axis::Vertical
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extent
// ─────────────────────────────────────────────────────────────────────────────

/// Width/height pair, used for font sizes that may differ per axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub const EMPTY: Extent = Extent {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Same size along both axes
    pub const fn uniform(size: f64) -> Self {
        Self::new(size, size)
    }

    /// Size along a physical axis
    pub fn dimension(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// True when either side is zero (or not positive)
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

/// 2D affine transformation applied to glyph outlines
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformMatrix {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0   1 |
    pub elements: [f64; 6],
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformMatrix {
    pub const IDENTITY: TransformMatrix = TransformMatrix {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            elements: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    /// Shear where x' = x + shx * y and y' = shy * x + y
    pub fn shear(shx: f64, shy: f64) -> Self {
        Self {
            elements: [1.0, shy, shx, 1.0, 0.0, 0.0],
        }
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &TransformMatrix) -> TransformMatrix {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;
        TransformMatrix {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * tx2 + c1 * ty2 + tx1,
                b1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    pub fn is_identity(&self) -> bool {
        self.elements == Self::IDENTITY.elements
    }
}
