//! Area tree
//!
//! Layout output is a tree of [`AreaNode`]s. Block containers
//! ([`BlockArea`]) stack block children (blocks and lines); lines and
//! annotations hold inline children (glyph runs, spaces, fillers, inline
//! blocks, annotations). The container/child rule is checked once, in
//! `add_child` / `insert_child`.

use std::sync::Arc;

use thiserror::Error;

use crate::font::Font;
use crate::style::{AnnotationPosition, Color, InlineAlignment};

/// Area tree construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AreaError {
    #[error("{child:?} area cannot be a child of a {parent:?} area")]
    IllegalChild { parent: AreaKind, child: AreaKind },

    #[error("Insert index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Discriminant of an [`AreaNode`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Block,
    Line,
    Glyph,
    Space,
    Filler,
    InlineBlock,
    Annotation,
}

impl AreaKind {
    /// Areas that flow along a line
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            AreaKind::Glyph
                | AreaKind::Space
                | AreaKind::Filler
                | AreaKind::InlineBlock
                | AreaKind::Annotation
        )
    }

    /// Areas that stack in the block progression direction
    pub fn is_block(self) -> bool {
        matches!(self, AreaKind::Block | AreaKind::Line)
    }
}

/// Node of the area tree
#[derive(Clone, Debug)]
pub enum AreaNode {
    Block(BlockArea),
    Line(LineArea),
    Glyph(GlyphArea),
    Space(SpaceArea),
    Filler(InlineFillerArea),
    InlineBlock(InlineBlockArea),
    Annotation(AnnotationArea),
}

impl AreaNode {
    pub fn kind(&self) -> AreaKind {
        match self {
            AreaNode::Block(_) => AreaKind::Block,
            AreaNode::Line(_) => AreaKind::Line,
            AreaNode::Glyph(_) => AreaKind::Glyph,
            AreaNode::Space(_) => AreaKind::Space,
            AreaNode::Filler(_) => AreaKind::Filler,
            AreaNode::InlineBlock(_) => AreaKind::InlineBlock,
            AreaNode::Annotation(_) => AreaKind::Annotation,
        }
    }

    pub fn ipd(&self) -> f64 {
        match self {
            AreaNode::Block(a) => a.ipd,
            AreaNode::Line(a) => a.ipd,
            AreaNode::Glyph(a) => a.ipd,
            AreaNode::Space(a) => a.ipd,
            AreaNode::Filler(a) => a.ipd,
            AreaNode::InlineBlock(a) => a.ipd(),
            AreaNode::Annotation(a) => a.ipd(),
        }
    }

    pub fn bpd(&self) -> f64 {
        match self {
            AreaNode::Block(a) => a.bpd,
            AreaNode::Line(a) => a.bpd,
            AreaNode::Glyph(a) => a.bpd,
            AreaNode::Space(a) => a.bpd,
            AreaNode::Filler(a) => a.bpd,
            AreaNode::InlineBlock(a) => a.bpd(),
            AreaNode::Annotation(a) => a.bpd(),
        }
    }

    pub fn is_inline(&self) -> bool {
        self.kind().is_inline()
    }

    /// Text carried by glyph and space areas
    pub fn text(&self) -> Option<&str> {
        match self {
            AreaNode::Glyph(a) => Some(&a.text),
            AreaNode::Space(a) => Some(&a.text),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Containers
// ─────────────────────────────────────────────────────────────────────────────

/// Container stacking block children; IPD grows to the widest child, BPD to
/// the sum of children
#[derive(Clone, Debug, Default)]
pub struct BlockArea {
    pub ipd: f64,
    pub bpd: f64,
    children: Vec<AreaNode>,
}

impl BlockArea {
    pub fn new(ipd: f64, bpd: f64) -> Self {
        Self {
            ipd,
            bpd,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[AreaNode] {
        &self.children
    }

    pub fn add_child(&mut self, child: AreaNode) -> Result<(), AreaError> {
        self.check_child(&child)?;
        self.expand(&child);
        self.children.push(child);
        Ok(())
    }

    pub fn insert_child(&mut self, index: usize, child: AreaNode) -> Result<(), AreaError> {
        self.check_child(&child)?;
        if index > self.children.len() {
            return Err(AreaError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        self.expand(&child);
        self.children.insert(index, child);
        Ok(())
    }

    /// Append a line; lines are always valid block children
    pub fn push_line(&mut self, line: LineArea) {
        let child = AreaNode::Line(line);
        self.expand(&child);
        self.children.push(child);
    }

    fn check_child(&self, child: &AreaNode) -> Result<(), AreaError> {
        if child.kind().is_block() {
            Ok(())
        } else {
            Err(AreaError::IllegalChild {
                parent: AreaKind::Block,
                child: child.kind(),
            })
        }
    }

    fn expand(&mut self, child: &AreaNode) {
        self.ipd = self.ipd.max(child.ipd());
        self.bpd += child.bpd();
    }
}

/// One line of inline areas
#[derive(Clone, Debug)]
pub struct LineArea {
    pub ipd: f64,
    pub bpd: f64,
    alignment: InlineAlignment,
    color: Color,
    font: Arc<Font>,
    /// 1 is the first line of the containing area
    line_number: usize,
    overflow: f64,
    bpd_annotation_before: f64,
    bpd_annotation_after: f64,
    children: Vec<AreaNode>,
}

impl LineArea {
    pub fn new(
        ipd: f64,
        bpd: f64,
        alignment: InlineAlignment,
        color: Color,
        font: Arc<Font>,
        line_number: usize,
    ) -> Self {
        Self {
            ipd,
            bpd,
            alignment,
            color,
            font,
            line_number,
            overflow: 0.0,
            bpd_annotation_before: 0.0,
            bpd_annotation_after: 0.0,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[AreaNode] {
        &self.children
    }

    /// Add an inline child. An annotation with AUTO position is resolved
    /// against this line before being stored.
    pub fn add_child(&mut self, mut child: AreaNode) -> Result<(), AreaError> {
        self.check_child(&child)?;
        self.expand(&mut child);
        self.children.push(child);
        Ok(())
    }

    pub fn insert_child(&mut self, index: usize, mut child: AreaNode) -> Result<(), AreaError> {
        self.check_child(&child)?;
        if index > self.children.len() {
            return Err(AreaError::IndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        self.expand(&mut child);
        self.children.insert(index, child);
        Ok(())
    }

    fn check_child(&self, child: &AreaNode) -> Result<(), AreaError> {
        if child.is_inline() {
            Ok(())
        } else {
            Err(AreaError::IllegalChild {
                parent: AreaKind::Line,
                child: child.kind(),
            })
        }
    }

    // IPD is declared by layout; only BPD grows to fit content.
    fn expand(&mut self, child: &mut AreaNode) {
        match child {
            AreaNode::Annotation(annotation) => self.update_for_annotation(annotation),
            other => self.bpd = self.bpd.max(other.bpd()),
        }
    }

    fn update_for_annotation(&mut self, annotation: &mut AnnotationArea) {
        if annotation.position == AnnotationPosition::Auto {
            annotation.position = if self.is_first_line() {
                AnnotationPosition::Before
            } else {
                AnnotationPosition::After
            };
        }
        let bpd = annotation.bpd();
        match annotation.position {
            AnnotationPosition::Before => {
                self.bpd_annotation_before = self.bpd_annotation_before.max(bpd)
            }
            AnnotationPosition::After => {
                self.bpd_annotation_after = self.bpd_annotation_after.max(bpd)
            }
            _ => {}
        }
    }

    pub fn alignment(&self) -> InlineAlignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: InlineAlignment) {
        self.alignment = alignment;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn font(&self) -> &Arc<Font> {
        &self.font
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn is_first_line(&self) -> bool {
        self.line_number == 1
    }

    pub fn leading_before(&self) -> f64 {
        self.font.leading() / 2.0
    }

    pub fn leading_after(&self) -> f64 {
        self.font.leading() / 2.0
    }

    pub fn ascent(&self) -> f64 {
        self.font.ascent()
    }

    /// Descender of the line font, negative below the baseline
    pub fn descent(&self) -> f64 {
        self.font.descent()
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    pub fn set_overflow(&mut self, overflow: f64) {
        self.overflow = overflow;
    }

    /// Tallest annotation placed at `position`; 0 for AUTO and OUTSIDE
    pub fn annotation_bpd(&self, position: AnnotationPosition) -> f64 {
        match position {
            AnnotationPosition::Before => self.bpd_annotation_before,
            AnnotationPosition::After => self.bpd_annotation_after,
            _ => 0.0,
        }
    }

    /// Sum of the IPD of every child except annotations
    pub fn content_ipd(&self) -> f64 {
        self.children
            .iter()
            .filter(|c| c.kind() != AreaKind::Annotation)
            .map(AreaNode::ipd)
            .sum()
    }

    /// Concatenated text of glyph and space children
    pub fn text(&self) -> String {
        self.children.iter().filter_map(AreaNode::text).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Areas
// ─────────────────────────────────────────────────────────────────────────────

/// Run of glyphs set in one font
#[derive(Clone, Debug)]
pub struct GlyphArea {
    pub ipd: f64,
    pub bpd: f64,
    pub text: String,
    pub font: Arc<Font>,
}

impl GlyphArea {
    pub fn new(ipd: f64, bpd: f64, text: impl Into<String>, font: Arc<Font>) -> Self {
        Self {
            ipd,
            bpd,
            text: text.into(),
            font,
        }
    }
}

/// Whitespace between glyph runs
#[derive(Clone, Debug)]
pub struct SpaceArea {
    pub ipd: f64,
    pub bpd: f64,
    pub text: String,
    pub font: Arc<Font>,
}

impl SpaceArea {
    pub fn new(ipd: f64, bpd: f64, text: impl Into<String>, font: Arc<Font>) -> Self {
        Self {
            ipd,
            bpd,
            text: text.into(),
            font,
        }
    }
}

/// Empty space inserted by alignment
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InlineFillerArea {
    pub ipd: f64,
    pub bpd: f64,
}

impl InlineFillerArea {
    pub fn new(ipd: f64, bpd: f64) -> Self {
        Self { ipd, bpd }
    }
}

/// Block of lines laid out inline, e.g. an embedded phrase
#[derive(Clone, Debug, Default)]
pub struct InlineBlockArea {
    block: BlockArea,
}

impl InlineBlockArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: impl IntoIterator<Item = LineArea>) -> Self {
        let mut block = BlockArea::default();
        for line in lines {
            block.push_line(line);
        }
        Self { block }
    }

    pub fn ipd(&self) -> f64 {
        self.block.ipd
    }

    pub fn bpd(&self) -> f64 {
        self.block.bpd
    }

    pub fn block(&self) -> &BlockArea {
        &self.block
    }

    pub fn add_child(&mut self, child: AreaNode) -> Result<(), AreaError> {
        self.block.add_child(child)
    }
}

/// Annotation line attached to a base line
#[derive(Clone, Debug)]
pub struct AnnotationArea {
    line: LineArea,
    pub alignment: InlineAlignment,
    /// Offset along the inline axis relative to the base text, when set
    pub offset: Option<f64>,
    pub position: AnnotationPosition,
}

impl AnnotationArea {
    pub fn new(
        line: LineArea,
        alignment: InlineAlignment,
        offset: Option<f64>,
        position: AnnotationPosition,
    ) -> Self {
        Self {
            line,
            alignment,
            offset,
            position,
        }
    }

    pub fn ipd(&self) -> f64 {
        self.line.ipd
    }

    pub fn bpd(&self) -> f64 {
        self.line.bpd
    }

    pub fn line(&self) -> &LineArea {
        &self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontKey;
    use crate::geometry::Extent;

    fn font() -> Arc<Font> {
        Arc::new(Font::new(
            FontKey::new("Missing", Extent::uniform(10.0)),
            "/nonexistent/galley/missing.ttf",
        ))
    }

    fn line(number: usize) -> LineArea {
        LineArea::new(
            100.0,
            12.5,
            InlineAlignment::Start,
            Color::WHITE,
            font(),
            number,
        )
    }

    fn annotation(bpd: f64, position: AnnotationPosition) -> AreaNode {
        let mut inner = line(1);
        inner.bpd = bpd;
        AreaNode::Annotation(AnnotationArea::new(
            inner,
            InlineAlignment::Center,
            None,
            position,
        ))
    }

    #[test]
    fn test_line_rejects_block_children() {
        let mut l = line(1);
        let err = l.add_child(AreaNode::Line(line(2))).unwrap_err();
        assert_eq!(
            err,
            AreaError::IllegalChild {
                parent: AreaKind::Line,
                child: AreaKind::Line
            }
        );
        assert!(l.children().is_empty());
    }

    #[test]
    fn test_block_rejects_inline_children() {
        let mut b = BlockArea::default();
        let filler = AreaNode::Filler(InlineFillerArea::new(5.0, 5.0));
        assert!(b.add_child(filler).is_err());
        assert!(b.add_child(AreaNode::Line(line(1))).is_ok());
        assert!(b.add_child(AreaNode::Line(line(2))).is_ok());
        assert_eq!(b.ipd, 100.0);
        assert_eq!(b.bpd, 25.0);
    }

    #[test]
    fn test_auto_annotation_position() {
        let mut first = line(1);
        first.add_child(annotation(6.0, AnnotationPosition::Auto)).unwrap();
        match &first.children()[0] {
            AreaNode::Annotation(a) => assert_eq!(a.position, AnnotationPosition::Before),
            other => panic!("unexpected {:?}", other.kind()),
        }
        assert_eq!(first.annotation_bpd(AnnotationPosition::Before), 6.0);

        let mut second = line(2);
        second.add_child(annotation(6.0, AnnotationPosition::Auto)).unwrap();
        assert_eq!(second.annotation_bpd(AnnotationPosition::After), 6.0);
        assert_eq!(second.annotation_bpd(AnnotationPosition::Before), 0.0);
    }

    #[test]
    fn test_annotation_maxima_monotone() {
        let mut l = line(1);
        l.add_child(annotation(8.0, AnnotationPosition::Before)).unwrap();
        l.add_child(annotation(3.0, AnnotationPosition::Before)).unwrap();
        assert_eq!(l.annotation_bpd(AnnotationPosition::Before), 8.0);
        assert_eq!(l.bpd, 12.5);
    }

    #[test]
    fn test_content_ipd_skips_annotations() {
        let mut l = line(1);
        l.add_child(AreaNode::Filler(InlineFillerArea::new(30.0, 0.0)))
            .unwrap();
        l.add_child(annotation(6.0, AnnotationPosition::After)).unwrap();
        l.insert_child(0, AreaNode::Filler(InlineFillerArea::new(10.0, 0.0)))
            .unwrap();
        assert_eq!(l.content_ipd(), 40.0);
        assert!(l
            .insert_child(9, AreaNode::Filler(InlineFillerArea::default()))
            .is_err());
    }

    #[test]
    fn test_inline_block_from_lines() {
        let block = InlineBlockArea::from_lines([line(1), line(2)]);
        assert_eq!(block.ipd(), 100.0);
        assert_eq!(block.bpd(), 25.0);
        assert_eq!(block.block().children().len(), 2);
    }
}
