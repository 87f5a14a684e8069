//! Attributed text
//!
//! A [`Phrase`] is a paragraph of text plus style intervals over character
//! offsets. Each attribute has a whole-phrase default; an interval overrides
//! it for the characters it covers, the most recently added interval winning
//! where intervals overlap. Getters take `Option<usize>`: `None` asks for
//! the whole-phrase value.

use std::ops::Range;
use std::sync::Arc;

use galley_core::{AnnotationPosition, Color, Font, InlineAlignment, Wrap};

/// Attribute carried by a [`StyleAttributeInterval`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleAttribute {
    Font,
    Color,
    TextAlign,
    Wrap,
    LineHeight,
    Annotations,
    Embedding,
    AnnotationAlign,
    AnnotationOffset,
    AnnotationPosition,
}

/// Typed attribute value
#[derive(Clone, Debug)]
pub enum AttributeValue {
    Font(Arc<Font>),
    Color(Color),
    TextAlign(InlineAlignment),
    Wrap(Wrap),
    LineHeight(f64),
    /// Annotation phrases (ruby) over the covered base text
    Annotations(Arc<[Phrase]>),
    /// Phrase laid out inline in place of an object replacement character
    Embedding(Arc<Phrase>),
    AnnotationAlign(InlineAlignment),
    AnnotationOffset(f64),
    AnnotationPosition(AnnotationPosition),
}

impl AttributeValue {
    pub fn attribute(&self) -> StyleAttribute {
        match self {
            AttributeValue::Font(_) => StyleAttribute::Font,
            AttributeValue::Color(_) => StyleAttribute::Color,
            AttributeValue::TextAlign(_) => StyleAttribute::TextAlign,
            AttributeValue::Wrap(_) => StyleAttribute::Wrap,
            AttributeValue::LineHeight(_) => StyleAttribute::LineHeight,
            AttributeValue::Annotations(_) => StyleAttribute::Annotations,
            AttributeValue::Embedding(_) => StyleAttribute::Embedding,
            AttributeValue::AnnotationAlign(_) => StyleAttribute::AnnotationAlign,
            AttributeValue::AnnotationOffset(_) => StyleAttribute::AnnotationOffset,
            AttributeValue::AnnotationPosition(_) => StyleAttribute::AnnotationPosition,
        }
    }
}

/// Attribute value over a half-open character interval. An interval
/// without a span is the outer scope: it applies to the whole run it is
/// attached to.
#[derive(Clone, Debug)]
pub struct StyleAttributeInterval {
    value: AttributeValue,
    span: Option<Range<usize>>,
}

impl StyleAttributeInterval {
    pub fn new(value: AttributeValue, span: Range<usize>) -> Self {
        Self {
            value,
            span: Some(span),
        }
    }

    pub fn outer(value: AttributeValue) -> Self {
        Self { value, span: None }
    }

    pub fn attribute(&self) -> StyleAttribute {
        self.value.attribute()
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    pub fn span(&self) -> Option<Range<usize>> {
        self.span.clone()
    }

    pub fn is_outer_scope(&self) -> bool {
        self.span.is_none()
    }

    /// Whether the interval covers character `index`; the outer scope covers
    /// everything
    pub fn contains(&self, index: usize) -> bool {
        match &self.span {
            Some(span) => span.contains(&index),
            None => true,
        }
    }

    /// Overlap with `[begin, end)`, `None` when empty
    pub fn intersection(&self, begin: usize, end: usize) -> Option<Range<usize>> {
        let (b, e) = match &self.span {
            Some(span) => (span.start.max(begin), span.end.min(end)),
            None => (begin, end),
        };
        (b < e).then_some(b..e)
    }

    /// Font carried by a font interval
    pub fn font(&self) -> Option<&Arc<Font>> {
        match &self.value {
            AttributeValue::Font(font) => Some(font),
            _ => None,
        }
    }
}

/// Paragraph of attributed text
#[derive(Clone, Debug)]
pub struct Phrase {
    text: String,
    chars: Vec<char>,
    font: Arc<Font>,
    color: Color,
    text_align: InlineAlignment,
    wrap: Option<Wrap>,
    line_height: Option<f64>,
    annotation_align: InlineAlignment,
    annotation_offset: Option<f64>,
    annotation_position: AnnotationPosition,
    intervals: Vec<StyleAttributeInterval>,
}

impl Phrase {
    pub fn new(text: impl Into<String>, font: Arc<Font>) -> Self {
        let text = text.into();
        let chars = text.chars().collect();
        Self {
            text,
            chars,
            font,
            color: Color::default(),
            text_align: InlineAlignment::default(),
            wrap: None,
            line_height: None,
            annotation_align: InlineAlignment::Center,
            annotation_offset: None,
            annotation_position: AnnotationPosition::default(),
            intervals: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder
    // ─────────────────────────────────────────────────────────────────────────

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_text_align(mut self, align: InlineAlignment) -> Self {
        self.text_align = align;
        self
    }

    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap = Some(wrap);
        self
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = Some(line_height);
        self
    }

    pub fn with_annotation_align(mut self, align: InlineAlignment) -> Self {
        self.annotation_align = align;
        self
    }

    pub fn with_annotation_offset(mut self, offset: f64) -> Self {
        self.annotation_offset = Some(offset);
        self
    }

    pub fn with_annotation_position(mut self, position: AnnotationPosition) -> Self {
        self.annotation_position = position;
        self
    }

    /// Apply `value` to the characters in `span`. The span is clamped to the
    /// text; an empty span is ignored.
    pub fn with_attribute(mut self, value: AttributeValue, span: Range<usize>) -> Self {
        let end = span.end.min(self.chars.len());
        let start = span.start.min(end);
        if start < end {
            self.intervals
                .push(StyleAttributeInterval::new(value, start..end));
        }
        self
    }

    pub fn with_font_span(self, font: Arc<Font>, span: Range<usize>) -> Self {
        self.with_attribute(AttributeValue::Font(font), span)
    }

    pub fn with_color_span(self, color: Color, span: Range<usize>) -> Self {
        self.with_attribute(AttributeValue::Color(color), span)
    }

    /// Attach annotation phrases to the base text in `span`
    pub fn with_annotations(self, annotations: Vec<Phrase>, span: Range<usize>) -> Self {
        self.with_attribute(AttributeValue::Annotations(annotations.into()), span)
    }

    /// Embed `phrase` at `index`, which should hold U+FFFC
    pub fn with_embedding(self, phrase: Phrase, index: usize) -> Self {
        self.with_attribute(AttributeValue::Embedding(Arc::new(phrase)), index..index + 1)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text
    // ─────────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn intervals(&self) -> &[StyleAttributeInterval] {
        &self.intervals
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attribute Access
    // ─────────────────────────────────────────────────────────────────────────

    /// Position in `intervals` of the interval supplying `attribute` at
    /// `index`
    fn covering(&self, attribute: StyleAttribute, index: usize) -> Option<usize> {
        self.intervals
            .iter()
            .rposition(|i| i.attribute() == attribute && i.contains(index))
    }

    /// Interval value of `attribute` at `index`, ignoring whole-phrase
    /// defaults
    pub fn attribute(&self, attribute: StyleAttribute, index: usize) -> Option<&AttributeValue> {
        self.covering(attribute, index)
            .map(|i| self.intervals[i].value())
    }

    fn lookup(&self, attribute: StyleAttribute, index: Option<usize>) -> Option<&AttributeValue> {
        index.and_then(|i| self.attribute(attribute, i))
    }

    /// First index of the maximal range around `index` over which
    /// `attribute` comes from the same source
    pub fn run_start(&self, attribute: StyleAttribute, index: usize) -> usize {
        let source = self.covering(attribute, index);
        let mut start = index.min(self.len());
        while start > 0 && self.covering(attribute, start - 1) == source {
            start -= 1;
        }
        start
    }

    /// End (exclusive) of the maximal range around `index` over which
    /// `attribute` comes from the same source
    pub fn run_limit(&self, attribute: StyleAttribute, index: usize) -> usize {
        let len = self.len();
        if index >= len {
            return len;
        }
        let source = self.covering(attribute, index);
        let mut limit = index + 1;
        while limit < len && self.covering(attribute, limit) == source {
            limit += 1;
        }
        limit
    }

    /// Whether a run of `attribute` starts at `index`, i.e.
    /// `run_start(attribute, index) == index`
    pub fn is_run_start(&self, attribute: StyleAttribute, index: usize) -> bool {
        index == 0 || self.covering(attribute, index - 1) != self.covering(attribute, index)
    }

    pub fn font(&self, index: Option<usize>) -> Arc<Font> {
        match self.lookup(StyleAttribute::Font, index) {
            Some(AttributeValue::Font(font)) => font.clone(),
            _ => self.font.clone(),
        }
    }

    pub fn color(&self, index: Option<usize>) -> Color {
        match self.lookup(StyleAttribute::Color, index) {
            Some(AttributeValue::Color(color)) => *color,
            _ => self.color,
        }
    }

    pub fn text_align(&self, index: Option<usize>) -> InlineAlignment {
        match self.lookup(StyleAttribute::TextAlign, index) {
            Some(AttributeValue::TextAlign(align)) => *align,
            _ => self.text_align,
        }
    }

    /// Wrap option, `None` when neither the phrase nor an interval sets it
    pub fn wrap(&self, index: Option<usize>) -> Option<Wrap> {
        match self.lookup(StyleAttribute::Wrap, index) {
            Some(AttributeValue::Wrap(wrap)) => Some(*wrap),
            _ => self.wrap,
        }
    }

    /// Explicit line height, else the default line height of the font in
    /// effect at `index`
    pub fn line_height(&self, index: Option<usize>) -> f64 {
        match self.lookup(StyleAttribute::LineHeight, index) {
            Some(AttributeValue::LineHeight(h)) => *h,
            _ => self
                .line_height
                .unwrap_or_else(|| self.font(index).default_line_height()),
        }
    }

    pub fn annotations(&self, index: usize) -> Option<Arc<[Phrase]>> {
        match self.attribute(StyleAttribute::Annotations, index) {
            Some(AttributeValue::Annotations(annotations)) => Some(annotations.clone()),
            _ => None,
        }
    }

    pub fn embedding(&self, index: usize) -> Option<Arc<Phrase>> {
        match self.attribute(StyleAttribute::Embedding, index) {
            Some(AttributeValue::Embedding(phrase)) => Some(phrase.clone()),
            _ => None,
        }
    }

    pub fn annotation_align(&self, index: Option<usize>) -> InlineAlignment {
        match self.lookup(StyleAttribute::AnnotationAlign, index) {
            Some(AttributeValue::AnnotationAlign(align)) => *align,
            _ => self.annotation_align,
        }
    }

    pub fn annotation_offset(&self, index: Option<usize>) -> Option<f64> {
        match self.lookup(StyleAttribute::AnnotationOffset, index) {
            Some(AttributeValue::AnnotationOffset(offset)) => Some(*offset),
            _ => self.annotation_offset,
        }
    }

    pub fn annotation_position(&self, index: Option<usize>) -> AnnotationPosition {
        match self.lookup(StyleAttribute::AnnotationPosition, index) {
            Some(AttributeValue::AnnotationPosition(position)) => *position,
            _ => self.annotation_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixed_font;

    #[test]
    fn test_defaults_and_overrides() {
        let base = fixed_font(20.0);
        let big = fixed_font(40.0);
        let phrase = Phrase::new("hello world", base.clone())
            .with_font_span(big.clone(), 6..11)
            .with_color_span(Color::RED, 0..5);

        assert!(Arc::ptr_eq(&phrase.font(None), &base));
        assert!(Arc::ptr_eq(&phrase.font(Some(2)), &base));
        assert!(Arc::ptr_eq(&phrase.font(Some(7)), &big));
        assert_eq!(phrase.color(Some(0)), Color::RED);
        assert_eq!(phrase.color(None), Color::WHITE);
        assert_eq!(phrase.wrap(None), None);
    }

    #[test]
    fn test_line_height_defaults_to_font() {
        let phrase = Phrase::new("abc", fixed_font(20.0));
        assert_eq!(phrase.line_height(None), 25.0);
        let phrase = phrase.with_line_height(30.0);
        assert_eq!(phrase.line_height(Some(1)), 30.0);
    }

    #[test]
    fn test_run_boundaries() {
        let phrase = Phrase::new("abcdefgh", fixed_font(20.0))
            .with_annotations(vec![Phrase::new("x", fixed_font(10.0))], 2..5);

        assert_eq!(phrase.run_start(StyleAttribute::Annotations, 3), 2);
        assert_eq!(phrase.run_limit(StyleAttribute::Annotations, 3), 5);
        assert_eq!(phrase.run_start(StyleAttribute::Annotations, 1), 0);
        assert_eq!(phrase.run_start(StyleAttribute::Annotations, 6), 5);
        assert_eq!(phrase.run_limit(StyleAttribute::Annotations, 6), 8);
        assert!(phrase.is_run_start(StyleAttribute::Annotations, 2));
        assert!(phrase.is_run_start(StyleAttribute::Annotations, 5));
        assert!(!phrase.is_run_start(StyleAttribute::Annotations, 3));
        assert!(phrase.annotations(4).is_some());
        assert!(phrase.annotations(5).is_none());
    }

    #[test]
    fn test_interval_intersection() {
        let interval = StyleAttributeInterval::new(AttributeValue::Color(Color::RED), 2..6);
        assert_eq!(interval.intersection(4, 10), Some(4..6));
        assert_eq!(interval.intersection(6, 10), None);
        let outer = StyleAttributeInterval::outer(AttributeValue::Color(Color::RED));
        assert!(outer.is_outer_scope());
        assert_eq!(outer.intersection(3, 7), Some(3..7));
    }

    #[test]
    fn test_spans_clamped() {
        let phrase = Phrase::new("ab", fixed_font(20.0)).with_color_span(Color::RED, 1..10);
        assert_eq!(phrase.intervals()[0].span(), Some(1..2));
        let phrase = phrase.with_color_span(Color::RED, 5..9);
        assert_eq!(phrase.intervals().len(), 1);
    }
}
