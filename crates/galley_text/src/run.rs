//! Text run segmentation
//!
//! A phrase is consumed as a sequence of [`TextRun`]s: maximal stretches of
//! breaking whitespace, of other text, or a single object replacement
//! character standing for an embedded phrase. Runs also end where an
//! annotation starts or stops. Each run caches its font sub-intervals and
//! its processed text; offsets inside a run index that processed text.

use std::sync::Arc;

use galley_core::chars::{
    is_breaking_whitespace, is_hyphen, is_ideograph, to_full_width, to_half_width, LINE_FEED,
    LINE_SEPARATOR, OBJECT_REPLACEMENT, PARAGRAPH_SEPARATOR, SPACE, ZERO_WIDTH_SPACE,
};
use galley_core::{
    Font, FontFeature, InlineBlockArea, LineFeedTreatment, SuppressAtLineBreakTreatment,
    Whitespace,
};
use smallvec::{smallvec, SmallVec};

use crate::phrase::{AttributeValue, Phrase, StyleAttribute, StyleAttributeInterval};

// ─────────────────────────────────────────────────────────────────────────────
// Whitespace Policy
// ─────────────────────────────────────────────────────────────────────────────

/// How whitespace runs are processed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WhitespaceState {
    pub line_feed: LineFeedTreatment,
    pub suppress_at_line_break: SuppressAtLineBreakTreatment,
    /// Collapse consecutive spaces into one
    pub collapse: bool,
}

impl WhitespaceState {
    pub const DEFAULT: WhitespaceState = WhitespaceState {
        line_feed: LineFeedTreatment::TreatAsSpace,
        suppress_at_line_break: SuppressAtLineBreakTreatment::Auto,
        collapse: true,
    };

    pub const PRESERVE: WhitespaceState = WhitespaceState {
        line_feed: LineFeedTreatment::Preserve,
        suppress_at_line_break: SuppressAtLineBreakTreatment::Retain,
        collapse: false,
    };

    /// Apply line-feed treatment, then space collapse
    pub fn process(&self, text: &[char]) -> Vec<char> {
        let mut out = Vec::with_capacity(text.len());
        for &c in text {
            let c = match (c, self.line_feed) {
                (LINE_FEED, LineFeedTreatment::Ignore) => continue,
                (LINE_FEED, LineFeedTreatment::TreatAsSpace) => SPACE,
                (LINE_FEED, LineFeedTreatment::TreatAsZeroWidthSpace) => ZERO_WIDTH_SPACE,
                (c, _) => c,
            };
            if self.collapse && c == SPACE && out.last() == Some(&SPACE) {
                continue;
            }
            out.push(c);
        }
        out
    }

    /// Whether processed whitespace is dropped next to a line break
    pub fn suppresses(&self, processed: &[char]) -> bool {
        match self.suppress_at_line_break {
            SuppressAtLineBreakTreatment::Retain => false,
            SuppressAtLineBreakTreatment::Suppress => true,
            SuppressAtLineBreakTreatment::Auto => processed.iter().all(|&c| c == SPACE),
        }
    }
}

impl Default for WhitespaceState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Whitespace> for WhitespaceState {
    fn from(whitespace: Whitespace) -> Self {
        match whitespace {
            Whitespace::Default => Self::DEFAULT,
            Whitespace::Preserve => Self::PRESERVE,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Break Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of break opportunity ending a segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineBreak {
    Hard,
    SoftIdeograph,
    SoftHyphenationPoint,
    SoftWhitespace,
    Unknown,
}

impl InlineBreak {
    pub fn is_hard(self) -> bool {
        self == InlineBreak::Hard
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Runs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunKind {
    Whitespace,
    NonWhitespace,
    Embedding,
}

pub(crate) struct TextRun {
    pub kind: RunKind,
    /// Phrase offset of the first character
    pub start: usize,
    /// Phrase offset past the last character
    pub end: usize,
    fonts: SmallVec<[StyleAttributeInterval; 2]>,
    text: Vec<char>,
    suppress: bool,
    embedding: Option<Arc<Phrase>>,
    area: Option<InlineBlockArea>,
}

impl TextRun {
    fn new(kind: RunKind, phrase: &Phrase, start: usize, end: usize, default_font: &Arc<Font>) -> Self {
        Self {
            kind,
            start,
            end,
            fonts: font_intervals(phrase, start, end, default_font),
            text: Vec::new(),
            suppress: false,
            embedding: None,
            area: None,
        }
    }

    pub fn whitespace(
        phrase: &Phrase,
        start: usize,
        end: usize,
        default_font: &Arc<Font>,
        whitespace: &WhitespaceState,
    ) -> Self {
        let mut run = Self::new(RunKind::Whitespace, phrase, start, end, default_font);
        run.text = whitespace.process(&phrase.chars()[start..end]);
        run.suppress = whitespace.suppresses(&run.text);
        run
    }

    pub fn non_whitespace(phrase: &Phrase, start: usize, end: usize, default_font: &Arc<Font>) -> Self {
        let mut run = Self::new(RunKind::NonWhitespace, phrase, start, end, default_font);
        let raw = &phrase.chars()[start..end];
        let mut text = Vec::with_capacity(raw.len());
        for interval in &run.fonts {
            let span = interval.intersection(start, end).unwrap_or(start..end);
            let segment: String = raw[span.start - start..span.end - start].iter().collect();
            let segment = match interval.font() {
                Some(font) => apply_width_features(segment, font),
                None => segment,
            };
            text.extend(segment.chars());
        }
        run.text = text;
        run
    }

    pub fn embedding(phrase: &Phrase, index: usize, default_font: &Arc<Font>) -> Self {
        let mut run = Self::new(RunKind::Embedding, phrase, index, index + 1, default_font);
        run.text = vec![OBJECT_REPLACEMENT];
        run.embedding = phrase.embedding(index);
        run
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn text_range(&self, from: usize, to: usize) -> String {
        let to = to.min(self.text.len());
        let from = from.min(to);
        self.text[from..to].iter().collect()
    }

    pub fn font_intervals(&self) -> &[StyleAttributeInterval] {
        &self.fonts
    }

    /// Font of the first sub-interval
    pub fn leading_font(&self) -> Option<&Arc<Font>> {
        self.fonts.first().and_then(StyleAttributeInterval::font)
    }

    /// Whether the whole run is dropped when it opens a line
    pub fn suppress_after_line_break(&self) -> bool {
        self.suppress
    }

    pub fn embedded_phrase(&self) -> Option<&Arc<Phrase>> {
        self.embedding.as_ref()
    }

    pub fn area(&self) -> Option<&InlineBlockArea> {
        self.area.as_ref()
    }

    pub fn set_area(&mut self, area: InlineBlockArea) {
        self.area = Some(area);
    }

    /// Phrase offset corresponding to run offset `offset`
    pub fn phrase_offset(&self, offset: usize) -> usize {
        (self.start + offset).min(self.end.saturating_sub(1))
    }

    /// Advance of `[from, to)`. Whitespace is measured in its leading font;
    /// other text per font sub-interval. Embedding runs measure through
    /// their laid out area instead.
    pub fn advance(&self, from: usize, to: usize) -> f64 {
        match self.kind {
            RunKind::Embedding => self.area.as_ref().map(InlineBlockArea::ipd).unwrap_or(0.0),
            RunKind::Whitespace => self
                .leading_font()
                .map(|font| font.advance(&self.text_range(from, to)))
                .unwrap_or(0.0),
            RunKind::NonWhitespace => self
                .font_segments(from, to)
                .map(|(font, text)| font.advance(&text))
                .sum(),
        }
    }

    /// Split `[from, to)` at font sub-interval boundaries
    pub fn font_segments(&self, from: usize, to: usize) -> impl Iterator<Item = (&Arc<Font>, String)> + '_ {
        let (start, end) = (self.start + from, self.start + to);
        self.fonts.iter().filter_map(move |interval| {
            let font = interval.font()?;
            let span = interval.intersection(start, end)?;
            Some((font, self.text_range(span.start - self.start, span.end - self.start)))
        })
    }

    /// Classify the break ending at run offset `to`
    pub fn inline_break(&self, to: usize) -> InlineBreak {
        let last = to
            .checked_sub(1)
            .and_then(|i| self.text.get(i))
            .copied();
        match (self.kind, last) {
            (RunKind::Whitespace, Some(LINE_SEPARATOR | PARAGRAPH_SEPARATOR | LINE_FEED)) => {
                InlineBreak::Hard
            }
            (RunKind::Whitespace, _) => InlineBreak::SoftWhitespace,
            (RunKind::NonWhitespace, Some(c)) if is_hyphen(c) => InlineBreak::SoftHyphenationPoint,
            (RunKind::NonWhitespace, Some(c)) if is_ideograph(c) => InlineBreak::SoftIdeograph,
            _ => InlineBreak::Unknown,
        }
    }
}

fn apply_width_features(text: String, font: &Font) -> String {
    font.features()
        .iter()
        .fold(text, |text, feature| match feature.tag.as_str() {
            FontFeature::HALF_WIDTH => to_half_width(&text),
            FontFeature::FULL_WIDTH => to_full_width(&text),
            _ => text,
        })
}

/// Decompose `[start, end)` by font, collapsing to the outer scope when the
/// whole run shares one font
fn font_intervals(
    phrase: &Phrase,
    start: usize,
    end: usize,
    default_font: &Arc<Font>,
) -> SmallVec<[StyleAttributeInterval; 2]> {
    let mut intervals: SmallVec<[StyleAttributeInterval; 2]> = SmallVec::new();
    let mut i = start;
    while i < end {
        let limit = phrase.run_limit(StyleAttribute::Font, i).min(end);
        let font = match phrase.attribute(StyleAttribute::Font, i) {
            Some(AttributeValue::Font(font)) => font.clone(),
            _ => default_font.clone(),
        };
        intervals.push(StyleAttributeInterval::new(AttributeValue::Font(font), i..limit));
        i = limit;
    }
    match intervals.len() {
        0 => smallvec![StyleAttributeInterval::outer(AttributeValue::Font(
            default_font.clone()
        ))],
        1 => {
            let value = intervals[0].value().clone();
            smallvec![StyleAttributeInterval::outer(value)]
        }
        _ => intervals,
    }
}

/// Segment the run starting at `*cursor` and move the cursor past it
pub(crate) fn next_run(
    phrase: &Phrase,
    cursor: &mut usize,
    default_font: &Arc<Font>,
    whitespace: &WhitespaceState,
) -> Option<TextRun> {
    let start = *cursor;
    let first = phrase.char_at(start)?;
    if first == OBJECT_REPLACEMENT {
        *cursor = start + 1;
        return Some(TextRun::embedding(phrase, start, default_font));
    }
    let in_whitespace = is_breaking_whitespace(first);
    let mut end = start + 1;
    while let Some(c) = phrase.char_at(end) {
        if c == OBJECT_REPLACEMENT
            || in_whitespace != is_breaking_whitespace(c)
            || phrase.is_run_start(StyleAttribute::Annotations, end)
        {
            break;
        }
        end += 1;
    }
    *cursor = end;
    Some(if in_whitespace {
        TextRun::whitespace(phrase, start, end, default_font, whitespace)
    } else {
        TextRun::non_whitespace(phrase, start, end, default_font)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_font, fixed_font_for};
    use galley_core::{Extent, FontKey};

    fn runs(phrase: &Phrase, whitespace: &WhitespaceState) -> Vec<TextRun> {
        let font = phrase.font(None);
        let mut cursor = 0;
        let mut out = Vec::new();
        while let Some(run) = next_run(phrase, &mut cursor, &font, whitespace) {
            out.push(run);
        }
        out
    }

    fn texts(runs: &[TextRun]) -> Vec<String> {
        runs.iter().map(|r| r.text_range(0, r.len())).collect()
    }

    #[test]
    fn test_segmentation() {
        let phrase = Phrase::new("ab  cd\u{FFFC}e", fixed_font(20.0));
        let runs = runs(&phrase, &WhitespaceState::PRESERVE);
        let kinds: Vec<RunKind> = runs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RunKind::NonWhitespace,
                RunKind::Whitespace,
                RunKind::NonWhitespace,
                RunKind::Embedding,
                RunKind::NonWhitespace
            ]
        );
        assert_eq!(texts(&runs), vec!["ab", "  ", "cd", "\u{FFFC}", "e"]);
        assert_eq!((runs[2].start, runs[2].end), (4, 6));
    }

    #[test]
    fn test_annotation_splits_runs() {
        let phrase = Phrase::new("abcdef", fixed_font(20.0))
            .with_annotations(vec![Phrase::new("x", fixed_font(10.0))], 2..4);
        let runs = runs(&phrase, &WhitespaceState::DEFAULT);
        assert_eq!(texts(&runs), vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn test_default_whitespace_processing() {
        let ws = WhitespaceState::DEFAULT;
        let processed = ws.process(&[' ', '\n', ' ', ' ']);
        assert_eq!(processed, vec![' ']);
        assert!(ws.suppresses(&processed));
        assert!(!ws.suppresses(&['\u{2028}']));
    }

    #[test]
    fn test_line_feed_treatments() {
        let text = ['\n', ' '];
        let mut ws = WhitespaceState::PRESERVE;
        assert_eq!(ws.process(&text), vec!['\n', ' ']);
        ws.line_feed = LineFeedTreatment::Ignore;
        assert_eq!(ws.process(&text), vec![' ']);
        ws.line_feed = LineFeedTreatment::TreatAsZeroWidthSpace;
        assert_eq!(ws.process(&text), vec![ZERO_WIDTH_SPACE, ' ']);
        assert!(!ws.suppresses(&[' ']));
        ws.suppress_at_line_break = SuppressAtLineBreakTreatment::Suppress;
        assert!(ws.suppresses(&[ZERO_WIDTH_SPACE]));
    }

    #[test]
    fn test_break_classification() {
        let phrase = Phrase::new("a \n\u{2028}well-漢 b", fixed_font(20.0));
        let runs = runs(&phrase, &WhitespaceState::PRESERVE);
        // " \n\u{2028}"
        assert_eq!(runs[1].inline_break(2), InlineBreak::Hard);
        assert_eq!(runs[1].inline_break(3), InlineBreak::Hard);
        assert_eq!(runs[1].inline_break(1), InlineBreak::SoftWhitespace);
        // "well-漢"
        assert_eq!(runs[2].inline_break(5), InlineBreak::SoftHyphenationPoint);
        assert_eq!(runs[2].inline_break(6), InlineBreak::SoftIdeograph);
        assert_eq!(runs[2].inline_break(4), InlineBreak::Unknown);

        let runs = self::runs(&phrase, &WhitespaceState::DEFAULT);
        assert_eq!(runs[1].text_range(0, runs[1].len()), " \u{2028}");
        assert_eq!(runs[1].inline_break(1), InlineBreak::SoftWhitespace);
    }

    #[test]
    fn test_font_intervals_collapse_to_outer_scope() {
        let base = fixed_font(20.0);
        let big = fixed_font(40.0);
        let phrase = Phrase::new("abcd efgh", base.clone()).with_font_span(big.clone(), 2..4);
        let runs = runs(&phrase, &WhitespaceState::DEFAULT);

        assert_eq!(runs[0].font_intervals().len(), 2);
        assert_eq!(runs[0].font_intervals()[1].span(), Some(2..4));
        // 2 chars at 10 + 2 chars at 20
        assert_eq!(runs[0].advance(0, 4), 60.0);
        assert_eq!(runs[0].advance(1, 3), 30.0);

        assert!(runs[2].font_intervals()[0].is_outer_scope());
        assert_eq!(runs[2].advance(0, 4), 40.0);
        assert_eq!(runs[1].advance(0, 1), 5.0);
    }

    #[test]
    fn test_width_features() {
        let half = fixed_font_for(
            FontKey::new("Fixed", Extent::uniform(20.0)).with_feature(FontFeature::half_width()),
        );
        let phrase = Phrase::new("ＡＢ", half);
        let runs = runs(&phrase, &WhitespaceState::DEFAULT);
        assert_eq!(runs[0].text_range(0, 2), "AB");
    }
}
