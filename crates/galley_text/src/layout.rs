//! Line layout engine
//!
//! Breaks a [`Phrase`] into [`LineArea`]s. Runs are scanned in order and cut
//! at word break opportunities; opportunities are accumulated greedily until
//! the next one no longer fits, at which point a line is emitted. A word that
//! does not fit on an empty line is broken at character boundaries instead.
//! Finally every line is aligned against the widest one.

use std::sync::Arc;

use galley_core::chars::LINE_SEPARATOR;
use galley_core::{
    AreaNode, Color, Font, GlyphArea, InlineAlignment, InlineBlockArea, LineArea, SpaceArea,
    Wrap,
};

use crate::align::align_line;
use crate::annotation::AnnotationLayout;
use crate::breaks::BreakIterator;
use crate::error::{LayoutError, Result};
use crate::phrase::Phrase;
use crate::run::{next_run, InlineBreak, RunKind, TextRun, WhitespaceState};
use crate::state::LayoutState;

/// How much of the available measure a line takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consume {
    /// Every line is as wide as the available measure
    #[default]
    Max,
    /// Every line is as wide as its content
    Fit,
}

/// Break opportunity within one run, as run offsets `[start, end)`
#[derive(Debug, Clone, Copy)]
struct InlineBreakOpportunity {
    run: usize,
    kind: InlineBreak,
    start: usize,
    end: usize,
    advance: f64,
    /// Dropped when it lands at either edge of a line
    suppress: bool,
}

/// Measure left on the current line; the full measure once the line is
/// exactly full
fn remaining(available: f64, consumed: f64) -> f64 {
    let left = available - consumed;
    if left > 0.0 {
        left
    } else {
        available
    }
}

/// Line breaker for one phrase
pub struct LineLayout<'a> {
    phrase: &'a Phrase,
    state: &'a LayoutState,
    depth: usize,
    line_number: usize,

    // paragraph styles
    color: Color,
    text_align: InlineAlignment,
    wrap: Wrap,
    font: Arc<Font>,
    line_height: f64,
    whitespace: WhitespaceState,
}

impl<'a> LineLayout<'a> {
    pub fn new(phrase: &'a Phrase, state: &'a LayoutState) -> Self {
        Self::nested(phrase, state, 0)
    }

    /// Layout of a phrase nested `depth` levels inside embeddings or
    /// annotations
    pub(crate) fn nested(phrase: &'a Phrase, state: &'a LayoutState, depth: usize) -> Self {
        let font = phrase.font(None);
        Self {
            phrase,
            state,
            depth,
            line_number: 0,
            color: phrase.color(None),
            text_align: phrase.text_align(None).relativize(state.writing_mode()),
            wrap: phrase.wrap(None).unwrap_or(state.wrap()),
            line_height: phrase.line_height(None),
            whitespace: *state.whitespace(),
            font,
        }
    }

    /// Break the phrase into lines of at most `available` IPD. A measure
    /// that is not positive yields no lines.
    pub fn layout(&mut self, available: f64, consume: Consume) -> Result<Vec<LineArea>> {
        if self.depth > self.state.max_depth() {
            return Err(LayoutError::NestingTooDeep {
                depth: self.depth,
                limit: self.state.max_depth(),
            });
        }
        self.line_number = 0;
        let mut lines = Vec::new();
        if !(available > 0.0) {
            return Ok(lines);
        }

        let mut runs: Vec<TextRun> = Vec::new();
        let mut breaks: Vec<InlineBreakOpportunity> = Vec::new();
        let mut consumed = 0.0;
        let mut words = self.state.word_breaks().iterator();
        let mut chars = self.state.character_breaks().iterator();
        let mut cursor = 0;

        while let Some(run) = next_run(self.phrase, &mut cursor, &self.font, &self.whitespace) {
            let ri = runs.len();
            runs.push(run);
            if breaks.is_empty() && runs[ri].suppress_after_line_break() {
                tracing::trace!("Skipping suppressed run at {}", runs[ri].start);
                continue;
            }

            let text: String = runs[ri].text().iter().collect();
            words.set_text(&text);
            words.first();
            // Start offset of the span being broken at character boundaries
            let mut fallback: Option<usize> = None;
            let left = remaining(available, consumed);
            let mut pending = self.next_break(&mut runs, ri, words.as_mut(), 0, left)?;

            while let Some(b) = pending.take() {
                let overflows = consumed + b.advance > available;
                if self.is_hard(&runs, &b) {
                    lines.push(self.emit(&runs, &mut breaks, available, consumed, consume)?);
                    consumed = 0.0;
                } else if overflows && self.wrap == Wrap::Wrap && !breaks.is_empty() {
                    lines.push(self.emit(&runs, &mut breaks, available, consumed, consume)?);
                    consumed = 0.0;
                    if !b.suppress {
                        pending = Some(b);
                        continue;
                    }
                    tracing::trace!("Dropping suppressed whitespace at line start");
                } else if overflows && self.wrap == Wrap::Wrap && fallback.is_none() {
                    tracing::trace!(
                        "Breaking '{}' at character boundaries",
                        runs[ri].text_range(b.start, b.end)
                    );
                    chars.set_text(&runs[ri].text_range(b.start, b.end));
                    chars.first();
                    fallback = Some(b.start);
                } else {
                    consumed += b.advance;
                    breaks.push(b);
                }

                let left = remaining(available, consumed);
                pending = match fallback {
                    Some(base) => {
                        match self.next_break(&mut runs, ri, chars.as_mut(), base, left)? {
                            Some(next) => Some(next),
                            None => {
                                fallback = None;
                                self.next_break(&mut runs, ri, words.as_mut(), 0, left)?
                            }
                        }
                    }
                    None => self.next_break(&mut runs, ri, words.as_mut(), 0, left)?,
                };
            }
        }
        if !breaks.is_empty() {
            lines.push(self.emit(&runs, &mut breaks, available, consumed, consume)?);
        }

        self.align(&mut lines)?;
        Ok(lines)
    }

    fn next_break(
        &self,
        runs: &mut [TextRun],
        ri: usize,
        iterator: &mut dyn BreakIterator,
        base: usize,
        available: f64,
    ) -> Result<Option<InlineBreakOpportunity>> {
        let from = base + iterator.current();
        let Some(to) = iterator.next() else {
            return Ok(None);
        };
        let to = base + to;
        let advance = self.run_advance(&mut runs[ri], from, to, available)?;
        let run = &runs[ri];
        let suppress = run.kind == RunKind::Whitespace
            && self.whitespace.suppresses(&run.text()[from.min(run.len())..to.min(run.len())]);
        Ok(Some(InlineBreakOpportunity {
            run: ri,
            kind: run.inline_break(to),
            start: from,
            end: to,
            advance,
            suppress,
        }))
    }

    /// Advance of `[from, to)` in `run`. An embedding is laid out on first
    /// use against the remaining measure and memoized.
    fn run_advance(&self, run: &mut TextRun, from: usize, to: usize, available: f64) -> Result<f64> {
        if run.kind == RunKind::Embedding && run.area().is_none() {
            if let Some(phrase) = run.embedded_phrase().cloned() {
                let lines = LineLayout::nested(&phrase, self.state, self.depth + 1)
                    .layout(available, Consume::Fit)?;
                run.set_area(InlineBlockArea::from_lines(lines));
            }
        }
        Ok(run.advance(from, to))
    }

    fn is_hard(&self, runs: &[TextRun], b: &InlineBreakOpportunity) -> bool {
        if b.kind.is_hard() {
            return true;
        }
        let run = &runs[b.run];
        run.kind == RunKind::Whitespace
            && b.end == b.start + 1
            && run.text().get(b.start) == Some(&LINE_SEPARATOR)
    }

    fn emit(
        &mut self,
        runs: &[TextRun],
        breaks: &mut Vec<InlineBreakOpportunity>,
        available: f64,
        mut consumed: f64,
        consume: Consume,
    ) -> Result<LineArea> {
        while let Some(&b) = breaks.first() {
            if !b.suppress {
                break;
            }
            consumed -= b.advance;
            breaks.remove(0);
        }
        while let Some(&b) = breaks.last() {
            if !b.suppress {
                break;
            }
            consumed -= b.advance;
            breaks.pop();
        }

        let ipd = match consume {
            Consume::Max => available,
            Consume::Fit => consumed,
        };
        self.line_number += 1;
        let mut line = LineArea::new(
            ipd,
            self.line_height,
            self.text_align,
            self.color,
            self.font.clone(),
            self.line_number,
        );
        self.add_text_areas(&mut line, runs, breaks)?;
        if consumed > available {
            line.set_overflow(consumed - available);
        }
        tracing::debug!(
            "Emitted line {} ipd={} consumed={} overflow={}",
            self.line_number,
            ipd,
            consumed,
            line.overflow()
        );
        breaks.clear();
        Ok(line)
    }

    /// Coalesce consecutive breaks of the same run into one area each,
    /// preceded by the annotations of that text
    fn add_text_areas(
        &self,
        line: &mut LineArea,
        runs: &[TextRun],
        breaks: &[InlineBreakOpportunity],
    ) -> Result<()> {
        let mut i = 0;
        while i < breaks.len() {
            let ri = breaks[i].run;
            let mut j = i;
            let mut advance = 0.0;
            while j < breaks.len() && breaks[j].run == ri {
                advance += breaks[j].advance;
                j += 1;
            }
            let run = &runs[ri];
            let (from, to) = (breaks[i].start, breaks[j - 1].end);
            self.add_annotation_areas(line, run.phrase_offset(from), advance)?;
            self.add_text_area(line, run, from, to, advance)?;
            i = j;
        }
        Ok(())
    }

    fn add_text_area(
        &self,
        line: &mut LineArea,
        run: &TextRun,
        from: usize,
        to: usize,
        advance: f64,
    ) -> Result<()> {
        match run.kind {
            RunKind::Whitespace => {
                let font = run.leading_font().unwrap_or(&self.font).clone();
                let text = run.text_range(from, to);
                line.add_child(AreaNode::Space(SpaceArea::new(
                    advance,
                    self.line_height,
                    text,
                    font,
                )))?;
            }
            RunKind::Embedding => {
                if let Some(area) = run.area() {
                    line.add_child(AreaNode::InlineBlock(area.clone()))?;
                }
            }
            RunKind::NonWhitespace => {
                if run.font_intervals().len() == 1 {
                    let font = run.leading_font().unwrap_or(&self.font).clone();
                    let text = run.text_range(from, to);
                    line.add_child(AreaNode::Glyph(GlyphArea::new(
                        advance,
                        self.line_height,
                        text,
                        font,
                    )))?;
                } else {
                    for (font, segment) in run.font_segments(from, to) {
                        line.add_child(AreaNode::Glyph(GlyphArea::new(
                            font.advance(&segment),
                            self.line_height,
                            segment,
                            font.clone(),
                        )))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn add_annotation_areas(&self, line: &mut LineArea, offset: usize, advance: f64) -> Result<()> {
        let Some(annotations) = self.phrase.annotations(offset) else {
            return Ok(());
        };
        for annotation in annotations.iter() {
            let areas = AnnotationLayout::nested(annotation, self.state, self.depth + 1)
                .layout(advance)?;
            for area in areas {
                line.add_child(AreaNode::Annotation(area))?;
            }
        }
        Ok(())
    }

    /// Align every line against the widest and give them all its IPD
    fn align(&self, lines: &mut [LineArea]) -> Result<()> {
        let measure = lines.iter().map(|l| l.ipd).fold(0.0, f64::max);
        for line in lines.iter_mut() {
            align_line(line, measure, self.text_align, self.state.justifier())?;
            line.ipd = measure;
        }
        Ok(())
    }
}
