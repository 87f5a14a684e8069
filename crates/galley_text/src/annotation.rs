//! Annotation (ruby) layout
//!
//! An annotation phrase is laid out like any other phrase, unbounded and
//! sized to fit, one nesting level below its base text. Each resulting line
//! becomes an [`AnnotationArea`] aligned against the advance of the base
//! text it annotates.

use galley_core::AnnotationArea;

use crate::align::align_line;
use crate::error::Result;
use crate::layout::{Consume, LineLayout};
use crate::phrase::Phrase;
use crate::state::LayoutState;

pub struct AnnotationLayout<'a> {
    phrase: &'a Phrase,
    state: &'a LayoutState,
    depth: usize,
}

impl<'a> AnnotationLayout<'a> {
    pub fn new(phrase: &'a Phrase, state: &'a LayoutState) -> Self {
        Self::nested(phrase, state, 1)
    }

    pub(crate) fn nested(phrase: &'a Phrase, state: &'a LayoutState, depth: usize) -> Self {
        Self {
            phrase,
            state,
            depth,
        }
    }

    /// Lay out the annotation over base text of IPD `base_advance`
    pub fn layout(&self, base_advance: f64) -> Result<Vec<AnnotationArea>> {
        let alignment = self.phrase.annotation_align(None);
        let offset = self.phrase.annotation_offset(None);
        let position = self.phrase.annotation_position(None);
        let lines = LineLayout::nested(self.phrase, self.state, self.depth)
            .layout(f64::INFINITY, Consume::Fit)?;

        let relative = alignment.relativize(self.state.writing_mode());
        lines
            .into_iter()
            .map(|mut line| {
                align_line(&mut line, base_advance, relative, self.state.justifier())?;
                Ok(AnnotationArea::new(line, alignment, offset, position))
            })
            .collect()
    }
}
