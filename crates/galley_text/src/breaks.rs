//! Break opportunity iteration
//!
//! Layout walks text through a [`BreakIterator`], which reports boundary
//! offsets in characters. [`WordBreaks`] finds UAX #14 line break
//! opportunities; [`CharacterBreaks`] finds extended grapheme cluster
//! boundaries and is used when a single word does not fit on a line.

use unicode_linebreak::linebreaks;
use unicode_segmentation::UnicodeSegmentation;

/// Restartable iterator over boundary offsets of a text
pub trait BreakIterator: Send {
    /// Replace the text and reset to its start
    fn set_text(&mut self, text: &str);

    /// Reset to the first boundary (always 0) and return it
    fn first(&mut self) -> usize;

    /// Boundary most recently returned
    fn current(&self) -> usize;

    /// Advance to the following boundary, `None` at the end of the text
    fn next(&mut self) -> Option<usize>;
}

/// Factory for break iterators
pub trait BreakProvider: Send + Sync {
    fn iterator(&self) -> Box<dyn BreakIterator>;
}

/// Line break opportunities (UAX #14)
#[derive(Clone, Copy, Debug, Default)]
pub struct WordBreaks;

impl BreakProvider for WordBreaks {
    fn iterator(&self) -> Box<dyn BreakIterator> {
        Box::new(Boundaries::new(word_boundaries))
    }
}

/// Extended grapheme cluster boundaries
#[derive(Clone, Copy, Debug, Default)]
pub struct CharacterBreaks;

impl BreakProvider for CharacterBreaks {
    fn iterator(&self) -> Box<dyn BreakIterator> {
        Box::new(Boundaries::new(character_boundaries))
    }
}

/// Boundaries computed up front by a segmentation function
struct Boundaries {
    segment: fn(&str) -> Vec<usize>,
    offsets: Vec<usize>,
    position: usize,
}

impl Boundaries {
    fn new(segment: fn(&str) -> Vec<usize>) -> Self {
        Self {
            segment,
            offsets: vec![0],
            position: 0,
        }
    }
}

impl BreakIterator for Boundaries {
    fn set_text(&mut self, text: &str) {
        self.offsets = (self.segment)(text);
        self.position = 0;
    }

    fn first(&mut self) -> usize {
        self.position = 0;
        self.current()
    }

    fn current(&self) -> usize {
        self.offsets.get(self.position).copied().unwrap_or(0)
    }

    fn next(&mut self) -> Option<usize> {
        if self.position + 1 < self.offsets.len() {
            self.position += 1;
            Some(self.offsets[self.position])
        } else {
            None
        }
    }
}

// The end of text counts as an ordinary boundary: hard breaks are decided
// by the runs themselves.
fn word_boundaries(text: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    let mut chars = text.char_indices().peekable();
    let mut count = 0;
    for (byte, _) in linebreaks(text) {
        while let Some(&(i, _)) = chars.peek() {
            if i >= byte {
                break;
            }
            chars.next();
            count += 1;
        }
        if offsets.last() != Some(&count) {
            offsets.push(count);
        }
    }
    offsets
}

fn character_boundaries(text: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    let mut count = 0;
    for grapheme in text.graphemes(true) {
        count += grapheme.chars().count();
        offsets.push(count);
    }
    offsets
}
