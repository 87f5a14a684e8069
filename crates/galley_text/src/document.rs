//! Paragraph sequence layout

use galley_core::{BlockArea, LineArea};

use crate::error::Result;
use crate::layout::{Consume, LineLayout};
use crate::phrase::Phrase;
use crate::state::LayoutState;

/// Lay out paragraphs in document order. Each paragraph gets its own result
/// and its own line numbering; a failing paragraph does not stop the rest.
pub fn layout_paragraphs(
    paragraphs: &[Phrase],
    state: &LayoutState,
    available: f64,
    consume: Consume,
) -> Vec<Result<Vec<LineArea>>> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(index, paragraph)| {
            let result = LineLayout::new(paragraph, state).layout(available, consume);
            if let Err(e) = &result {
                tracing::warn!("Paragraph {} failed to lay out: {}", index, e);
            }
            result
        })
        .collect()
}

/// Stack the lines of every successful paragraph into one block
pub fn stack_lines(results: Vec<Result<Vec<LineArea>>>) -> BlockArea {
    let mut block = BlockArea::default();
    for line in results.into_iter().flatten().flatten() {
        block.push_line(line);
    }
    block
}
