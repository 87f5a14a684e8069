//! Shared fixtures for galley_text integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use galley_core::{Extent, Font, FontError, FontKey, FontOutline, OutlineLoader};

/// Monospaced outline: 500 units per character, 250 per space, with a
/// counter of glyph lookups
#[derive(Default)]
pub struct CountingOutline {
    pub lookups: AtomicUsize,
}

impl CountingOutline {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl FontOutline for CountingOutline {
    fn units_per_em(&self) -> u16 {
        1000
    }

    fn ascender(&self) -> i16 {
        800
    }

    fn descender(&self) -> i16 {
        -200
    }

    fn line_gap(&self) -> i16 {
        100
    }

    fn family_name(&self) -> Option<String> {
        Some("Counting".to_string())
    }

    fn glyph_id(&self, c: char) -> u16 {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if c == ' ' {
            1
        } else {
            2
        }
    }

    fn advance_width(&self, glyph: u16) -> u16 {
        if glyph == 1 {
            250
        } else {
            500
        }
    }

    fn has_kerning(&self) -> bool {
        false
    }

    fn kerning(&self, glyphs: &[u16]) -> Vec<i16> {
        vec![0; glyphs.len()]
    }
}

/// Hands out the same outline for every load
pub struct SharedLoader(pub Arc<CountingOutline>);

impl OutlineLoader for SharedLoader {
    fn load(
        &self,
        _source: &Path,
        _index: u32,
        _kerning: bool,
    ) -> Result<Arc<dyn FontOutline>, FontError> {
        Ok(self.0.clone())
    }
}

/// Font at `size` over `outline`; size 20 gives 10 per character and 5 per
/// space, line height 25
pub fn font_with(outline: &Arc<CountingOutline>, size: f64) -> Arc<Font> {
    Arc::new(Font::with_loader(
        FontKey::new("Counting", Extent::uniform(size)),
        "counting.ttf",
        Arc::new(SharedLoader(outline.clone())),
    ))
}

pub fn font(size: f64) -> Arc<Font> {
    font_with(&Arc::new(CountingOutline::default()), size)
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
