//! Deterministic fonts for unit tests

use std::path::Path;
use std::sync::Arc;

use galley_core::chars::is_breaking_whitespace;
use galley_core::{Extent, Font, FontError, FontKey, FontOutline, OutlineLoader};

/// 1000 units per em; spaces advance 250 units, everything else 500
pub(crate) struct FixedOutline;

impl FontOutline for FixedOutline {
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
        Some("Fixed".to_string())
    }

    fn glyph_id(&self, c: char) -> u16 {
        if is_breaking_whitespace(c) {
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

pub(crate) struct FixedLoader;

impl OutlineLoader for FixedLoader {
    fn load(
        &self,
        _source: &Path,
        _index: u32,
        _kerning: bool,
    ) -> Result<Arc<dyn FontOutline>, FontError> {
        Ok(Arc::new(FixedOutline))
    }
}

pub(crate) fn fixed_font_for(key: FontKey) -> Arc<Font> {
    Arc::new(Font::with_loader(key, "fixed.ttf", Arc::new(FixedLoader)))
}

/// Size 20 gives 10 per character and 5 per space
pub(crate) fn fixed_font(size: f64) -> Arc<Font> {
    fixed_font_for(FontKey::new("Fixed", Extent::uniform(size)))
}
