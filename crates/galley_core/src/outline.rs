//! Font outline access
//!
//! A [`FontOutline`] is the parsed font resource behind a [`Font`](crate::font::Font):
//! glyph lookup, advance widths, pair kerning and vertical metrics, all in
//! design units. [`OutlineLoader`] resolves and parses a resource path; the
//! default [`TtfOutlineLoader`] reads TrueType/OpenType files via ttf-parser.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;
use ttf_parser::{name_id, Face, GlyphId};

/// Font resource errors
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse font: {0}")]
    Parse(#[from] ttf_parser::FaceParsingError),

    #[error("Font is missing required table '{0}'")]
    MissingTable(&'static str),

    #[error("Font not found: {0}")]
    NotFound(String),
}

/// Parsed font resource queried by [`Font`](crate::font::Font)
pub trait FontOutline: Send + Sync {
    fn units_per_em(&self) -> u16;

    /// Typographic ascender in design units
    fn ascender(&self) -> i16;

    /// Typographic descender in design units (usually negative)
    fn descender(&self) -> i16;

    /// Typographic line gap in design units
    fn line_gap(&self) -> i16;

    fn family_name(&self) -> Option<String>;

    /// Typographic (preferred) family name, when the font declares one
    fn preferred_family_name(&self) -> Option<String> {
        None
    }

    /// Glyph for a character; 0 (`.notdef`) when unmapped
    fn glyph_id(&self, c: char) -> u16;

    fn advance_width(&self, glyph: u16) -> u16;

    /// Whether a horizontal kerning table is present
    fn has_kerning(&self) -> bool;

    /// Pair kerning for a glyph sequence: entry `i` adjusts the space between
    /// glyph `i` and glyph `i + 1`; the last entry is always 0.
    fn kerning(&self, glyphs: &[u16]) -> Vec<i16>;
}

/// Resolves and parses a font resource
pub trait OutlineLoader: Send + Sync {
    /// Load face `index` of the resource at `source`. When `kerning` is
    /// false the kerning table is never consulted.
    fn load(
        &self,
        source: &Path,
        index: u32,
        kerning: bool,
    ) -> Result<Arc<dyn FontOutline>, FontError>;
}

/// Loader for TrueType/OpenType files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct TtfOutlineLoader;

impl OutlineLoader for TtfOutlineLoader {
    fn load(
        &self,
        source: &Path,
        index: u32,
        kerning: bool,
    ) -> Result<Arc<dyn FontOutline>, FontError> {
        let data = std::fs::read(source).map_err(|e| FontError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        let outline = TtfOutline::from_data(data, index, kerning)?;
        Ok(Arc::new(outline))
    }
}

/// Outline tables extracted from a TrueType/OpenType face
pub struct TtfOutline {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
    family_name: Option<String>,
    preferred_family_name: Option<String>,
    /// Unicode code point -> glyph id
    cmap: FxHashMap<u32, u16>,
    /// Horizontal advance per glyph id
    advances: Vec<u16>,
    has_kerning: bool,
}

impl TtfOutline {
    /// Parse face `index` of `data`. Fails when the name, OS/2 or cmap
    /// table is absent.
    pub fn from_data(data: Vec<u8>, index: u32, kerning: bool) -> Result<Self, FontError> {
        let face = Face::parse(&data, index)?;
        let tables = face.tables();
        let os2 = tables.os2.ok_or(FontError::MissingTable("OS/2"))?;
        tables.name.ok_or(FontError::MissingTable("name"))?;
        let cmap_table = tables.cmap.ok_or(FontError::MissingTable("cmap"))?;

        let mut cmap = FxHashMap::default();
        for subtable in cmap_table.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|cp| {
                if let Some(glyph) = subtable.glyph_index(cp) {
                    cmap.entry(cp).or_insert(glyph.0);
                }
            });
        }

        let advances = (0..face.number_of_glyphs())
            .map(|gid| face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0))
            .collect();

        let has_kerning = kerning
            && tables
                .kern
                .map(|kern| kern.subtables.into_iter().any(|s| s.horizontal))
                .unwrap_or(false);

        let family_name = find_name(&face, name_id::FAMILY);
        let preferred_family_name = find_name(&face, name_id::TYPOGRAPHIC_FAMILY);

        Ok(Self {
            units_per_em: face.units_per_em(),
            ascender: os2.typographic_ascender(),
            descender: os2.typographic_descender(),
            line_gap: os2.typographic_line_gap(),
            family_name,
            preferred_family_name,
            cmap,
            advances,
            has_kerning,
            data,
            index,
        })
    }
}

fn find_name(face: &Face<'_>, id: u16) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == id)
        .find_map(|name| name.to_string())
}

impl FontOutline for TtfOutline {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn ascender(&self) -> i16 {
        self.ascender
    }

    fn descender(&self) -> i16 {
        self.descender
    }

    fn line_gap(&self) -> i16 {
        self.line_gap
    }

    fn family_name(&self) -> Option<String> {
        self.family_name.clone()
    }

    fn preferred_family_name(&self) -> Option<String> {
        self.preferred_family_name.clone()
    }

    fn glyph_id(&self, c: char) -> u16 {
        self.cmap.get(&(c as u32)).copied().unwrap_or(0)
    }

    fn advance_width(&self, glyph: u16) -> u16 {
        self.advances.get(glyph as usize).copied().unwrap_or(0)
    }

    fn has_kerning(&self) -> bool {
        self.has_kerning
    }

    fn kerning(&self, glyphs: &[u16]) -> Vec<i16> {
        let mut out = vec![0; glyphs.len()];
        if !self.has_kerning || glyphs.len() < 2 {
            return out;
        }
        // The face borrows `data`, so it is re-parsed once per kerning query.
        let Ok(face) = Face::parse(&self.data, self.index) else {
            return out;
        };
        let Some(kern) = face.tables().kern else {
            return out;
        };
        for (i, pair) in glyphs.windows(2).enumerate() {
            let (left, right) = (GlyphId(pair[0]), GlyphId(pair[1]));
            out[i] = kern
                .subtables
                .into_iter()
                .filter(|s| s.horizontal && !s.variable)
                .find_map(|s| s.glyphs_kerning(left, right))
                .unwrap_or(0);
        }
        out
    }
}
