//! Font identity and metrics
//!
//! A [`Font`] is cheap to construct: it only records its [`FontKey`] and the
//! resource path. The outline is loaded the first time a metric is queried.
//! A resource that cannot be loaded puts the font in a permanent degraded
//! state where every metric is zero.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::chars::{is_zero_width_whitespace, REPLACEMENT};
use crate::geometry::{Axis, Extent, TransformMatrix};
use crate::outline::{FontOutline, OutlineLoader, TtfOutlineLoader};

/// Line height used when no explicit line height applies, as a multiple of
/// the font size along its axis
pub const DEFAULT_LINE_HEIGHT_FACTOR: f64 = 1.25;

// ─────────────────────────────────────────────────────────────────────────────
// Font Key
// ─────────────────────────────────────────────────────────────────────────────

/// Font style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Font weight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Numeric weight on the 100-900 scale
    pub fn to_numeric(self) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        }
    }
}

/// Argument of the `kern` feature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontKerning {
    Normal,
    None,
}

/// Typed feature argument
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureArgument {
    Number(f64),
    Kerning(FontKerning),
    Text(String),
}

impl Eq for FeatureArgument {}

impl Hash for FeatureArgument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FeatureArgument::Number(n) => n.to_bits().hash(state),
            FeatureArgument::Kerning(k) => k.hash(state),
            FeatureArgument::Text(t) => t.hash(state),
        }
    }
}

/// OpenType-style font feature: a four-letter tag plus arguments
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontFeature {
    pub tag: String,
    pub arguments: Vec<FeatureArgument>,
}

impl FontFeature {
    pub const KERNING: &'static str = "kern";
    pub const OBLIQUE: &'static str = "oblq";
    pub const HALF_WIDTH: &'static str = "hwid";
    pub const FULL_WIDTH: &'static str = "fwid";

    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: FeatureArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn kerning(kerning: FontKerning) -> Self {
        Self::new(Self::KERNING).with_argument(FeatureArgument::Kerning(kerning))
    }

    /// Oblique shear, 1.0 corresponding to 90 degrees
    pub fn oblique(shear: f64) -> Self {
        Self::new(Self::OBLIQUE).with_argument(FeatureArgument::Number(shear))
    }

    pub fn half_width() -> Self {
        Self::new(Self::HALF_WIDTH)
    }

    pub fn full_width() -> Self {
        Self::new(Self::FULL_WIDTH)
    }

    pub fn argument(&self, index: usize) -> Option<&FeatureArgument> {
        self.arguments.get(index)
    }
}

/// Immutable font identity. Keys with equal fields denote interchangeable
/// fonts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FontKey {
    pub family: String,
    pub style: FontStyle,
    pub weight: FontWeight,
    /// Size along each physical axis
    pub size: Extent,
    /// Axis along which text progresses with this font
    pub axis: Axis,
    features: Vec<FontFeature>,
}

impl FontKey {
    pub fn new(family: impl Into<String>, size: Extent) -> Self {
        Self {
            family: family.into(),
            style: FontStyle::Normal,
            weight: FontWeight::Normal,
            size,
            axis: Axis::Horizontal,
            features: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Add a feature, replacing any feature with the same tag. Features are
    /// kept sorted by tag so that equal sets compare equal.
    pub fn with_feature(mut self, feature: FontFeature) -> Self {
        match self.features.binary_search_by(|f| f.tag.cmp(&feature.tag)) {
            Ok(i) => self.features[i] = feature,
            Err(i) => self.features.insert(i, feature),
        }
        self
    }

    pub fn features(&self) -> &[FontFeature] {
        &self.features
    }

    pub fn feature(&self, tag: &str) -> Option<&FontFeature> {
        self.features.iter().find(|f| f.tag == tag)
    }

    pub fn has_feature(&self, tag: &str) -> bool {
        self.feature(tag).is_some()
    }
}

impl Eq for FontKey {}

impl Hash for FontKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family.hash(state);
        self.style.hash(state);
        self.weight.hash(state);
        self.size.width.to_bits().hash(state);
        self.size.height.to_bits().hash(state);
        self.axis.hash(state);
        self.features.hash(state);
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?} {}x{}",
            self.family, self.style, self.weight, self.size.width, self.size.height
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Font
// ─────────────────────────────────────────────────────────────────────────────

/// Observable outline lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Unloaded,
    Loaded,
    Failed,
}

enum OutlineState {
    Loaded(Arc<dyn FontOutline>),
    Failed,
}

/// Font metrics for one [`FontKey`], backed by a lazily loaded outline
pub struct Font {
    key: FontKey,
    source: PathBuf,
    /// Face within a font collection
    face_index: u32,
    loader: Arc<dyn OutlineLoader>,
    outline: OnceLock<OutlineState>,
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("key", &self.key)
            .field("source", &self.source)
            .field("status", &self.load_status())
            .finish()
    }
}

impl Font {
    /// Font backed by a TrueType/OpenType file
    pub fn new(key: FontKey, source: impl Into<PathBuf>) -> Self {
        Self::with_loader(key, source, Arc::new(TtfOutlineLoader))
    }

    pub fn with_loader(
        key: FontKey,
        source: impl Into<PathBuf>,
        loader: Arc<dyn OutlineLoader>,
    ) -> Self {
        Self {
            key,
            source: source.into(),
            face_index: 0,
            loader,
            outline: OnceLock::new(),
        }
    }

    pub fn with_face_index(mut self, face_index: u32) -> Self {
        self.face_index = face_index;
        self
    }

    pub fn key(&self) -> &FontKey {
        &self.key
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn family(&self) -> &str {
        &self.key.family
    }

    pub fn style(&self) -> FontStyle {
        self.key.style
    }

    pub fn weight(&self) -> FontWeight {
        self.key.weight
    }

    pub fn axis(&self) -> Axis {
        self.key.axis
    }

    pub fn size(&self) -> Extent {
        self.key.size
    }

    pub fn features(&self) -> &[FontFeature] {
        self.key.features()
    }

    /// Size along the font's writing axis
    pub fn size_on_axis(&self) -> f64 {
        self.key.size.dimension(self.key.axis)
    }

    pub fn load_status(&self) -> LoadStatus {
        match self.outline.get() {
            None => LoadStatus::Unloaded,
            Some(OutlineState::Loaded(_)) => LoadStatus::Loaded,
            Some(OutlineState::Failed) => LoadStatus::Failed,
        }
    }

    fn outline(&self) -> Option<&Arc<dyn FontOutline>> {
        match self.outline.get_or_init(|| self.load()) {
            OutlineState::Loaded(outline) => Some(outline),
            OutlineState::Failed => None,
        }
    }

    fn load(&self) -> OutlineState {
        let loaded = self
            .loader
            .load(&self.source, self.face_index, self.is_kerning_enabled());
        match loaded {
            Ok(outline) => {
                tracing::info!("Loaded font '{}' from {}", self.key, self.source.display());
                OutlineState::Loaded(outline)
            }
            Err(e) => {
                tracing::warn!(
                    "Font '{}' unavailable, using zero metrics: {}",
                    self.key,
                    e
                );
                OutlineState::Failed
            }
        }
    }

    /// Typographic family name, then family name, then the key's family;
    /// "unknown" when the outline failed to load
    pub fn preferred_family_name(&self) -> String {
        match self.outline() {
            Some(outline) => outline
                .preferred_family_name()
                .or_else(|| outline.family_name())
                .unwrap_or_else(|| self.key.family.clone()),
            None => "unknown".to_string(),
        }
    }

    pub fn is_kerning_enabled(&self) -> bool {
        match self.key.feature(FontFeature::KERNING) {
            Some(feature) => !matches!(
                feature.argument(0),
                Some(FeatureArgument::Kerning(FontKerning::None))
            ),
            None => true,
        }
    }

    /// Shear factor from the `oblq` feature, 0 when absent
    pub fn shear(&self) -> f64 {
        match self
            .key
            .feature(FontFeature::OBLIQUE)
            .and_then(|f| f.argument(0))
        {
            Some(FeatureArgument::Number(shear)) => *shear,
            _ => 0.0,
        }
    }

    pub fn is_sheared(&self) -> bool {
        self.shear() != 0.0
    }

    /// Whether horizontal and vertical sizes differ
    pub fn is_anamorphic(&self) -> bool {
        self.key.size.width != self.key.size.height
    }

    fn scale_font_units(&self, outline: &dyn FontOutline, value: f64) -> f64 {
        let upem = outline.units_per_em();
        if upem == 0 {
            return 0.0;
        }
        value / f64::from(upem) * self.size_on_axis()
    }

    pub fn ascent(&self) -> f64 {
        self.outline()
            .map(|o| self.scale_font_units(o.as_ref(), f64::from(o.ascender())))
            .unwrap_or(0.0)
    }

    /// Typographic descender, scaled; negative below the baseline
    pub fn descent(&self) -> f64 {
        self.outline()
            .map(|o| self.scale_font_units(o.as_ref(), f64::from(o.descender())))
            .unwrap_or(0.0)
    }

    pub fn leading(&self) -> f64 {
        self.outline()
            .map(|o| self.scale_font_units(o.as_ref(), f64::from(o.line_gap())))
            .unwrap_or(0.0)
    }

    pub fn default_line_height(&self) -> f64 {
        self.size_on_axis() * DEFAULT_LINE_HEIGHT_FACTOR
    }

    /// Advance of `text` along the font axis, kerning included when enabled
    pub fn advance(&self, text: &str) -> f64 {
        self.advance_chars(text.chars())
    }

    /// Advance of UTF-16 text. Surrogate pairs form one character; unpaired
    /// surrogates measure as U+FFFD.
    pub fn advance_utf16(&self, units: &[u16]) -> f64 {
        self.advance_utf16_with_substitution(units, REPLACEMENT)
    }

    pub fn advance_utf16_with_substitution(&self, units: &[u16], substitution: char) -> f64 {
        self.advance_chars(
            char::decode_utf16(units.iter().copied()).map(|r| r.unwrap_or(substitution)),
        )
    }

    fn advance_chars(&self, chars: impl Iterator<Item = char>) -> f64 {
        if self.key.size.is_empty() {
            return 0.0;
        }
        let Some(outline) = self.outline() else {
            return 0.0;
        };
        let chars: Vec<char> = chars.collect();
        let glyphs: Vec<u16> = chars.iter().map(|&c| outline.glyph_id(c)).collect();
        let units: f64 = chars
            .iter()
            .zip(&glyphs)
            .filter(|(c, _)| !is_zero_width_whitespace(**c))
            .map(|(_, &g)| f64::from(outline.advance_width(g)))
            .sum();
        let mut advance = self.scale_font_units(outline.as_ref(), units);
        if let Some(kerning) = self.glyph_kerning(outline.as_ref(), &glyphs) {
            advance += kerning.iter().sum::<f64>();
        }
        advance
    }

    /// Per-character kerning adjustments, entry `i` applying between
    /// characters `i` and `i + 1`. `None` when kerning is disabled,
    /// unavailable or all zero.
    pub fn kerning(&self, text: &str) -> Option<Vec<f64>> {
        let outline = self.outline()?;
        let glyphs: Vec<u16> = text.chars().map(|c| outline.glyph_id(c)).collect();
        self.glyph_kerning(outline.as_ref(), &glyphs)
    }

    /// Sum of the kerning adjustments over `text`
    pub fn kerning_advance(&self, text: &str) -> f64 {
        self.kerning(text)
            .map(|k| k.iter().sum())
            .unwrap_or(0.0)
    }

    fn glyph_kerning(&self, outline: &dyn FontOutline, glyphs: &[u16]) -> Option<Vec<f64>> {
        if !self.is_kerning_enabled() || !outline.has_kerning() {
            return None;
        }
        let raw = outline.kerning(glyphs);
        if raw.iter().all(|&k| k == 0) {
            return None;
        }
        Some(
            raw.into_iter()
                .map(|k| self.scale_font_units(outline, f64::from(k)))
                .collect(),
        )
    }

    /// Glyph transform combining shear and anamorphic scaling; `None` when
    /// it would be the identity or the outline is unavailable
    pub fn transform(&self) -> Option<TransformMatrix> {
        self.outline()?;
        let mut transform = TransformMatrix::IDENTITY;
        if self.is_sheared() {
            let shx = -(self.shear() * 90.0).to_radians().tan();
            transform = transform.then(&TransformMatrix::shear(shx, 0.0));
        }
        if self.is_anamorphic() && self.key.size.height > 0.0 {
            let sx = self.key.size.width / self.key.size.height;
            transform = transform.then(&TransformMatrix::scale(sx, 1.0));
        }
        (!transform.is_identity()).then_some(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::FontError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 1000 upem, 500 units per glyph, 'A' 'V' kern by -100
    struct TestOutline {
        lookups: Arc<AtomicUsize>,
    }

    impl FontOutline for TestOutline {
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
            Some("Test Sans".to_string())
        }
        fn glyph_id(&self, c: char) -> u16 {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            (c as u32 % 1000) as u16
        }
        fn advance_width(&self, _glyph: u16) -> u16 {
            500
        }
        fn has_kerning(&self) -> bool {
            true
        }
        fn kerning(&self, glyphs: &[u16]) -> Vec<i16> {
            let mut out = vec![0; glyphs.len()];
            for (i, pair) in glyphs.windows(2).enumerate() {
                if pair == [u16::from(b'A'), u16::from(b'V')] {
                    out[i] = -100;
                }
            }
            out
        }
    }

    struct TestLoader {
        lookups: Arc<AtomicUsize>,
        loads: AtomicUsize,
    }

    impl OutlineLoader for TestLoader {
        fn load(
            &self,
            _source: &Path,
            _index: u32,
            _kerning: bool,
        ) -> Result<Arc<dyn FontOutline>, FontError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TestOutline {
                lookups: self.lookups.clone(),
            }))
        }
    }

    fn test_font(key: FontKey) -> (Font, Arc<TestLoader>) {
        let loader = Arc::new(TestLoader {
            lookups: Arc::new(AtomicUsize::new(0)),
            loads: AtomicUsize::new(0),
        });
        let font = Font::with_loader(key, "test.ttf", loader.clone());
        (font, loader)
    }

    fn key() -> FontKey {
        FontKey::new("Test Sans", Extent::uniform(20.0))
    }

    #[test]
    fn test_lazy_single_load() {
        let (font, loader) = test_font(key());
        assert_eq!(font.load_status(), LoadStatus::Unloaded);
        assert_eq!(font.advance("ab"), 20.0);
        assert_eq!(font.advance("cd"), 20.0);
        assert_eq!(font.load_status(), LoadStatus::Loaded);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_vertical_metrics() {
        let (font, _) = test_font(key());
        assert_eq!(font.ascent(), 16.0);
        assert_eq!(font.descent(), -4.0);
        assert_eq!(font.leading(), 2.0);
        assert_eq!(font.default_line_height(), 25.0);
        assert_eq!(font.preferred_family_name(), "Test Sans");
    }

    #[test]
    fn test_kerning_applied() {
        let (font, _) = test_font(key());
        assert_eq!(font.kerning("AV"), Some(vec![-2.0, 0.0]));
        assert_eq!(font.advance("AV"), 18.0);
        assert_eq!(font.kerning("ab"), None);
    }

    #[test]
    fn test_kerning_disabled() {
        let (font, _) = test_font(key().with_feature(FontFeature::kerning(FontKerning::None)));
        assert!(!font.is_kerning_enabled());
        assert_eq!(font.kerning("AV"), None);
        assert_eq!(font.advance("AV"), 20.0);
    }

    #[test]
    fn test_zero_width_and_empty_size() {
        let (font, _) = test_font(key());
        assert_eq!(font.advance("a\u{200B}b"), 20.0);

        let (empty, _) = test_font(FontKey::new("Test Sans", Extent::EMPTY));
        assert_eq!(empty.advance("ab"), 0.0);
    }

    #[test]
    fn test_surrogate_pair_single_lookup() {
        let (font, loader) = test_font(key());
        let units: Vec<u16> = "\u{1F600}".encode_utf16().collect();
        assert_eq!(units.len(), 2);
        assert_eq!(font.advance_utf16(&units), 10.0);
        assert_eq!(loader.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unpaired_surrogate_substituted() {
        let (font, _) = test_font(key());
        assert_eq!(font.advance_utf16(&[0xD800, u16::from(b'a')]), 20.0);
    }

    #[test]
    fn test_missing_resource_degrades() {
        let font = Font::new(key(), "/nonexistent/galley/missing.ttf");
        assert_eq!(font.advance("AB"), 0.0);
        assert_eq!(font.ascent(), 0.0);
        assert_eq!(font.transform(), None);
        assert_eq!(font.load_status(), LoadStatus::Failed);
        assert_eq!(font.preferred_family_name(), "unknown");
    }

    #[test]
    fn test_transform() {
        let (plain, _) = test_font(key());
        assert_eq!(plain.transform(), None);

        let (oblique, _) = test_font(key().with_feature(FontFeature::oblique(0.5)));
        let t = oblique.transform().unwrap();
        assert!((t.elements[2] + 1.0).abs() < 1e-9);

        let (wide, _) = test_font(FontKey::new("Test Sans", Extent::new(40.0, 20.0)));
        assert!(wide.is_anamorphic());
        assert_eq!(wide.transform().unwrap().elements[0], 2.0);
    }

    #[test]
    fn test_key_features_sorted_and_replaced() {
        let a = key()
            .with_feature(FontFeature::oblique(0.1))
            .with_feature(FontFeature::kerning(FontKerning::None));
        let b = key()
            .with_feature(FontFeature::kerning(FontKerning::Normal))
            .with_feature(FontFeature::kerning(FontKerning::None))
            .with_feature(FontFeature::oblique(0.1));
        assert_eq!(a, b);
        assert_eq!(a.features().len(), 2);
        assert_eq!(a.features()[0].tag, "kern");
    }
}
