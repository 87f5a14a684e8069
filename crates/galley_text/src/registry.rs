//! Font cache
//!
//! Maps [`FontKey`]s to shared [`Font`]s, resolving family names to font
//! files with fontdb. Both hits and misses are cached; a key resolves to the
//! same `Arc<Font>` for the lifetime of the cache.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};
use galley_core::{Extent, Font, FontKey, FontStyle, FontWeight, OutlineLoader, TtfOutlineLoader};
use rustc_hash::FxHashMap;

use crate::config::FontsConfig;

/// Family, style and weight: what selects a face
type FaceKey = (String, FontStyle, FontWeight);

struct CacheInner {
    db: Database,
    /// Resolved faces (Some = found, None = not found)
    faces: FxHashMap<FaceKey, Option<(PathBuf, u32)>>,
    fonts: FxHashMap<FontKey, Option<Arc<Font>>>,
}

/// Registry of fonts shared by a layout pass
pub struct FontCache {
    inner: Mutex<CacheInner>,
    loader: Arc<dyn OutlineLoader>,
    default_family: String,
    default_size: f64,
}

impl FontCache {
    /// Empty cache that knows no font files
    pub fn new() -> Self {
        let defaults = FontsConfig::default();
        Self {
            inner: Mutex::new(CacheInner {
                db: Database::new(),
                faces: FxHashMap::default(),
                fonts: FxHashMap::default(),
            }),
            loader: Arc::new(TtfOutlineLoader),
            default_family: defaults.default_family,
            default_size: defaults.default_size,
        }
    }

    /// Cache over system fonts and the configured directories
    pub fn from_config(config: &FontsConfig) -> Self {
        let mut cache = Self::new();
        cache.default_family = config.default_family.clone();
        cache.default_size = config.default_size;
        {
            let mut inner = cache.lock();
            if config.load_system_fonts {
                inner.db.load_system_fonts();
            }
            for dir in &config.directories {
                inner.db.load_fonts_dir(dir);
            }
            tracing::debug!("Font database holds {} faces", inner.db.len());
        }
        cache
    }

    /// Use `loader` for fonts created from now on
    pub fn with_loader(mut self, loader: Arc<dyn OutlineLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn load_fonts_dir(&self, path: &Path) {
        let mut inner = self.lock();
        inner.db.load_fonts_dir(path);
        inner.faces.retain(|_, face| face.is_some());
        inner.fonts.retain(|_, font| font.is_some());
    }

    /// Map a family/style/weight to a file directly, bypassing discovery
    pub fn register(
        &self,
        family: impl Into<String>,
        style: FontStyle,
        weight: FontWeight,
        source: impl Into<PathBuf>,
    ) {
        let mut inner = self.lock();
        let family = family.into();
        inner
            .fonts
            .retain(|key, _| !(key.family == family && key.style == style && key.weight == weight));
        inner
            .faces
            .insert((family, style, weight), Some((source.into(), 0)));
    }

    /// Font for `key`, created on first request; `None` when no face
    /// matches
    pub fn get(&self, key: &FontKey) -> Option<Arc<Font>> {
        let mut inner = self.lock();
        if let Some(cached) = inner.fonts.get(key) {
            tracing::debug!("Font cache hit: {}", key);
            return cached.clone();
        }
        tracing::debug!("Font cache miss: {}", key);

        let face = resolve_face(&mut inner, key);
        let font = face.map(|(path, index)| {
            Arc::new(Font::with_loader(key.clone(), path, self.loader.clone()).with_face_index(index))
        });
        if font.is_none() {
            tracing::warn!("No font face matches {}", key);
        }
        inner.fonts.insert(key.clone(), font.clone());
        font
    }

    /// Font of the configured default family and size
    pub fn default_font(&self) -> Option<Arc<Font>> {
        self.get(&FontKey::new(
            self.default_family.clone(),
            Extent::uniform(self.default_size),
        ))
    }

    /// Number of cached keys, misses included
    pub fn len(&self) -> usize {
        self.lock().fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Each update is a single insert or retain, so a poisoned map is intact.
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Font cache lock was poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_face(inner: &mut CacheInner, key: &FontKey) -> Option<(PathBuf, u32)> {
    let face_key = (key.family.clone(), key.style, key.weight);
    if let Some(face) = inner.faces.get(&face_key) {
        return face.clone();
    }

    let family = match key.family.as_str() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        name => Family::Name(name),
    };
    let style = match key.style {
        FontStyle::Normal => Style::Normal,
        FontStyle::Italic => Style::Italic,
        FontStyle::Oblique => Style::Oblique,
    };
    let query = Query {
        families: &[family],
        weight: Weight(key.weight.to_numeric()),
        style,
        stretch: Stretch::Normal,
    };

    let face = inner
        .db
        .query(&query)
        .and_then(|id| inner.db.face_source(id))
        .and_then(|(source, index)| match source {
            Source::File(path) | Source::SharedFile(path, _) => Some((path, index)),
            Source::Binary(_) => {
                tracing::warn!("Font '{}' is only available in memory", key.family);
                None
            }
        });
    inner.faces.insert(face_key, face.clone());
    face
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(family: &str) -> FontKey {
        FontKey::new(family, Extent::uniform(20.0))
    }

    #[test]
    fn test_registered_font_shared() {
        let cache = FontCache::new();
        cache.register("Body", FontStyle::Normal, FontWeight::Normal, "/fonts/body.ttf");
        let a = cache.get(&key("Body")).unwrap();
        let b = cache.get(&key("Body")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.source(), Path::new("/fonts/body.ttf"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sizes_are_distinct_fonts() {
        let cache = FontCache::new();
        cache.register("Body", FontStyle::Normal, FontWeight::Normal, "/fonts/body.ttf");
        let small = cache.get(&key("Body")).unwrap();
        let large = cache
            .get(&FontKey::new("Body", Extent::uniform(40.0)))
            .unwrap();
        assert!(!Arc::ptr_eq(&small, &large));
        assert_eq!(small.source(), large.source());
    }

    #[test]
    fn test_miss_is_cached() {
        let cache = FontCache::new();
        assert!(cache.get(&key("No Such Family")).is_none());
        assert!(cache.get(&key("No Such Family")).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_register_replaces_miss() {
        let cache = FontCache::new();
        assert!(cache.get(&key("Late")).is_none());
        cache.register("Late", FontStyle::Normal, FontWeight::Normal, "/fonts/late.ttf");
        assert!(cache.get(&key("Late")).is_some());
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        let cache = FontCache::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.inner.lock();
            panic!("panic while holding the font cache");
        }));
        assert!(result.is_err());
        assert!(cache.inner.is_poisoned());

        cache.register("Body", FontStyle::Normal, FontWeight::Normal, "/fonts/body.ttf");
        assert!(cache.get(&key("Body")).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_default_font_uses_config() {
        let config = FontsConfig {
            load_system_fonts: false,
            default_family: "Body".to_string(),
            default_size: 12.0,
            ..FontsConfig::default()
        };
        let cache = FontCache::from_config(&config);
        cache.register("Body", FontStyle::Normal, FontWeight::Normal, "/fonts/body.ttf");
        let font = cache.default_font().unwrap();
        assert_eq!(font.size(), Extent::uniform(12.0));
    }
}
