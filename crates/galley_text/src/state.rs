//! Layout context shared by every paragraph of a pass

use std::fmt;
use std::sync::Arc;

use galley_core::{WritingMode, Wrap};

use crate::align::{Justifier, NoJustify};
use crate::breaks::{BreakProvider, CharacterBreaks, WordBreaks};
use crate::config::LayoutConfig;
use crate::run::WhitespaceState;

/// Default limit on embedding/annotation nesting
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Writing mode, whitespace policy and pluggable services used by layout
#[derive(Clone)]
pub struct LayoutState {
    writing_mode: WritingMode,
    whitespace: WhitespaceState,
    wrap: Wrap,
    word_breaks: Arc<dyn BreakProvider>,
    character_breaks: Arc<dyn BreakProvider>,
    justifier: Arc<dyn Justifier>,
    max_depth: usize,
}

impl fmt::Debug for LayoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutState")
            .field("writing_mode", &self.writing_mode)
            .field("whitespace", &self.whitespace)
            .field("wrap", &self.wrap)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl LayoutState {
    pub fn new() -> Self {
        Self {
            writing_mode: WritingMode::default(),
            whitespace: WhitespaceState::DEFAULT,
            wrap: Wrap::default(),
            word_breaks: Arc::new(WordBreaks),
            character_breaks: Arc::new(CharacterBreaks),
            justifier: Arc::new(NoJustify),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new()
            .with_writing_mode(config.writing_mode)
            .with_whitespace(config.whitespace)
            .with_wrap(config.wrap)
            .with_max_depth(config.max_nesting_depth)
    }

    pub fn with_writing_mode(mut self, writing_mode: WritingMode) -> Self {
        self.writing_mode = writing_mode;
        self
    }

    pub fn with_whitespace(mut self, whitespace: impl Into<WhitespaceState>) -> Self {
        self.whitespace = whitespace.into();
        self
    }

    /// Wrap option for phrases that do not set one
    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_word_breaks(mut self, provider: Arc<dyn BreakProvider>) -> Self {
        self.word_breaks = provider;
        self
    }

    pub fn with_character_breaks(mut self, provider: Arc<dyn BreakProvider>) -> Self {
        self.character_breaks = provider;
        self
    }

    pub fn with_justifier(mut self, justifier: Arc<dyn Justifier>) -> Self {
        self.justifier = justifier;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn writing_mode(&self) -> WritingMode {
        self.writing_mode
    }

    pub fn whitespace(&self) -> &WhitespaceState {
        &self.whitespace
    }

    pub fn wrap(&self) -> Wrap {
        self.wrap
    }

    pub fn word_breaks(&self) -> &dyn BreakProvider {
        self.word_breaks.as_ref()
    }

    pub fn character_breaks(&self) -> &dyn BreakProvider {
        self.character_breaks.as_ref()
    }

    pub fn justifier(&self) -> &dyn Justifier {
        self.justifier.as_ref()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galley_core::Whitespace;

    #[test]
    fn test_from_config() {
        let config = LayoutConfig::from_toml_str(
            "writing_mode = \"rl-tb\"\nwhitespace = \"preserve\"\nmax_nesting_depth = 3",
        )
        .unwrap();
        let state = LayoutState::from_config(&config);
        assert_eq!(state.writing_mode(), WritingMode::RlTb);
        assert_eq!(*state.whitespace(), WhitespaceState::PRESERVE);
        assert_eq!(state.max_depth(), 3);
    }

    #[test]
    fn test_defaults() {
        let state = LayoutState::default();
        assert_eq!(*state.whitespace(), WhitespaceState::from(Whitespace::Default));
        assert_eq!(state.wrap(), Wrap::Wrap);
        assert_eq!(state.max_depth(), DEFAULT_MAX_DEPTH);
    }
}
