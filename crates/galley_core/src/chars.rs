//! Character classes used by segmentation, breaking and measurement

pub const SPACE: char = '\u{0020}';
pub const LINE_FEED: char = '\u{000A}';
pub const CARRIAGE_RETURN: char = '\u{000D}';
pub const TAB: char = '\u{0009}';
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';
pub const LINE_SEPARATOR: char = '\u{2028}';
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';
pub const IDEOGRAPHIC_SPACE: char = '\u{3000}';
/// Placeholder for an embedded object (inline block)
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';
pub const REPLACEMENT: char = '\u{FFFD}';
pub const HYPHEN_MINUS: char = '\u{002D}';
pub const SOFT_HYPHEN: char = '\u{00AD}';
pub const HYPHEN: char = '\u{2010}';

/// Whitespace that permits a line break. No-break spaces (U+00A0, U+2007,
/// U+202F) and the word joiner / BOM are excluded.
pub fn is_breaking_whitespace(c: char) -> bool {
    matches!(
        c,
        TAB | LINE_FEED
            | '\u{000B}'
            | '\u{000C}'
            | CARRIAGE_RETURN
            | SPACE
            | '\u{1680}'
            | '\u{2000}'..='\u{2006}'
            | '\u{2008}'..='\u{200A}'
            | ZERO_WIDTH_SPACE
            | LINE_SEPARATOR
            | PARAGRAPH_SEPARATOR
            | '\u{205F}'
            | IDEOGRAPHIC_SPACE
    )
}

/// Characters that never take up inline space
pub fn is_zero_width_whitespace(c: char) -> bool {
    matches!(
        c,
        ZERO_WIDTH_SPACE | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

/// Characters after which a hyphenation break may be taken
pub fn is_hyphen(c: char) -> bool {
    matches!(c, HYPHEN_MINUS | SOFT_HYPHEN | HYPHEN | '\u{2011}')
}

/// CJK ideographs, kana and hangul syllables: each character is its own
/// break opportunity.
pub fn is_ideograph(c: char) -> bool {
    matches!(
        c as u32,
        0x3040..=0x30FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0x20000..=0x2FFFF
    )
}

/// Map full-width ASCII variants (and the ideographic space) to their
/// half-width forms. Length is preserved character for character.
pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c as u32 {
            0xFF01..=0xFF5E => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            0x3000 => SPACE,
            _ => c,
        })
        .collect()
}

/// Map printable ASCII (and space) to full-width forms. Length is preserved
/// character for character.
pub fn to_full_width(text: &str) -> String {
    text.chars()
        .map(|c| match c as u32 {
            0x21..=0x7E => char::from_u32(c as u32 + 0xFEE0).unwrap_or(c),
            0x20 => IDEOGRAPHIC_SPACE,
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaking_whitespace() {
        assert!(is_breaking_whitespace(' '));
        assert!(is_breaking_whitespace('\n'));
        assert!(is_breaking_whitespace(LINE_SEPARATOR));
        assert!(!is_breaking_whitespace('\u{00A0}'));
        assert!(!is_breaking_whitespace('a'));
    }

    #[test]
    fn test_width_forms() {
        assert_eq!(to_full_width("AB 1"), "ＡＢ\u{3000}１");
        assert_eq!(to_half_width("ＡＢ\u{3000}１"), "AB 1");
        assert_eq!(to_half_width("漢字"), "漢字");
    }

    #[test]
    fn test_classes() {
        assert!(is_zero_width_whitespace(ZERO_WIDTH_SPACE));
        assert!(is_hyphen('-'));
        assert!(is_ideograph('漢'));
        assert!(!is_ideograph('a'));
    }
}
