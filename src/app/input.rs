//! Platform-independent key input.

/// A key press as the showcase sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A key that produced text, e.g. `"1"`.
    Character(String),
    Other,
}

impl Key {
    #[must_use]
    pub fn character(text: impl Into<String>) -> Self {
        Key::Character(text.into())
    }
}

/// Highest digit key bound to an animation.
pub const MAX_SHORTCUT_DIGIT: usize = 5;

/// Maps digit keys `1..=5` onto a zero-based animation index.
///
/// Keys beyond the list length, `0`, and anything that is not a single
/// digit map to `None`.
#[must_use]
pub fn animation_index_for_key(key: &Key, animation_count: usize) -> Option<usize> {
    let Key::Character(text) = key else {
        return None;
    };
    let mut chars = text.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let digit = c.to_digit(10)? as usize;
    if (1..=MAX_SHORTCUT_DIGIT).contains(&digit) && digit <= animation_count {
        Some(digit - 1)
    } else {
        None
    }
}
