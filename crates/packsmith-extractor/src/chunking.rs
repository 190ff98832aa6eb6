//! Windowing over the input text
//!
//! Offsets are character (Unicode scalar) offsets, so a window boundary can
//! never split a multi-byte character.

/// Immutable input text with a character offset index
#[derive(Debug, Clone)]
pub struct InputText<'a> {
    text: &'a str,
    /// Byte offset of every character, plus `text.len()` as the final entry
    boundaries: Vec<usize>,
}

impl<'a> InputText<'a> {
    /// Index a text
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Whether the text is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Characters `start..end`, clamped to the text
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }
}

/// One window of input sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window<'a> {
    /// Window content
    pub text: &'a str,
    /// Absolute start offset (characters)
    pub start_offset: usize,
    /// Absolute end offset, exclusive (characters)
    pub end_offset: usize,
}

/// Compute the window for the current position.
///
/// The window ends `window_size` characters after `position` and starts
/// `overlap` characters before it (no overlap at position 0).
pub fn window<'a>(input: &InputText<'a>, position: usize, window_size: usize, overlap: usize) -> Window<'a> {
    let length = input.len();
    let end_offset = position.saturating_add(window_size).min(length);
    let start_offset = position.saturating_sub(overlap).min(end_offset);

    Window {
        text: input.slice(start_offset, end_offset),
        start_offset,
        end_offset,
    }
}

/// Advisory number of windows for an input, used for progress display
pub fn estimated_chunks(length: usize, window_size: usize) -> usize {
    if window_size == 0 {
        return 0;
    }
    length.div_ceil(window_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_window_has_no_overlap() {
        let text = "a".repeat(10_000);
        let input = InputText::new(&text);
        let w = window(&input, 0, 6_000, 200);
        assert_eq!(w.start_offset, 0);
        assert_eq!(w.end_offset, 6_000);
        assert_eq!(w.text.len(), 6_000);
    }

    #[test]
    fn test_later_window_overlaps() {
        let text = "a".repeat(10_000);
        let input = InputText::new(&text);
        let w = window(&input, 6_000, 6_000, 200);
        assert_eq!(w.start_offset, 5_800);
        assert_eq!(w.end_offset, 10_000);
    }

    #[test]
    fn test_small_position_clamps_to_zero() {
        let input = InputText::new("abcdefghij");
        let w = window(&input, 3, 4, 200);
        assert_eq!(w.start_offset, 0);
        assert_eq!(w.end_offset, 7);
        assert_eq!(w.text, "abcdefg");
    }

    #[test]
    fn test_cjk_is_sliced_by_character() {
        let input = InputText::new("火球术造成三点伤害");
        assert_eq!(input.len(), 9);

        let w = window(&input, 3, 3, 1);
        assert_eq!(w.text, "术造成三");
        assert_eq!((w.start_offset, w.end_offset), (2, 6));
    }

    #[test]
    fn test_position_past_end() {
        let input = InputText::new("short");
        let w = window(&input, 50, 10, 2);
        assert_eq!(w.end_offset, 5);
        assert_eq!(w.start_offset, 5);
        assert_eq!(w.text, "");
    }

    #[test]
    fn test_empty_input() {
        let input = InputText::new("");
        assert!(input.is_empty());
        assert_eq!(window(&input, 0, 100, 10).text, "");
        assert_eq!(estimated_chunks(0, 6_000), 0);
    }

    #[test]
    fn test_estimated_chunks() {
        assert_eq!(estimated_chunks(500, 6_000), 1);
        assert_eq!(estimated_chunks(6_000, 6_000), 1);
        assert_eq!(estimated_chunks(6_001, 6_000), 2);
        assert_eq!(estimated_chunks(50_000, 6_000), 9);
    }

    proptest! {
        #[test]
        fn prop_window_bounds(
            text in "[a-z火球术 ]{0,300}",
            position in 0usize..400,
            window_size in 1usize..100,
            overlap in 0usize..50,
        ) {
            let input = InputText::new(&text);
            let w = window(&input, position, window_size, overlap);

            prop_assert!(w.start_offset <= w.end_offset);
            prop_assert!(w.end_offset <= input.len());
            prop_assert_eq!(w.end_offset, (position + window_size).min(input.len()));
            if position <= input.len() {
                prop_assert_eq!(w.start_offset, position.saturating_sub(overlap));
            }
            prop_assert_eq!(w.text.chars().count(), w.end_offset - w.start_offset);
        }
    }
}
