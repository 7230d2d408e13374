//! A single buffer row and its derived render/highlight state.

use crate::highlight::spell::{Dictionary, spell_mask};
use crate::highlight::{Highlight, SyntaxProfile, highlight_line};

/// Width of a tab stop in rendered columns.
pub const TAB_STOP: usize = 8;

/// Expand tabs to spaces up to the next tab stop.
pub fn render(raw: &[u8]) -> Vec<u8> {
    let tabs = raw.iter().filter(|&&b| b == b'\t').count();
    let mut out = Vec::with_capacity(raw.len() + tabs * (TAB_STOP - 1));
    for &b in raw {
        if b == b'\t' {
            out.push(b' ');
            while out.len() % TAB_STOP != 0 {
                out.push(b' ');
            }
        } else {
            out.push(b);
        }
    }
    out
}

/// Rendered column of raw column `cx`.
pub fn cx_to_rx(raw: &[u8], cx: usize) -> usize {
    raw.iter().take(cx).fold(0, |rx, &b| {
        if b == b'\t' {
            rx + TAB_STOP - rx % TAB_STOP
        } else {
            rx + 1
        }
    })
}

/// Raw column containing rendered column `rx`. Columns past the end map to
/// the row length.
pub fn rx_to_cx(raw: &[u8], rx: usize) -> usize {
    let mut cur_rx = 0;
    for (cx, &b) in raw.iter().enumerate() {
        if b == b'\t' {
            cur_rx += TAB_STOP - cur_rx % TAB_STOP;
        } else {
            cur_rx += 1;
        }
        if cur_rx > rx {
            return cx;
        }
    }
    raw.len()
}

/// Everything a row needs to derive its render, highlight and spell state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowContext<'a> {
    pub profile: Option<&'a SyntaxProfile>,
    pub dictionary: Option<&'a dyn Dictionary>,
}

impl<'a> RowContext<'a> {
    /// The dictionary, but only when the profile asks for spellcheck.
    fn spellcheck(&self) -> Option<&'a dyn Dictionary> {
        self.profile
            .filter(|profile| profile.flags.spellcheck)
            .and(self.dictionary)
    }
}

/// One line of text plus its derived state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    idx: usize,
    raw: Vec<u8>,
    render: Vec<u8>,
    hl: Vec<Highlight>,
    open_comment: bool,
    spell: Option<Vec<bool>>,
}

impl Row {
    /// A row holding `raw` with no derived state yet.
    pub const fn new(idx: usize, raw: Vec<u8>) -> Self {
        Self {
            idx,
            raw,
            render: Vec::new(),
            hl: Vec::new(),
            open_comment: false,
            spell: None,
        }
    }

    pub const fn idx(&self) -> usize {
        self.idx
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn render(&self) -> &[u8] {
        &self.render
    }

    pub fn highlight(&self) -> &[Highlight] {
        &self.hl
    }

    /// Whether a block comment is still open at the end of this row.
    pub const fn open_comment(&self) -> bool {
        self.open_comment
    }

    /// Per rendered byte, whether it belongs to a misspelled word.
    pub fn spell_errors(&self) -> Option<&[bool]> {
        self.spell.as_deref()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn cx_to_rx(&self, cx: usize) -> usize {
        cx_to_rx(&self.raw, cx)
    }

    pub fn rx_to_cx(&self, rx: usize) -> usize {
        rx_to_cx(&self.raw, rx)
    }

    /// Regenerate the rendered bytes and spell mask from `raw`.
    pub fn update_render(&mut self, ctx: RowContext<'_>) {
        self.render = render(&self.raw);
        self.spell = ctx
            .spellcheck()
            .map(|dictionary| spell_mask(&self.render, dictionary));
    }

    /// Re-run the highlighter. Returns `true` when the exported
    /// block-comment state changed.
    pub fn update_highlight(&mut self, ctx: RowContext<'_>, entering_comment: bool) -> bool {
        let line = highlight_line(&self.render, ctx.profile, entering_comment);
        self.hl = line.classes;
        let changed = self.open_comment != line.open_comment;
        self.open_comment = line.open_comment;
        changed
    }

    /// Render and highlight in one go.
    pub fn update(&mut self, ctx: RowContext<'_>, entering_comment: bool) -> bool {
        self.update_render(ctx);
        self.update_highlight(ctx, entering_comment)
    }

    pub(crate) const fn set_idx(&mut self, idx: usize) {
        self.idx = idx;
    }

    pub(crate) const fn raw_mut(&mut self) -> &mut Vec<u8> {
        &mut self.raw
    }

    pub(crate) fn take_raw(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.raw)
    }

    /// Swap in highlight classes, returning the previous ones.
    pub(crate) fn replace_highlight(&mut self, hl: Vec<Highlight>) -> Vec<Highlight> {
        std::mem::replace(&mut self.hl, hl)
    }

    pub(crate) fn highlight_mut(&mut self) -> &mut [Highlight] {
        &mut self.hl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::PROFILES;
    use crate::highlight::spell::WordList;

    #[test]
    fn test_render_expands_tabs_to_next_stop() {
        assert_eq!(render(b"\tx"), b"        x".to_vec());
        assert_eq!(render(b"ab\tc"), b"ab      c".to_vec());
        assert_eq!(render(b"abcdefgh\ti"), b"abcdefgh        i".to_vec());
    }

    #[test]
    fn test_render_without_tabs_is_identity() {
        assert_eq!(render(b"plain text"), b"plain text".to_vec());
        assert!(render(b"").is_empty());
    }

    #[test]
    fn test_cx_to_rx_and_back() {
        let raw = b"a\tb\tc";
        assert_eq!(cx_to_rx(raw, 0), 0);
        assert_eq!(cx_to_rx(raw, 1), 1);
        assert_eq!(cx_to_rx(raw, 2), 8);
        assert_eq!(cx_to_rx(raw, 4), 16);
        assert_eq!(rx_to_cx(raw, 8), 2);
        assert_eq!(rx_to_cx(raw, 5), 1);
        assert_eq!(rx_to_cx(raw, 16), 4);
        assert_eq!(rx_to_cx(raw, 100), raw.len());
    }

    #[test]
    fn test_update_keeps_lengths_in_step() {
        let profile = PROFILES[0];
        let ctx = RowContext {
            profile: Some(&profile),
            dictionary: None,
        };
        let mut row = Row::new(0, b"\tint x = 1;".to_vec());
        row.update(ctx, false);
        assert_eq!(row.render().len(), 18);
        assert_eq!(row.highlight().len(), row.render().len());
        assert!(row.spell_errors().is_none());
    }

    #[test]
    fn test_spell_mask_only_with_spellcheck_profile() {
        let words = WordList::from_words(["hello"]);
        let txt = PROFILES[1];
        let c = PROFILES[0];

        let mut row = Row::new(0, b"hello wrld".to_vec());
        row.update_render(RowContext {
            profile: Some(&txt),
            dictionary: Some(&words),
        });
        let mask = row.spell_errors().unwrap();
        assert_eq!(mask.len(), row.render().len());
        assert!(!mask[0]);
        assert!(mask[6]);

        row.update_render(RowContext {
            profile: Some(&c),
            dictionary: Some(&words),
        });
        assert!(row.spell_errors().is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rendered_length_accounts_for_every_tab(
                raw in proptest::collection::vec(prop_oneof![Just(b'\t'), 32u8..127], 0..200)
            ) {
                let mut col = 0;
                let mut expected = 0;
                for &b in &raw {
                    let width = if b == b'\t' { TAB_STOP - col % TAB_STOP } else { 1 };
                    col += width;
                    expected += width;
                }
                let rendered = render(&raw);
                prop_assert_eq!(rendered.len(), expected);
                prop_assert!(rendered.len() >= raw.len());
                prop_assert_eq!(cx_to_rx(&raw, raw.len()), rendered.len());
            }

            #[test]
            fn rx_to_cx_inverts_cx_to_rx(
                raw in proptest::collection::vec(prop_oneof![Just(b'\t'), 32u8..127], 0..100)
            ) {
                for cx in 0..=raw.len() {
                    prop_assert_eq!(rx_to_cx(&raw, cx_to_rx(&raw, cx)), cx);
                }
            }
        }
    }
}
