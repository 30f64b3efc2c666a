// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! UTF-16 helpers. Text is stored as `String` but measured and addressed in
//! UTF-16 code units, which is what Telegram counts and what browser
//! selections report.

use unicode_segmentation::UnicodeSegmentation;

pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index of the character boundary at `offset` UTF-16 code units.
///
/// An offset landing inside a surrogate pair rounds up, so the whole
/// character stays on the left. Offsets past the end give `s.len()`.
pub fn byte_index(s: &str, offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in s.char_indices() {
        if units >= offset {
            return i;
        }
        units += c.len_utf16();
    }
    s.len()
}

/// Split at a UTF-16 offset, rounding as [`byte_index`] does.
pub fn split_utf16(s: &str, offset: usize) -> (&str, &str) {
    s.split_at(byte_index(s, offset))
}

/// UTF-16 width of the last grapheme cluster in `s`.
pub fn last_grapheme_width(s: &str) -> usize {
    s.graphemes(true).next_back().map(utf16_len).unwrap_or(0)
}

/// UTF-16 width of the first grapheme cluster in `s`.
pub fn first_grapheme_width(s: &str) -> usize {
    s.graphemes(true).next().map(utf16_len).unwrap_or(0)
}
