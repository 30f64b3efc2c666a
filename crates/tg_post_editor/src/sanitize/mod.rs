// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Reducing pasted and dropped payloads to plain text.

mod html_text;

use serde::{Deserialize, Serialize};

/// Runs of blank lines longer than this are cut down to it.
const MAX_BLANK_LINES: usize = 4;

/// What a clipboard or drag payload offers, as read from the browser's
/// `DataTransfer` (`text/html` and `text/plain`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransfer {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl DataTransfer {
    pub fn from_text(text: &str) -> Self {
        Self {
            html: None,
            text: Some(text.to_owned()),
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self {
            html: Some(html.to_owned()),
            text: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_owned());
        self
    }

    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, str::is_empty);
        blank(&self.html) && blank(&self.text)
    }
}

/// The normalized plain text of a payload, or `None` when nothing is left.
///
/// The html flavour wins when present: it is the one where media and
/// emoji can be told apart from text and dropped.
pub fn extract_plain_text(data: &DataTransfer) -> Option<String> {
    let raw = match (&data.html, &data.text) {
        (Some(html), _) if !html.trim().is_empty() => {
            html_text::visible_text(html)
        }
        (_, Some(text)) => text.clone(),
        _ => return None,
    };
    let text = normalize_pasted_text(&raw);
    (!text.is_empty()).then_some(text)
}

/// Clean up text before it goes into the document: one kind of newline and
/// of space, no invisible or private-use characters, and no runs of empty
/// lines.
pub fn normalize_pasted_text(text: &str) -> String {
    let unified = text
        .replace("\r\n", "\n")
        .replace(['\r', '\u{2028}', '\u{2029}'], "\n");
    let cleaned: String = unified
        .chars()
        .filter_map(|c| match c {
            '\u{A0}' | '\u{202F}' | '\u{2007}' => Some(' '),
            c if is_stripped_char(c) => None,
            c => Some(c),
        })
        .collect();

    let lines: Vec<&str> = cleaned
        .split('\n')
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect();
    let Some(first) = lines.iter().position(|l| !l.is_empty()) else {
        return String::new();
    };
    let last = lines.iter().rposition(|l| !l.is_empty()).unwrap_or(first);

    let mut kept = Vec::with_capacity(last + 1 - first);
    let mut blank_run = 0;
    for line in &lines[first..=last] {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > MAX_BLANK_LINES {
                continue;
            }
        } else {
            blank_run = 0;
        }
        kept.push(*line);
    }
    kept.join("\n")
}

/// Replacement characters, controls other than newline and tab, invisible
/// format characters and private-use characters.
///
/// The zero width joiner and variation selectors are kept: emoji sequences
/// are built from them.
fn is_stripped_char(c: char) -> bool {
    if c == '\n' || c == '\t' {
        return false;
    }
    c.is_control()
        || matches!(
            c,
            '\u{FFFD}'
                | '\u{00AD}'
                | '\u{061C}'
                | '\u{200B}'
                | '\u{200C}'
                | '\u{200E}'
                | '\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{2069}'
                | '\u{FEFF}'
                | '\u{E000}'..='\u{F8FF}'
                | '\u{F0000}'..='\u{FFFFD}'
                | '\u{100000}'..='\u{10FFFD}'
        )
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn html_is_preferred_over_text() {
        let data = DataTransfer::from_html("<b>from</b> html").with_text("from text");
        assert_eq!(extract_plain_text(&data).as_deref(), Some("from html"));
    }

    #[test]
    fn text_is_used_without_html() {
        let data = DataTransfer {
            html: Some("   ".into()),
            text: Some("plain".into()),
        };
        assert_eq!(extract_plain_text(&data).as_deref(), Some("plain"));
    }

    #[test]
    fn empty_payloads_give_nothing() {
        assert_that!(extract_plain_text(&DataTransfer::default())).is_none();
        assert_that!(extract_plain_text(&DataTransfer::from_text("\n \u{200B}\n")))
            .is_none();
        assert_that!(extract_plain_text(&DataTransfer::from_html(
            r#"<img src="x.png">"#
        )))
        .is_none();
        assert!(DataTransfer::from_text("").is_empty());
    }

    #[test]
    fn newlines_are_unified() {
        assert_eq!(normalize_pasted_text("a\r\nb\rc\u{2028}d\u{2029}e"), "a\nb\nc\nd\ne");
    }

    #[test]
    fn non_breaking_spaces_become_spaces() {
        assert_eq!(normalize_pasted_text("a\u{A0}b\u{202F}c\u{2007}d"), "a b c d");
    }

    #[test]
    fn invisible_characters_are_removed() {
        assert_eq!(
            normalize_pasted_text("a\u{200B}b\u{FEFF}c\u{FFFD}d\u{202E}e\u{7}f\u{E000}g\u{F0001}h"),
            "abcdefgh"
        );
    }

    #[test]
    fn emoji_sequences_survive() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let heart = "\u{2764}\u{FE0F}";
        assert_eq!(normalize_pasted_text(family), family);
        assert_eq!(normalize_pasted_text(heart), heart);
        assert_eq!(normalize_pasted_text("a\tb"), "a\tb");
    }

    #[test]
    fn blank_lines_are_trimmed_and_capped() {
        assert_eq!(normalize_pasted_text("\n\n  \na\n \t \nb\n\n"), "a\n\nb");
        assert_eq!(
            normalize_pasted_text("a\n\n\n\n\n\n\n\nb"),
            "a\n\n\n\n\nb"
        );
    }
}
