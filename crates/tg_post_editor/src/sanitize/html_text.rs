// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::parser::{PaDom, PaDomCreator, PaDomNode, PaNodeContainer};
use crate::dom::registry::{is_line_boundary, is_stripped_on_paste};

/// The text a browser would show for `html`, one line per rendered line.
///
/// Media, emoji, scripts and custom elements are dropped with everything
/// inside them.
pub(super) fn visible_text(html: &str) -> String {
    let padom = match PaDomCreator::parse(html) {
        Ok(padom) => padom,
        Err(err) => {
            tracing::debug!(
                errors = err.parse_errors.len(),
                "reading text from malformed pasted html"
            );
            err.dom
        }
    };
    let mut reader = TextReader::default();
    if let PaDomNode::Document(document) = padom.get_document() {
        reader.read_children(&padom, document);
    }
    reader.finish()
}

#[derive(Default)]
struct TextReader {
    lines: Vec<String>,
    current: String,
    preformatted: usize,
}

impl TextReader {
    fn read_children(&mut self, padom: &PaDom, container: &PaNodeContainer) {
        for handle in &container.children {
            match padom.get_node(handle) {
                PaDomNode::Text(text) => self.push_text(&text.content),
                PaDomNode::Container(element)
                | PaDomNode::Document(element) => {
                    self.read_element(padom, element)
                }
                PaDomNode::Comment(_) => {}
            }
        }
    }

    fn read_element(&mut self, padom: &PaDom, element: &PaNodeContainer) {
        let tag = element.tag().to_ascii_lowercase();
        if is_stripped_on_paste(&tag) {
            return;
        }
        if tag == "br" {
            self.break_line();
            return;
        }
        if matches!(tag.as_str(), "td" | "th") {
            self.push_text(" ");
        }
        let boundary = is_line_boundary(&tag);
        let preformatted = tag == "pre";
        if boundary {
            self.end_line();
        }
        if preformatted {
            self.preformatted += 1;
        }
        self.read_children(padom, element);
        if preformatted {
            self.preformatted -= 1;
        }
        if boundary {
            self.end_line();
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.preformatted > 0 {
            let text = text.replace('\r', "");
            let mut parts = text.split('\n');
            if let Some(first) = parts.next() {
                self.current.push_str(first);
            }
            for part in parts {
                self.break_line();
                self.current.push_str(part);
            }
            return;
        }
        for c in text.chars() {
            if c.is_ascii_whitespace() {
                if !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            } else {
                self.current.push(c);
            }
        }
    }

    /// An explicit break: the current line ends, even if empty.
    fn break_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
    }

    /// A block edge: the current line ends if it has anything on it.
    fn end_line(&mut self) {
        if self.current.trim().is_empty() {
            self.current.clear();
        } else {
            self.break_line();
        }
    }

    fn finish(mut self) -> String {
        self.end_line();
        self.lines
            .iter()
            .map(|line| line.trim_matches([' ', '\t']))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
