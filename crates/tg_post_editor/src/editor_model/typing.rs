// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::{EditorModel, EditorUpdate, Location};

impl EditorModel {
    /// Replace the selection with typed text. Each newline in `text` starts
    /// a new block.
    pub fn replace_text(&mut self, text: &str) -> EditorUpdate {
        let (start, end) = self.selection_range();
        self.do_replace_text_in(text, start, end)
    }

    /// Replace `[start, end)` with typed text, as for an IME commit or a
    /// spell-checker replacement.
    pub fn replace_text_in(
        &mut self,
        text: &str,
        start: Location,
        end: Location,
    ) -> EditorUpdate {
        let len = self.dom.length();
        let (a, b) = (start.as_usize().min(len), end.as_usize().min(len));
        self.do_replace_text_in(text, a.min(b), a.max(b))
    }

    fn do_replace_text_in(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
    ) -> EditorUpdate {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if text.is_empty() && start == end {
            return EditorUpdate::keep();
        }
        self.dom.delete_range(start, end);
        let mut caret = start;
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                caret = self.dom.split_block(caret);
            }
            self.dom.insert_text(caret, line);
            caret += line.encode_utf16().count();
        }
        self.after_edit(caret)
    }

    /// Start a new block at the caret, as the Enter key does.
    pub fn enter(&mut self) -> EditorUpdate {
        let (start, end) = self.selection_range();
        self.dom.delete_range(start, end);
        let caret = self.dom.split_block(start);
        self.after_edit(caret)
    }

    /// Insert an explicit break at the caret, as Shift+Enter does.
    pub fn insert_line_break(&mut self) -> EditorUpdate {
        let (start, end) = self.selection_range();
        self.dom.delete_range(start, end);
        let caret = self.dom.insert_line_break(start);
        self.after_edit(caret)
    }

    /// Delete the selection, or what is just before the caret: a grapheme,
    /// a whole emoji, a break, or the boundary with the previous block.
    pub fn backspace(&mut self) -> EditorUpdate {
        let (start, end) = self.selection_range();
        if start != end {
            return self.do_delete(start, end);
        }
        match self.dom.width_before(start) {
            0 => EditorUpdate::keep(),
            width => self.do_delete(start - width, start),
        }
    }

    /// Delete the selection, or what is just after the caret.
    pub fn delete(&mut self) -> EditorUpdate {
        let (start, end) = self.selection_range();
        if start != end {
            return self.do_delete(start, end);
        }
        match self.dom.width_after(start) {
            0 => EditorUpdate::keep(),
            width => self.do_delete(start, start + width),
        }
    }

    pub fn delete_in(&mut self, start: Location, end: Location) -> EditorUpdate {
        let len = self.dom.length();
        let (a, b) = (start.as_usize().min(len), end.as_usize().min(len));
        if a == b {
            return EditorUpdate::keep();
        }
        self.do_delete(a.min(b), a.max(b))
    }

    fn do_delete(&mut self, start: usize, end: usize) -> EditorUpdate {
        self.dom.delete_range(start, end);
        self.after_edit(start)
    }
}
