// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::DomNode;
use crate::sanitize::extract_plain_text;
use crate::{DataTransfer, EditorModel, EditorUpdate, Location};

impl EditorModel {
    /// Paste a clipboard payload over the selection. Only its text is kept:
    /// markup, media and emoji are dropped, newlines become breaks.
    pub fn paste(&mut self, data: &DataTransfer) -> EditorUpdate {
        match extract_plain_text(data) {
            Some(text) => self.insert_plain_text(&text),
            None => {
                tracing::debug!("nothing to paste");
                EditorUpdate::keep()
            }
        }
    }

    /// Drop a dragged payload at `location`, or over the selection when the
    /// browser did not report a drop point.
    pub fn drop_at(
        &mut self,
        data: &DataTransfer,
        location: Option<Location>,
    ) -> EditorUpdate {
        let Some(text) = extract_plain_text(data) else {
            tracing::debug!("nothing to drop");
            return EditorUpdate::keep();
        };
        if let Some(location) = location {
            self.selection = Some((location, location));
        }
        self.insert_plain_text(&text)
    }

    /// Insert already normalized text over the selection, one break per
    /// newline, leaving the caret after it. The text joins the formatting
    /// at the caret, as typed text does.
    fn insert_plain_text(&mut self, text: &str) -> EditorUpdate {
        let (start, end) = self.selection_range();
        self.dom.delete_range(start, end);
        let mut caret = start;
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.dom.insert_nodes(caret, vec![DomNode::new_line_break()]);
                caret += 1;
            }
            self.dom.insert_text(caret, line);
            caret += line.encode_utf16().count();
        }
        self.after_edit(caret)
    }
}
