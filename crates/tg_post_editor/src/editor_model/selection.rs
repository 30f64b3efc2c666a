// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::{EditorModel, EditorUpdate, Location};

impl EditorModel {
    /// Record the browser selection. `start` is the anchor and may come
    /// after `end`.
    pub fn select(&mut self, start: Location, end: Location) -> EditorUpdate {
        if self.selection == Some((start, end)) {
            return EditorUpdate::keep();
        }
        self.selection = Some((start, end));
        let (s, e) = self.safe_selection();
        EditorUpdate::select(s, e, self.active_formats())
    }

    /// The surface lost focus: the caret is no longer inside the editor.
    pub fn blur(&mut self) {
        self.selection = None;
    }

    /// The selection as the browser reported it, if the editor has focus.
    pub fn selection(&self) -> Option<(Location, Location)> {
        self.selection
    }

    /// The selection ordered and clamped to the document. Without focus
    /// this is a caret at the end.
    pub fn safe_selection(&self) -> (Location, Location) {
        let len = self.dom.length();
        match self.selection {
            Some((a, b)) => {
                let a = a.as_usize().min(len);
                let b = b.as_usize().min(len);
                (Location::from(a.min(b)), Location::from(a.max(b)))
            }
            None => (Location::from(len), Location::from(len)),
        }
    }

    pub fn has_selection(&self) -> bool {
        let (s, e) = self.safe_selection();
        s != e
    }

    pub fn select_all(&mut self) -> EditorUpdate {
        self.select(Location::from(0), Location::from(self.dom.length()))
    }

    /// [`Self::safe_selection`] as plain offsets.
    pub(crate) fn selection_range(&self) -> (usize, usize) {
        let (s, e) = self.safe_selection();
        (s.as_usize(), e.as_usize())
    }
}
