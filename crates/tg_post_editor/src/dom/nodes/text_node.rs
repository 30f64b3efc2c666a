// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::unicode::{byte_index, split_utf16, utf16_len};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextNode {
    data: String,
}

impl TextNode {
    pub fn from(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    /// Length in UTF-16 code units.
    pub fn length(&self) -> usize {
        utf16_len(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for text with no visible characters. Non-breaking spaces count
    /// as whitespace.
    pub fn is_blank(&self) -> bool {
        self.data.chars().all(char::is_whitespace)
    }

    pub fn push_str(&mut self, s: &str) {
        self.data.push_str(s);
    }

    pub fn insert_str(&mut self, offset: usize, s: &str) {
        let at = byte_index(&self.data, offset);
        self.data.insert_str(at, s);
    }

    /// Split at a UTF-16 offset. A character straddling the offset stays in
    /// the left half.
    pub fn split_at(&self, offset: usize) -> (TextNode, TextNode) {
        let (left, right) = split_utf16(&self.data, offset);
        (TextNode::from(left), TextNode::from(right))
    }
}
