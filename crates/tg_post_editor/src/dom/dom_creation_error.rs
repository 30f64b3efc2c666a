// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::Dom;

/// The html was not well formed. The parser still recovered a document from
/// it, which is what callers that tolerate bad markup keep using.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("html parse errors: {}", parse_errors.join("; "))]
pub struct HtmlParseError {
    pub parse_errors: Vec<String>,
    pub recovered: Dom,
}

impl HtmlParseError {
    pub fn new(parse_errors: Vec<String>, recovered: Dom) -> Self {
        Self {
            parse_errors,
            recovered,
        }
    }

    pub fn into_recovered(self) -> Dom {
        self.recovered
    }
}
