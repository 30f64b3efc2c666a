// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

/// How a line break is written into the serialized text.
///
/// Every entity offset after a line break depends on this, so the same
/// style must be used when a stored text is rehydrated.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum NewlineStyle {
    /// `\n`, for JSON request bodies.
    #[default]
    Lf,
    /// `\r\n`, for multipart form fields.
    CrLf,
}

impl NewlineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Width in UTF-16 code units.
    pub fn width(&self) -> usize {
        self.as_str().len()
    }
}

/// Whether text nodes made only of whitespace count towards the text.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum WhitespacePolicy {
    #[default]
    Preserve,
    SkipWhitespaceOnly,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase", default)]
pub struct SerializerConfig {
    pub newline: NewlineStyle,
    pub whitespace: WhitespacePolicy,
}

impl SerializerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_newline(mut self, newline: NewlineStyle) -> Self {
        self.newline = newline;
        self
    }

    pub fn with_whitespace(mut self, whitespace: WhitespacePolicy) -> Self {
        self.whitespace = whitespace;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid serializer config: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
