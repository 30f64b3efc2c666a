// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityError};

/// The editor's output contract: normalized html for re-editing, and the
/// text plus entities that are relayed to Telegram.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedResult {
    pub html: String,
    pub text: String,
    pub entities: Vec<Entity>,
}

impl SerializedResult {
    /// Length of `text` in UTF-16 code units, the unit entities use.
    pub fn text_length(&self) -> usize {
        self.text.encode_utf16().count()
    }

    pub fn validate(&self) -> Result<(), EntityError> {
        Entity::validate_all(&self.entities, self.text_length())
    }

    pub fn entities_json(&self) -> Result<String, EntityError> {
        Ok(serde_json::to_string(&self.entities)?)
    }

    /// The multipart fields sent with a post create/update request.
    pub fn to_form_fields(
        &self,
    ) -> Result<Vec<(&'static str, String)>, EntityError> {
        Ok(vec![
            ("text", self.text.clone()),
            ("html", self.html.clone()),
            ("entities", self.entities_json()?),
        ])
    }
}
