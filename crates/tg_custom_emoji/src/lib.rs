// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The custom emoji catalog shared by the post editor and its host page.
//!
//! The catalog is fetched once by the page from the backend (`GET emoji`)
//! and handed to the editor as a plain list. The editor only reads it: to
//! build emoji nodes when the picker is used, and to resolve ids back to
//! media when stored content is loaded.

mod catalog;
mod emoji;

pub use catalog::{CatalogError, EmojiCatalog};
pub use emoji::{CustomEmoji, EmojiFormat};
