// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

pub mod dom_creation_error;
pub mod dom_handle;
pub mod dom_struct;
pub mod inline_ops;
pub mod nodes;
pub mod normalize;
pub mod parser;
pub mod registry;
pub mod to_html;
pub mod to_tree;
pub mod unicode;

pub use dom_creation_error::HtmlParseError;
pub use dom_handle::DomHandle;
pub use dom_struct::Dom;
pub use to_html::ToHtml;
pub use to_tree::ToTree;
