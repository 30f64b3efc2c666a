// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! HTML parsing: html5ever builds a [PaDom] through [PaDomCreator], which
//! `parse` then converts into a [crate::Dom].

mod padom;
mod padom_creation_error;
mod padom_creator;
mod padom_handle;
mod padom_node;
mod panode_container;
mod panode_text;
mod parse;

use html5ever::{LocalName, Namespace, QualName};

pub(crate) use padom::PaDom;
pub(crate) use padom_creation_error::PaDomCreationError;
pub(crate) use padom_creator::PaDomCreator;
pub(crate) use padom_handle::PaDomHandle;
pub(crate) use padom_node::PaDomNode;
pub(crate) use panode_container::PaNodeContainer;
pub(crate) use panode_text::PaNodeText;
pub use parse::{parse, parse_lenient};

pub(crate) fn paqual_name(local_name: &str) -> QualName {
    QualName::new(
        None,
        Namespace::from("http://www.w3.org/1999/xhtml"),
        LocalName::from(local_name),
    )
}
