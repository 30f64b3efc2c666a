// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

/// The path from the document root to a node, as child indices.
///
/// Handles are only valid until the next structural edit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DomHandle {
    path: Vec<usize>,
}

impl DomHandle {
    pub fn root() -> Self {
        Self { path: Vec::new() }
    }

    pub fn from_raw(path: Vec<usize>) -> Self {
        Self { path }
    }

    pub fn raw(&self) -> &[usize] {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn child_handle(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self { path }
    }

    /// Panics on the root handle.
    pub fn parent_handle(&self) -> Self {
        assert!(!self.is_root(), "The root handle has no parent");
        Self {
            path: self.path[..self.path.len() - 1].to_vec(),
        }
    }

    /// Panics on the root handle.
    pub fn index_in_parent(&self) -> usize {
        *self.path.last().expect("The root handle has no parent")
    }

    /// Index of the top-level block this handle lives in.
    pub fn block_index(&self) -> Option<usize> {
        self.path.first().copied()
    }

    pub fn is_ancestor_of(&self, other: &DomHandle) -> bool {
        other.path.len() > self.path.len()
            && other.path[..self.path.len()] == self.path[..]
    }
}
