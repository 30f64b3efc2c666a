// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A caret position in the document.
///
/// Text counts in UTF-16 code units, a custom emoji counts as 2, an
/// explicit line break as 1 and every boundary between two blocks as 1.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Location(usize);

impl Location {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl From<usize> for Location {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl From<Location> for usize {
    fn from(value: Location) -> Self {
        value.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<usize> for Location {
    type Output = Self;

    fn add(self, rhs: usize) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<usize> for Location {
    fn add_assign(&mut self, rhs: usize) {
        self.0 += rhs;
    }
}

/// Saturates at zero: a caret never moves before the document start.
impl Sub<usize> for Location {
    type Output = Self;

    fn sub(self, rhs: usize) -> Self::Output {
        Self(self.0.saturating_sub(rhs))
    }
}

impl SubAssign<usize> for Location {
    fn sub_assign(&mut self, rhs: usize) {
        self.0 = self.0.saturating_sub(rhs);
    }
}

impl PartialEq<usize> for Location {
    fn eq(&self, other: &usize) -> bool {
        self.0 == *other
    }
}
