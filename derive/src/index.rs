// Modern, minimalistic & standard-compliant cold wallet library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2020-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2020-2024 LNP/BP Standards Association. All rights reserved.
// Copyright (C) 2020-2024 Dr Maxim Orlovsky. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::num::ParseIntError;
use std::str::FromStr;

/// Constant determining BIP32 boundary for u32 values after which index
/// is treated as hardened
pub const HARDENED_INDEX_BOUNDARY: u32 = 1 << 31;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("provided {what} {invalid} is invalid: it lies outside allowed range {start}..{end}")]
pub struct IndexError {
    pub what: &'static str,
    pub invalid: u32,
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum IndexParseError {
    #[from]
    #[display(inner)]
    Invalid(IndexError),

    #[from]
    /// invalid index string representation - {0}
    Parse(ParseIntError),

    /// hardened index {0} can't be used for public derivation
    HardenedForbidden(String),
}

/// Trait defining basic index functionality without mathematics operations.
pub trait IdxBase: Sized + Eq + Ord + Copy {
    /// Detects whether path segment uses hardened index(es)
    fn is_hardened(&self) -> bool;

    /// Returns child number corresponding to this index.
    ///
    /// Child number is always a value in range of `0..`[`HARDENED_INDEX_BOUNDARY`]
    fn child_number(&self) -> u32;

    /// Returns value used during derivation, which for normal indexes must lie
    /// in range `0..`[`HARDENED_INDEX_BOUNDARY`]
    fn index(&self) -> u32;
}

/// Trait defining common API for indexes usable in public derivation.
pub trait Idx: IdxBase {
    /// Index equal to zero.
    const ZERO: Self;

    /// Index equal to one.
    const ONE: Self;

    /// Index equal to maximum value.
    const MAX: Self;

    /// Constructs index from a given child number.
    ///
    /// Child number is always a value in range of `0..`[`HARDENED_INDEX_BOUNDARY`]
    fn try_from_child_number(index: impl Into<u32>) -> Result<Self, IndexError>;

    /// Constructs derivation path segment with specific derivation value, which
    /// for normal indexes must lie in range `0..`[`HARDENED_INDEX_BOUNDARY`]
    fn try_from_index(value: u32) -> Result<Self, IndexError>;

    fn to_be_bytes(&self) -> [u8; 4] { self.index().to_be_bytes() }

    /// Increments the index on one step; fails if the index value is already
    /// maximum value.
    #[must_use]
    fn checked_inc(&self) -> Option<Self> { self.checked_add(1u8) }

    /// Adds value the index; fails if the index value overflow happens.
    #[must_use]
    fn checked_add(&self, add: impl Into<u32>) -> Option<Self> {
        let mut res = *self;
        res.checked_add_assign(add)?;
        Some(res)
    }

    /// Mutates the self by adding value the index; fails if the index value
    /// overflow happens.
    fn checked_add_assign(&mut self, add: impl Into<u32>) -> Option<Self>;
}

fn checked_add_assign(index: &mut u32, add: impl Into<u32>) -> Option<u32> {
    let add: u32 = add.into();
    let next = index.checked_add(add)?;
    if next >= HARDENED_INDEX_BOUNDARY {
        return None;
    }
    *index = next;
    Some(*index)
}

/// Index for unhardened children derivation; ensures that the inner value
/// is always < 2^31
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Debug, Hash, Default, Display, From)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[display(inner)]
pub struct NormalIndex(
    #[from(u8)]
    #[from(u16)]
    u32,
);

impl From<&NormalIndex> for NormalIndex {
    fn from(index: &NormalIndex) -> Self { *index }
}

impl NormalIndex {
    pub const fn normal(child_number: u16) -> Self { NormalIndex(child_number as u32) }
}

impl IdxBase for NormalIndex {
    #[inline]
    fn index(&self) -> u32 { self.child_number() }

    /// Returns unhardened index number.
    #[inline]
    fn child_number(&self) -> u32 { self.0 }

    #[inline]
    fn is_hardened(&self) -> bool { false }
}

impl Idx for NormalIndex {
    const ZERO: Self = Self(0);

    const ONE: Self = Self(1);

    const MAX: Self = Self(HARDENED_INDEX_BOUNDARY - 1);

    #[inline]
    fn try_from_child_number(index: impl Into<u32>) -> Result<Self, IndexError> {
        let index = index.into();
        if index >= HARDENED_INDEX_BOUNDARY {
            Err(IndexError {
                what: "child number",
                invalid: index,
                start: 0,
                end: HARDENED_INDEX_BOUNDARY,
            })
        } else {
            Ok(Self(index))
        }
    }

    #[inline]
    fn try_from_index(value: u32) -> Result<Self, IndexError> {
        Self::try_from_child_number(value).map_err(|mut err| {
            err.what = "index";
            err
        })
    }

    #[inline]
    fn checked_add_assign(&mut self, add: impl Into<u32>) -> Option<Self> {
        checked_add_assign(&mut self.0, add).map(|_| *self)
    }
}

impl TryFrom<u32> for NormalIndex {
    type Error = IndexError;

    fn try_from(value: u32) -> Result<Self, Self::Error> { NormalIndex::try_from_index(value) }
}

impl FromStr for NormalIndex {
    type Err = IndexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.ends_with(['h', 'H', '\'']) {
            return Err(IndexParseError::HardenedForbidden(s.to_owned()));
        }
        Ok(NormalIndex::try_from_child_number(u32::from_str(s)?)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normal_range() {
        assert_eq!(NormalIndex::try_from_index(0), Ok(NormalIndex::ZERO));
        assert_eq!(NormalIndex::try_from_index(HARDENED_INDEX_BOUNDARY - 1), Ok(NormalIndex::MAX));
        let err = NormalIndex::try_from_index(HARDENED_INDEX_BOUNDARY).unwrap_err();
        assert_eq!(err.invalid, HARDENED_INDEX_BOUNDARY);
        assert_eq!(err.what, "index");
        assert_eq!(
            err.to_string(),
            "provided index 2147483648 is invalid: it lies outside allowed range 0..2147483648"
        );
        assert!(NormalIndex::try_from(u32::MAX).is_err());
    }

    #[test]
    fn serialization() {
        assert_eq!(NormalIndex::normal(1).to_be_bytes(), [0, 0, 0, 1]);
        assert_eq!(NormalIndex::MAX.to_be_bytes(), [0x7f, 0xff, 0xff, 0xff]);
        assert!(!NormalIndex::ONE.is_hardened());
    }

    #[test]
    fn increments() {
        assert_eq!(NormalIndex::ZERO.checked_inc(), Some(NormalIndex::ONE));
        assert_eq!(NormalIndex::MAX.checked_inc(), None);
        assert_eq!(NormalIndex::normal(10).checked_add(5u8), Some(NormalIndex::normal(15)));
        let mut idx = NormalIndex::MAX;
        assert_eq!(idx.checked_add_assign(1u8), None);
        assert_eq!(idx, NormalIndex::MAX);
    }

    #[test]
    fn from_str() {
        assert_eq!(NormalIndex::from_str("42"), Ok(NormalIndex::normal(42)));
        assert_eq!(
            NormalIndex::from_str("0h"),
            Err(IndexParseError::HardenedForbidden(s!("0h")))
        );
        assert!(matches!(NormalIndex::from_str("-1"), Err(IndexParseError::Parse(_))));
        assert!(matches!(NormalIndex::from_str("2147483648"), Err(IndexParseError::Invalid(_))));
    }
}
