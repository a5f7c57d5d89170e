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

use std::fmt::{self, Display, Formatter};

use crate::SECP256K1;

/// Scalar multiplier for secp256k1 group elements; always strictly less than
/// the group order `n`.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Scalar([u8; 32]);

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("scalar value is not less than the secp256k1 group order.")]
pub struct ScalarOverflow;

impl Scalar {
    pub const ZERO: Scalar = Scalar([0u8; 32]);

    pub const ONE: Scalar = Scalar::from_u64(1);

    pub const fn from_u64(value: u64) -> Self {
        let be = value.to_be_bytes();
        let mut bytes = [0u8; 32];
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = be[i];
            i += 1;
        }
        Scalar(bytes)
    }

    /// Interprets 32 big-endian bytes as a scalar (BIP-32 `parse256`); fails if
    /// the value is not below the group order.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Result<Self, ScalarOverflow> {
        // big-endian arrays of equal length compare as the numbers they encode
        if bytes >= SECP256K1.n {
            return Err(ScalarOverflow);
        }
        Ok(Scalar(bytes))
    }

    pub const fn to_be_bytes(&self) -> [u8; 32] { self.0 }

    pub fn is_zero(&self) -> bool { self.0 == [0u8; 32] }

    /// Iterates over all 256 bits of the scalar, most significant first.
    pub(crate) fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_bound() {
        assert_eq!(Scalar::from_be_bytes(SECP256K1.n), Err(ScalarOverflow));
        assert_eq!(Scalar::from_be_bytes([0xFF; 32]), Err(ScalarOverflow));
        let mut below = SECP256K1.n;
        below[31] -= 1;
        assert!(Scalar::from_be_bytes(below).is_ok());
        assert!(Scalar::from_be_bytes([0u8; 32]).unwrap().is_zero());
    }

    #[test]
    fn bit_iteration() {
        let bits: Vec<bool> = Scalar::from_u64(5).bits().collect();
        assert_eq!(bits.len(), 256);
        assert_eq!(&bits[253..], &[true, false, true]);
        assert!(bits[..253].iter().all(|bit| !bit));
        assert_eq!(Scalar::ONE.to_be_bytes()[31], 1);
    }
}
