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

use std::fmt::{self, Debug, Display, Formatter};
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::params::field_modulus;

/// Element of the secp256k1 base field, i.e. an integer reduced modulo `p`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElem(BigUint);

impl FieldElem {
    pub fn zero() -> Self { FieldElem(BigUint::zero()) }

    pub fn one() -> Self { FieldElem(BigUint::one()) }

    pub fn from_u64(value: u64) -> Self { FieldElem(BigUint::from(value) % field_modulus()) }

    /// Parses a field element from 32 big-endian bytes; fails for values which
    /// are not canonical, i.e. are equal to or above the field prime.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Option<Self> {
        let value = BigUint::from_bytes_be(&bytes);
        if &value >= field_modulus() {
            return None;
        }
        Some(FieldElem(value))
    }

    /// Serializes the element as a fixed-size 32-byte big-endian buffer,
    /// left-padded with zeros.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let raw = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - raw.len()..].copy_from_slice(&raw);
        out
    }

    pub fn is_zero(&self) -> bool { self.0.is_zero() }

    pub fn is_odd(&self) -> bool { self.to_be_bytes()[31] & 1 == 1 }

    pub fn square(&self) -> Self { self * self }

    pub fn double(&self) -> Self { self + self }

    pub(crate) fn pow(&self, exp: &BigUint) -> Self {
        FieldElem(self.0.modpow(exp, field_modulus()))
    }

    /// Multiplicative inverse; `None` for zero.
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        self.0.modinv(field_modulus()).map(FieldElem)
    }

    /// Square root of the element. Since `p ≡ 3 (mod 4)` the candidate root is
    /// `self^((p + 1) / 4)`; `None` is returned when the element is a quadratic
    /// non-residue and the candidate does not square back to it.
    pub fn sqrt(&self) -> Option<Self> {
        let exp = (field_modulus() + 1u8) >> 2u32;
        let root = self.pow(&exp);
        if root.square() == *self {
            Some(root)
        } else {
            None
        }
    }
}

impl Add for &FieldElem {
    type Output = FieldElem;

    fn add(self, rhs: Self) -> FieldElem { FieldElem((&self.0 + &rhs.0) % field_modulus()) }
}

impl Sub for &FieldElem {
    type Output = FieldElem;

    fn sub(self, rhs: Self) -> FieldElem {
        let p = field_modulus();
        FieldElem((&self.0 + p - &rhs.0) % p)
    }
}

impl Mul for &FieldElem {
    type Output = FieldElem;

    fn mul(self, rhs: Self) -> FieldElem { FieldElem((&self.0 * &rhs.0) % field_modulus()) }
}

impl Neg for &FieldElem {
    type Output = FieldElem;

    fn neg(self) -> FieldElem {
        if self.is_zero() {
            return FieldElem::zero();
        }
        FieldElem(field_modulus() - &self.0)
    }
}

impl Display for FieldElem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.to_be_bytes() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Debug for FieldElem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { write!(f, "FieldElem({self})") }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SECP256K1;

    #[test]
    fn serialization_pads() {
        let one = FieldElem::one();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(one.to_be_bytes(), expected);
        assert_eq!(FieldElem::from_be_bytes(expected), Some(one));
        assert_eq!(FieldElem::zero().to_be_bytes(), [0u8; 32]);
    }

    #[test]
    fn non_canonical_rejected() {
        assert_eq!(FieldElem::from_be_bytes(SECP256K1.p), None);
        assert_eq!(FieldElem::from_be_bytes([0xFF; 32]), None);
    }

    #[test]
    fn arithmetic_wraps_modulo_prime() {
        let minus_one = -&FieldElem::one();
        assert_eq!(&minus_one + &FieldElem::one(), FieldElem::zero());
        assert_eq!(&FieldElem::zero() - &FieldElem::one(), minus_one);
        assert_eq!(minus_one.square(), FieldElem::one());
        assert!(!minus_one.is_zero() && !minus_one.is_odd());
    }

    #[test]
    fn inversion() {
        let x = FieldElem::from_u64(0xDEAD_BEEF);
        let inv = x.invert().unwrap();
        assert_eq!(&x * &inv, FieldElem::one());
        assert_eq!(FieldElem::zero().invert(), None);
    }

    #[test]
    fn square_roots() {
        let x = FieldElem::from_u64(1234567);
        let sq = x.square();
        let root = sq.sqrt().unwrap();
        assert!(root == x || root == -&x);
        // -1 is a non-residue modulo any prime p ≡ 3 (mod 4)
        assert_eq!((-&FieldElem::one()).sqrt(), None);
    }
}
