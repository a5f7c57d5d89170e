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

use std::sync::OnceLock;

use num_bigint::BigUint;

/// Domain parameters of a short Weierstrass curve `y² = x³ + ax + b` over a
/// prime field, with all big integers stored as 32-byte big-endian values.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CurveParams {
    /// Field prime.
    pub p: [u8; 32],
    pub a: [u8; 32],
    pub b: [u8; 32],
    /// Base point x coordinate.
    pub gx: [u8; 32],
    /// Base point y coordinate.
    pub gy: [u8; 32],
    /// Order of the base point.
    pub n: [u8; 32],
    /// Cofactor.
    pub h: u8,
}

/// secp256k1 parameters as defined in SEC 2 v2, section 2.4.1.
pub const SECP256K1: CurveParams = CurveParams {
    p: hex32("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F"),
    a: hex32("0000000000000000000000000000000000000000000000000000000000000000"),
    b: hex32("0000000000000000000000000000000000000000000000000000000000000007"),
    gx: hex32("79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798"),
    gy: hex32("483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8"),
    n: hex32("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141"),
    h: 1,
};

const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in curve constant"),
    }
}

const fn hex32(s: &str) -> [u8; 32] {
    let s = s.as_bytes();
    assert!(s.len() == 64, "curve constant must be 32 bytes long");
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = (hex_digit(s[2 * i]) << 4) | hex_digit(s[2 * i + 1]);
        i += 1;
    }
    out
}

pub(crate) fn field_modulus() -> &'static BigUint {
    static P: OnceLock<BigUint> = OnceLock::new();
    P.get_or_init(|| BigUint::from_bytes_be(&SECP256K1.p))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_prime_shape() {
        // p = 2^256 - 2^32 - 977
        let two = BigUint::from(2u8);
        let expected = two.pow(256) - two.pow(32) - BigUint::from(977u32);
        assert_eq!(*field_modulus(), expected);
        // p ≡ 3 (mod 4), which square root extraction relies upon
        assert_eq!(field_modulus() % 4u8, BigUint::from(3u8));
    }

    #[test]
    fn order_below_prime() {
        assert!(SECP256K1.n < SECP256K1.p);
        assert_eq!(SECP256K1.h, 1);
        assert_eq!(SECP256K1.a, [0u8; 32]);
        assert_eq!(BigUint::from_bytes_be(&SECP256K1.b), BigUint::from(7u8));
    }
}
