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

use crate::{hash160, AffinePoint, FieldElem, PointError, PubkeyHash, WPubkeyHash};

pub const COMPRESSED_PK_LEN: usize = 33;
pub const UNCOMPRESSED_PK_LEN: usize = 65;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum InvalidPubkey {
    /// public key data has invalid length {0}.
    WrongLength(usize),

    /// public key has unsupported prefix byte {0:#04x}.
    WrongPrefix(u8),

    /// public key is not a valid curve point - {0}
    #[from]
    InvalidPoint(PointError),
}

impl AffinePoint {
    /// SEC1 compressed serialization: parity byte (`0x02` for even `y`, `0x03`
    /// for odd `y`) followed by the 32-byte big-endian `x` coordinate.
    pub fn compress(&self) -> [u8; COMPRESSED_PK_LEN] {
        let mut out = [0u8; COMPRESSED_PK_LEN];
        out[0] = if self.y().is_odd() { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&self.x().to_be_bytes());
        out
    }

    /// SEC1 uncompressed serialization `0x04 ‖ x ‖ y`.
    pub fn serialize_uncompressed(&self) -> [u8; UNCOMPRESSED_PK_LEN] {
        let mut out = [0u8; UNCOMPRESSED_PK_LEN];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x().to_be_bytes());
        out[33..].copy_from_slice(&self.y().to_be_bytes());
        out
    }

    /// Recovers the point from its compressed form by computing
    /// `y = sqrt(x³ + 7)` and picking the root with the requested parity.
    pub fn decompress(data: &[u8]) -> Result<Self, InvalidPubkey> {
        if data.len() != COMPRESSED_PK_LEN {
            return Err(InvalidPubkey::WrongLength(data.len()));
        }
        let odd = match data[0] {
            0x02 => false,
            0x03 => true,
            prefix => return Err(InvalidPubkey::WrongPrefix(prefix)),
        };

        let x = FieldElem::from_be_bytes(coord(&data[1..])).ok_or(PointError::NotOnCurve)?;
        let root = AffinePoint::curve_rhs(&x).sqrt().ok_or(PointError::NotOnCurve)?;
        let y = if root.is_odd() == odd { root } else { -&root };
        if y.is_odd() != odd {
            // y = 0 has no odd counterpart
            return Err(PointError::NotOnCurve.into());
        }
        Ok(AffinePoint::new(x, y)?)
    }

    pub fn deserialize_uncompressed(data: &[u8]) -> Result<Self, InvalidPubkey> {
        if data.len() != UNCOMPRESSED_PK_LEN {
            return Err(InvalidPubkey::WrongLength(data.len()));
        }
        if data[0] != 0x04 {
            return Err(InvalidPubkey::WrongPrefix(data[0]));
        }
        let x = FieldElem::from_be_bytes(coord(&data[1..33])).ok_or(PointError::NotOnCurve)?;
        let y = FieldElem::from_be_bytes(coord(&data[33..])).ok_or(PointError::NotOnCurve)?;
        Ok(AffinePoint::new(x, y)?)
    }
}

fn coord(slice: &[u8]) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(slice);
    bytes
}

/// Compressed secp256k1 public key which is guaranteed to encode a point on
/// the curve.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct CompressedPk([u8; COMPRESSED_PK_LEN]);

impl CompressedPk {
    pub fn from_bytes(data: impl AsRef<[u8]>) -> Result<Self, InvalidPubkey> {
        let data = data.as_ref();
        AffinePoint::decompress(data)?;
        let mut bytes = [0u8; COMPRESSED_PK_LEN];
        bytes.copy_from_slice(data);
        Ok(CompressedPk(bytes))
    }

    pub fn from_uncompressed(data: impl AsRef<[u8]>) -> Result<Self, InvalidPubkey> {
        AffinePoint::deserialize_uncompressed(data.as_ref()).map(|point| Self::from_point(&point))
    }

    pub fn from_point(point: &AffinePoint) -> Self { CompressedPk(point.compress()) }

    pub fn serialize(&self) -> [u8; COMPRESSED_PK_LEN] { self.0 }

    pub fn to_point(&self) -> AffinePoint {
        AffinePoint::decompress(&self.0).expect("public key is validated on construction")
    }

    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_PK_LEN] {
        self.to_point().serialize_uncompressed()
    }

    /// HASH160 of the serialized key for use in P2PKH outputs.
    pub fn pubkey_hash(&self) -> PubkeyHash { PubkeyHash::from(hash160(self.0)) }

    /// HASH160 of the serialized key for use as a segwit v0 witness program.
    pub fn wpubkey_hash(&self) -> WPubkeyHash { WPubkeyHash::from(hash160(self.0)) }
}

impl AsRef<[u8]> for CompressedPk {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl From<CompressedPk> for [u8; COMPRESSED_PK_LEN] {
    fn from(pk: CompressedPk) -> Self { pk.0 }
}

impl Display for CompressedPk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Debug for CompressedPk {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { write!(f, "CompressedPk({self})") }
}

#[cfg(test)]
mod test {
    use amplify::hex::FromHex;

    use super::*;
    use crate::{Point, Scalar};

    const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn generator_serialization() {
        let pk = CompressedPk::from_point(AffinePoint::generator());
        assert_eq!(pk.to_string(), G_COMPRESSED);
        assert_eq!(&pk.to_point(), AffinePoint::generator());
        assert_eq!(
            pk.pubkey_hash().to_byte_array().to_vec(),
            Vec::<u8>::from_hex("751e76e8199196d454941c45d1b3a323f1433bd6").unwrap()
        );
    }

    #[test]
    fn compress_decompress_identity() {
        for k in [1u64, 2, 3, 0xFFFF, 0x1234_5678_9ABC_DEF0] {
            let point = Point::mul_base(&Scalar::from_u64(k)).into_affine().unwrap();
            let compressed = point.compress();
            let pk = CompressedPk::from_bytes(compressed).unwrap();
            assert_eq!(pk.to_point(), point);
            assert_eq!(pk.serialize(), compressed);
            assert_eq!(CompressedPk::from_uncompressed(pk.to_uncompressed()).unwrap(), pk);
        }
    }

    #[test]
    fn parity_selects_root() {
        let g = AffinePoint::generator();
        let mut flipped = g.compress();
        flipped[0] ^= 0x01;
        let neg = AffinePoint::decompress(&flipped).unwrap();
        assert_eq!(neg, g.negate());
    }

    #[test]
    fn wrong_length_and_prefix() {
        assert_eq!(CompressedPk::from_bytes([0x02; 32]), Err(InvalidPubkey::WrongLength(32)));
        let mut data = AffinePoint::generator().compress();
        data[0] = 0x04;
        assert_eq!(CompressedPk::from_bytes(data), Err(InvalidPubkey::WrongPrefix(0x04)));
        assert_eq!(
            CompressedPk::from_uncompressed(AffinePoint::generator().compress()),
            Err(InvalidPubkey::WrongLength(33))
        );
    }

    #[test]
    fn x_outside_field() {
        let mut data = [0xFFu8; 33];
        data[0] = 0x02;
        assert_eq!(
            CompressedPk::from_bytes(data),
            Err(InvalidPubkey::InvalidPoint(PointError::NotOnCurve))
        );
    }

    #[test]
    fn x_without_curve_point() {
        // roughly half of all x values have no matching y
        let bad = (1u8..=64)
            .map(|x| {
                let mut data = [0u8; 33];
                data[0] = 0x02;
                data[32] = x;
                data
            })
            .find(|data| AffinePoint::curve_rhs(&FieldElem::from_u64(data[32] as u64)).sqrt().is_none())
            .expect("a non-residue among the first 64 x values");
        assert_eq!(
            CompressedPk::from_bytes(bad),
            Err(InvalidPubkey::InvalidPoint(PointError::NotOnCurve))
        );
    }

    #[test]
    fn uncompressed_off_curve() {
        let mut data = AffinePoint::generator().serialize_uncompressed();
        data[64] ^= 0x01;
        assert_eq!(
            CompressedPk::from_uncompressed(data),
            Err(InvalidPubkey::InvalidPoint(PointError::NotOnCurve))
        );
    }
}
