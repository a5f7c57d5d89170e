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

//! Consensus-level primitives for watch-only BIP-32 derivation: hash functions,
//! secp256k1 domain parameters, field and group arithmetic and public key
//! serialization.

#[macro_use]
extern crate amplify;

mod hashes;
mod params;
mod field;
mod scalar;
mod point;
mod pubkey;

pub use field::FieldElem;
pub use hashes::{hash160, hmac_sha512, sha256, sha256d, PubkeyHash, ScriptHash, WPubkeyHash};
pub use params::{CurveParams, SECP256K1};
pub use point::{AffinePoint, Point, PointError};
pub use pubkey::{CompressedPk, InvalidPubkey, COMPRESSED_PK_LEN, UNCOMPRESSED_PK_LEN};
pub use scalar::{Scalar, ScalarOverflow};
