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

use amplify::{Bytes20, Wrapper};
use bitcoin_hashes::{hash160 as h160, sha256 as h256, sha256d as h256d, sha512};
use bitcoin_hashes::{Hash, HashEngine, Hmac, HmacEngine};

/// Single SHA-256 digest of the data.
pub fn sha256(data: impl AsRef<[u8]>) -> [u8; 32] {
    h256::Hash::hash(data.as_ref()).to_byte_array()
}

/// Double SHA-256 digest of the data, as used by Base58Check checksums.
pub fn sha256d(data: impl AsRef<[u8]>) -> [u8; 32] {
    h256d::Hash::hash(data.as_ref()).to_byte_array()
}

/// RIPEMD-160 digest of the SHA-256 digest of the data.
pub fn hash160(data: impl AsRef<[u8]>) -> [u8; 20] {
    h160::Hash::hash(data.as_ref()).to_byte_array()
}

/// HMAC-SHA512 keyed hash.
pub fn hmac_sha512(key: impl AsRef<[u8]>, data: impl AsRef<[u8]>) -> [u8; 64] {
    let mut engine: HmacEngine<sha512::Hash> = HmacEngine::new(key.as_ref());
    engine.input(data.as_ref());
    Hmac::<sha512::Hash>::from_engine(engine).to_byte_array()
}

macro_rules! hash20 {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
        #[wrapper(Deref, RangeOps)]
        pub struct $name(Bytes20);

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] { self.0.as_ref() }
        }

        impl From<[u8; 20]> for $name {
            fn from(value: [u8; 20]) -> Self { Self(value.into()) }
        }

        impl From<$name> for [u8; 20] {
            fn from(value: $name) -> Self { value.0.into_inner() }
        }

        impl $name {
            pub fn to_byte_array(&self) -> [u8; 20] { self.0.into_inner() }
        }
    };
}

hash20!(
    /// HASH160 of a compressed public key committed into a P2PKH output.
    PubkeyHash
);

hash20!(
    /// HASH160 of a redeem script committed into a P2SH output.
    ScriptHash
);

hash20!(
    /// HASH160 of a compressed public key used as a segwit v0 witness program.
    WPubkeyHash
);

impl From<WPubkeyHash> for PubkeyHash {
    fn from(hash: WPubkeyHash) -> Self { PubkeyHash(hash.0) }
}

impl From<PubkeyHash> for WPubkeyHash {
    fn from(hash: PubkeyHash) -> Self { WPubkeyHash(hash.0) }
}

impl WPubkeyHash {
    /// Witness program redeem script `OP_0 <20-byte hash>` wrapped into P2SH
    /// for P2SH-P2WPKH outputs.
    pub fn redeem_script(&self) -> [u8; 22] {
        let mut script = [0u8; 22];
        script[0] = 0x00;
        script[1] = 0x14;
        script[2..].copy_from_slice(self.as_ref());
        script
    }
}

impl ScriptHash {
    /// Script hash of the nested segwit v0 pubkey hash program.
    pub fn nested_wpkh(wpkh: WPubkeyHash) -> Self {
        ScriptHash::from(hash160(wpkh.redeem_script()))
    }
}

#[cfg(test)]
mod test {
    use amplify::hex::FromHex;

    use super::*;

    fn hex(s: &str) -> Vec<u8> { Vec::<u8>::from_hex(s).unwrap() }

    #[test]
    fn sha256_abc() {
        assert_eq!(
            sha256(b"abc").to_vec(),
            hex("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn sha256d_is_double_sha256() {
        assert_eq!(sha256d(b"hello"), sha256(sha256(b"hello")));
        assert_eq!(
            sha256d(b"").to_vec(),
            hex("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456")
        );
    }

    #[test]
    fn hash160_generator_pubkey() {
        let pk = hex("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        assert_eq!(hash160(&pk).to_vec(), hex("751e76e8199196d454941c45d1b3a323f1433bd6"));
    }

    #[test]
    fn hmac_sha512_rfc4231() {
        let mac = hmac_sha512(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            mac.to_vec(),
            hex("164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
                 9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737")
        );
    }

    #[test]
    fn nested_wpkh_redeem_script() {
        let wpkh = WPubkeyHash::from([0xABu8; 20]);
        let script = wpkh.redeem_script();
        assert_eq!(&script[..2], &[0x00, 0x14]);
        assert_eq!(&script[2..], &[0xABu8; 20]);
        assert_eq!(ScriptHash::nested_wpkh(wpkh).to_byte_array(), hash160(script));
    }
}
