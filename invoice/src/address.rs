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

//! Mainnet address formats produced for account-level extended public keys.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bc::{CompressedPk, PubkeyHash, ScriptHash, WPubkeyHash};

use crate::{base58, bech32};

/// Mainnet (bitcoin) pubkey address prefix.
pub const PUBKEY_ADDRESS_PREFIX_MAIN: u8 = 0; // 0x00
/// Mainnet (bitcoin) script address prefix.
pub const SCRIPT_ADDRESS_PREFIX_MAIN: u8 = 5; // 0x05
/// Mainnet (bitcoin) segwit human-readable part.
pub const BECH32_HRP_MAIN: &str = "bc";

/// Errors parsing address strings.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AddressParseError {
    /// wrong Base58 encoding of address data - {0}
    #[from]
    Base58(base58::Error),

    /// wrong Bech32 encoding of address data - {0}
    #[from]
    Bech32(bech32::Error),

    /// Base58 address payload has invalid length {0}.
    InvalidLength(usize),

    /// proprietary address has an invalid version code {0:#04x}.
    InvalidAddressVersion(u8),

    /// segwit address has an unsupported witness version {0}.
    UnsupportedWitnessVersion(u8),

    /// segwit address has a witness program of {0} bytes, which is not a
    /// public key hash.
    UnsupportedProgram(usize),

    /// unrecognized address format in '{0}'.
    UnrecognizableFormat(String),

    /// unrecognized address format string; must be one of `P2PKH`,
    /// `P2SH-P2WPKH`, `P2WPKH`
    UnrecognizedAddressType,
}

/// Mainnet Bitcoin address.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address {
    /// Address payload (see [`AddressPayload`]).
    pub payload: AddressPayload,
}

impl From<AddressPayload> for Address {
    fn from(payload: AddressPayload) -> Self { Address { payload } }
}

impl Address {
    pub fn new(payload: AddressPayload) -> Self { Address { payload } }

    /// Constructs address of a given type paying to the public key.
    pub fn with(pk: &CompressedPk, address_type: AddressType) -> Self {
        Address::new(AddressPayload::with(pk, address_type))
    }

    /// Legacy pay-to-public-key-hash address.
    pub fn p2pkh(pk: &CompressedPk) -> Self { Address::with(pk, AddressType::P2pkh) }

    /// Nested segwit address wrapping a P2WPKH program into P2SH.
    pub fn p2sh_wpkh(pk: &CompressedPk) -> Self { Address::with(pk, AddressType::P2shWpkh) }

    /// Native segwit v0 pay-to-witness-public-key-hash address.
    pub fn p2wpkh(pk: &CompressedPk) -> Self { Address::with(pk, AddressType::P2wpkh) }

    /// Detects address type.
    pub fn address_type(self) -> AddressType { self.payload.address_type() }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (prefix, hash) = match self.payload {
            AddressPayload::Pkh(hash) => (PUBKEY_ADDRESS_PREFIX_MAIN, hash.to_byte_array()),
            AddressPayload::Sh(hash) => (SCRIPT_ADDRESS_PREFIX_MAIN, hash.to_byte_array()),
            AddressPayload::Wpkh(hash) => {
                let s = bech32::encode_segwit(BECH32_HRP_MAIN, 0, hash.as_ref())
                    .map_err(|_| fmt::Error)?;
                return if f.alternate() {
                    f.write_str(&s.to_ascii_uppercase())
                } else {
                    f.write_str(&s)
                };
            }
        };
        let mut prefixed = [0; 21];
        prefixed[0] = prefix;
        prefixed[1..].copy_from_slice(&hash);
        base58::encode_check_to_fmt(f, &prefixed[..])
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_base58 = || -> Result<Self, Self::Err> {
            let data = base58::decode_check(s)?;
            if data.len() != 21 {
                return Err(AddressParseError::InvalidLength(data.len()));
            }
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&data[1..]);
            let payload = match data[0] {
                PUBKEY_ADDRESS_PREFIX_MAIN => AddressPayload::Pkh(PubkeyHash::from(hash)),
                SCRIPT_ADDRESS_PREFIX_MAIN => AddressPayload::Sh(ScriptHash::from(hash)),
                x => return Err(AddressParseError::InvalidAddressVersion(x)),
            };
            Ok(Address::new(payload))
        };

        let parse_bech32 = || -> Result<Self, Self::Err> {
            let (version, program) = bech32::decode_segwit(BECH32_HRP_MAIN, s)?;
            if version != 0 {
                return Err(AddressParseError::UnsupportedWitnessVersion(version));
            }
            if program.len() != 20 {
                return Err(AddressParseError::UnsupportedProgram(program.len()));
            }
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&program);
            Ok(Address::new(AddressPayload::Wpkh(WPubkeyHash::from(hash))))
        };

        match bech32::decode(s) {
            Ok((hrp, _, _)) if hrp == BECH32_HRP_MAIN => parse_bech32(),
            _ => parse_base58().map_err(|err| match err {
                AddressParseError::InvalidAddressVersion(_) => err,
                _ => AddressParseError::UnrecognizableFormat(s.to_owned()),
            }),
        }
    }
}

/// Internal address content: a 20-byte hash committed into the output.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
pub enum AddressPayload {
    /// P2PKH payload.
    #[from]
    Pkh(PubkeyHash),

    /// Nested segwit P2WPKH-in-P2SH payload.
    #[from]
    Sh(ScriptHash),

    /// P2WPKH payload.
    #[from]
    Wpkh(WPubkeyHash),
}

impl AddressPayload {
    /// Constructs payload of a given type committing to the public key.
    pub fn with(pk: &CompressedPk, address_type: AddressType) -> Self {
        match address_type {
            AddressType::P2pkh => AddressPayload::Pkh(pk.pubkey_hash()),
            AddressType::P2shWpkh => AddressPayload::Sh(ScriptHash::nested_wpkh(pk.wpubkey_hash())),
            AddressType::P2wpkh => AddressPayload::Wpkh(pk.wpubkey_hash()),
        }
    }

    /// Constructs [`Address`] from the payload.
    pub fn into_address(self) -> Address { Address { payload: self } }

    /// Detects address type.
    pub fn address_type(self) -> AddressType {
        match self {
            AddressPayload::Pkh(_) => AddressType::P2pkh,
            AddressPayload::Sh(_) => AddressType::P2shWpkh,
            AddressPayload::Wpkh(_) => AddressType::P2wpkh,
        }
    }
}

/// Address type
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
pub enum AddressType {
    /// Pay-to-public key hash
    #[display("P2PKH")]
    P2pkh,

    /// Pay-to-witness public key hash nested in pay-to-script hash
    #[display("P2SH-P2WPKH")]
    P2shWpkh,

    /// Pay-to-witness public key hash
    #[display("P2WPKH")]
    P2wpkh,
}

impl AddressType {
    /// Returns witness version used by the address format.
    /// Returns `None` for pre-SegWit address formats.
    pub fn witness_version(self) -> Option<u8> {
        match self {
            AddressType::P2pkh => None,
            AddressType::P2shWpkh | AddressType::P2wpkh => Some(0),
        }
    }
}

impl FromStr for AddressType {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[allow(clippy::match_str_case_mismatch)]
        Ok(match s.to_uppercase().as_str() {
            "P2PKH" => AddressType::P2pkh,
            "P2SH-P2WPKH" | "P2WPKH-P2SH" => AddressType::P2shWpkh,
            "P2WPKH" => AddressType::P2wpkh,
            _ => return Err(AddressParseError::UnrecognizedAddressType),
        })
    }
}

#[cfg(feature = "serde")]
mod _serde {
    use serde_crate::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for Address {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            let s = String::deserialize(deserializer)?;
            Address::from_str(&s).map_err(|err| {
                de::Error::custom(format!("invalid address string representation; {err}"))
            })
        }
    }

    impl Serialize for AddressType {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for AddressType {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            let s = String::deserialize(deserializer)?;
            AddressType::from_str(&s).map_err(|err| de::Error::custom(err.to_string()))
        }
    }
}

#[cfg(test)]
mod test {
    use amplify::hex::FromHex;

    use super::*;

    fn generator_pk() -> CompressedPk {
        let data =
            Vec::<u8>::from_hex("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
                .unwrap();
        CompressedPk::from_bytes(data).unwrap()
    }

    #[test]
    fn generator_addresses() {
        let pk = generator_pk();
        assert_eq!(Address::p2pkh(&pk).to_string(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert_eq!(Address::p2sh_wpkh(&pk).to_string(), "3JvL6Ymt8MVWiCNHC7oWU6nLeHNJKLZGLN");
        assert_eq!(Address::p2wpkh(&pk).to_string(), "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
        assert_eq!(
            format!("{:#}", Address::p2wpkh(&pk)),
            "BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4"
        );
    }

    #[test]
    fn display_from_str() {
        for s in [
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH",
            "3JvL6Ymt8MVWiCNHC7oWU6nLeHNJKLZGLN",
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
        ] {
            assert_eq!(Address::from_str(s).unwrap().to_string(), s);
        }
        let upper = Address::from_str("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4").unwrap();
        assert_eq!(upper.address_type(), AddressType::P2wpkh);
    }

    #[test]
    fn address_types() {
        let pk = generator_pk();
        for ty in [AddressType::P2pkh, AddressType::P2shWpkh, AddressType::P2wpkh] {
            assert_eq!(Address::with(&pk, ty).address_type(), ty);
            assert_eq!(AddressType::from_str(&ty.to_string()).unwrap(), ty);
        }
        assert_eq!(AddressType::P2shWpkh.to_string(), "P2SH-P2WPKH");
        assert_eq!(AddressType::P2pkh.witness_version(), None);
        assert_eq!(AddressType::P2wpkh.witness_version(), Some(0));
        assert_eq!(AddressType::from_str("p2tr"), Err(AddressParseError::UnrecognizedAddressType));
    }

    #[test]
    fn parse_errors() {
        let taproot = bech32::encode_segwit("bc", 1, &[1u8; 32]).unwrap();
        assert_eq!(
            Address::from_str(&taproot),
            Err(AddressParseError::UnsupportedWitnessVersion(1))
        );
        let wsh = bech32::encode_segwit("bc", 0, &[1u8; 32]).unwrap();
        assert_eq!(Address::from_str(&wsh), Err(AddressParseError::UnsupportedProgram(32)));

        let testnet = base58::encode_check(&[0x6f; 21]);
        assert_eq!(Address::from_str(&testnet), Err(AddressParseError::InvalidAddressVersion(0x6f)));

        assert_eq!(
            Address::from_str("not an address"),
            Err(AddressParseError::UnrecognizableFormat(s!("not an address")))
        );
    }
}
