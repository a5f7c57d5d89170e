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


use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use amplify::{Bytes20, Bytes32, Bytes4, Wrapper};
use bc::{hash160, hmac_sha512, CompressedPk, InvalidPubkey, Point, Scalar};
use invoice::{base58, AddressType};
use tracing::trace;

use crate::{Idx, IdxBase, IndexError, NormalIndex};

/// Length of a serialized extended public key.
pub const XPUB_LEN: usize = 78;
/// Length of the extended public key working form: public key followed by the
/// chain code.
pub const XPUB_CORE_LEN: usize = 65;

pub const XPUB_MAINNET_MAGIC: [u8; 4] = [0x04u8, 0x88, 0xB2, 0x1E];
pub const YPUB_MAINNET_MAGIC: [u8; 4] = [0x04u8, 0x9D, 0x7C, 0xB2];
pub const ZPUB_MAINNET_MAGIC: [u8; 4] = [0x04u8, 0xB2, 0x47, 0x46];

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum XkeyDecodeError {
    /// wrong length of extended pubkey data ({0}).
    WrongExtendedKeyLength(usize),

    /// wrong length of extended pubkey working form ({0}).
    WrongCoreLength(usize),

    /// provided key is not a standard mainnet BIP-32 extended pubkey
    UnknownKeyType([u8; 4]),

    /// extended pubkey contains {0}
    #[from]
    InvalidPubkey(InvalidPubkey),
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
pub enum XkeyParseError {
    /// wrong Base58 encoding of extended pubkey data - {0}
    #[display(doc_comments)]
    #[from]
    Base58(base58::Error),

    #[display(inner)]
    #[from]
    Decode(XkeyDecodeError),
}

/// Errors of public child key derivation.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum DeriveError {
    /// child index {0} is hardened; only indexes below 2^31 can be derived from
    /// an extended public key.
    InvalidIndex(u32),

    /// derivation at child index {0} produced a tweak not less than the curve
    /// order; the index must be skipped.
    InvalidTweak(NormalIndex),

    /// derivation at child index {0} produced the point at infinity; the index
    /// must be skipped.
    InvalidCurvePoint(NormalIndex),

    /// extended key is already at the maximal depth of 255 and can't be
    /// derived further.
    MaxDepthExceeded,
}

impl From<IndexError> for DeriveError {
    fn from(err: IndexError) -> Self { DeriveError::InvalidIndex(err.invalid) }
}

/// Mainnet extended public key version, defining the address format used for
/// the keys derived from it.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
pub enum XpubVersion {
    /// BIP-44 legacy accounts.
    #[display("xpub")]
    Xpub,

    /// BIP-49 accounts using segwit nested into P2SH.
    #[display("ypub")]
    Ypub,

    /// BIP-84 native segwit accounts.
    #[display("zpub")]
    Zpub,
}

impl XpubVersion {
    pub const fn magic(self) -> [u8; 4] {
        match self {
            XpubVersion::Xpub => XPUB_MAINNET_MAGIC,
            XpubVersion::Ypub => YPUB_MAINNET_MAGIC,
            XpubVersion::Zpub => ZPUB_MAINNET_MAGIC,
        }
    }

    pub fn from_magic(magic: [u8; 4]) -> Option<Self> {
        match magic {
            XPUB_MAINNET_MAGIC => Some(XpubVersion::Xpub),
            YPUB_MAINNET_MAGIC => Some(XpubVersion::Ypub),
            ZPUB_MAINNET_MAGIC => Some(XpubVersion::Zpub),
            _ => None,
        }
    }

    /// Address format bound to the version.
    pub fn address_type(self) -> AddressType {
        match self {
            XpubVersion::Xpub => AddressType::P2pkh,
            XpubVersion::Ypub => AddressType::P2shWpkh,
            XpubVersion::Zpub => AddressType::P2wpkh,
        }
    }

    pub fn with_address_type(address_type: AddressType) -> Self {
        match address_type {
            AddressType::P2pkh => XpubVersion::Xpub,
            AddressType::P2shWpkh => XpubVersion::Ypub,
            AddressType::P2wpkh => XpubVersion::Zpub,
        }
    }
}

/// BIP32 chain code used for hierarchical derivation
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, RangeOps)]
pub struct ChainCode(Bytes32);

impl AsRef<[u8]> for ChainCode {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<[u8; 32]> for ChainCode {
    fn from(value: [u8; 32]) -> Self { Self(value.into()) }
}

impl From<ChainCode> for [u8; 32] {
    fn from(value: ChainCode) -> Self { value.0.into_inner() }
}

/// Deterministic part of the extended public key.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct XpubCore {
    /// Public key
    pub public_key: CompressedPk,
    /// BIP32 chain code used for hierarchical derivation
    pub chain_code: ChainCode,
}

impl XpubCore {
    /// Serializes into the 65-byte working form.
    pub fn to_bytes(&self) -> [u8; XPUB_CORE_LEN] {
        let mut ret = [0u8; XPUB_CORE_LEN];
        ret[..33].copy_from_slice(&self.public_key.serialize());
        ret[33..].copy_from_slice(self.chain_code.as_ref());
        ret
    }

    pub fn from_bytes(data: impl AsRef<[u8]>) -> Result<Self, XkeyDecodeError> {
        let data = data.as_ref();
        if data.len() != XPUB_CORE_LEN {
            return Err(XkeyDecodeError::WrongCoreLength(data.len()));
        }
        let public_key = CompressedPk::from_bytes(&data[..33])?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[33..]);
        Ok(XpubCore {
            public_key,
            chain_code: chain_code.into(),
        })
    }

    /// Returns the HASH160 of the public key
    pub fn identifier(&self) -> XpubId { XpubId::from(hash160(self.public_key.serialize())) }

    pub fn fingerprint(&self) -> XpubFp {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.identifier()[..4]);
        XpubFp::from(bytes)
    }

    /// Compute the scalar tweak added to this key to get a child key
    pub fn ckd_pub_tweak(&self, child_no: NormalIndex) -> Result<(Scalar, ChainCode), DeriveError> {
        let mut data = [0u8; 37];
        data[..33].copy_from_slice(&self.public_key.serialize());
        data[33..].copy_from_slice(&child_no.to_be_bytes());
        let hmac_result = hmac_sha512(self.chain_code, data);

        let mut tweak = [0u8; 32];
        tweak.copy_from_slice(&hmac_result[..32]);
        let tweak =
            Scalar::from_be_bytes(tweak).map_err(|_| DeriveError::InvalidTweak(child_no))?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&hmac_result[32..]);
        Ok((tweak, ChainCode::from(chain_code)))
    }

    /// Public->Public child key derivation
    pub fn ckd_pub(&self, child_no: NormalIndex) -> Result<XpubCore, DeriveError> {
        let (tweak, chain_code) = self.ckd_pub_tweak(child_no)?;
        let parent = Point::from(self.public_key.to_point());
        let child = Point::mul_base(&tweak)
            .add(&parent)
            .into_affine()
            .map_err(|_| DeriveError::InvalidCurvePoint(child_no))?;
        let public_key = CompressedPk::from_point(&child);
        trace!("derived child {child_no} public key {public_key}");
        Ok(XpubCore {
            public_key,
            chain_code,
        })
    }

    /// Derives a child working form from a raw child number; fails with
    /// [`DeriveError::InvalidIndex`] for hardened numbers.
    pub fn ckd_pub_index(&self, index: u32) -> Result<XpubCore, DeriveError> {
        self.ckd_pub(NormalIndex::try_from_index(index)?)
    }
}

#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct XpubFp(
    #[from]
    #[from([u8; 4])]
    Bytes4,
);

impl AsRef<[u8]> for XpubFp {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<XpubFp> for [u8; 4] {
    fn from(value: XpubFp) -> Self { value.0.into_inner() }
}

impl XpubFp {
    pub const fn master() -> Self { Self(Bytes4::zero()) }
}

#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct XpubId(
    #[from]
    #[from([u8; 20])]
    Bytes20,
);

impl AsRef<[u8]> for XpubId {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<XpubId> for [u8; 20] {
    fn from(value: XpubId) -> Self { value.0.into_inner() }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct XkeyMeta {
    pub depth: u8,
    pub parent_fp: XpubFp,
    /// Raw child number, which may be hardened for keys derived from a private
    /// key.
    pub child_number: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Xpub {
    version: XpubVersion,
    meta: XkeyMeta,
    core: XpubCore,
}

impl Xpub {
    pub fn new(version: XpubVersion, meta: XkeyMeta, core: XpubCore) -> Self {
        Xpub {
            version,
            meta,
            core,
        }
    }

    pub fn decode(data: impl Borrow<[u8]>) -> Result<Xpub, XkeyDecodeError> {
        let data = data.borrow();

        if data.len() != XPUB_LEN {
            return Err(XkeyDecodeError::WrongExtendedKeyLength(data.len()));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[0..4]);
        let version =
            XpubVersion::from_magic(magic).ok_or(XkeyDecodeError::UnknownKeyType(magic))?;
        let depth = data[4];

        let mut parent_fp = [0u8; 4];
        parent_fp.copy_from_slice(&data[5..9]);

        let mut child_number = [0u8; 4];
        child_number.copy_from_slice(&data[9..13]);
        let child_number = u32::from_be_bytes(child_number);

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        let public_key = CompressedPk::from_bytes(&data[45..78])?;

        Ok(Xpub {
            version,
            meta: XkeyMeta {
                depth,
                parent_fp: parent_fp.into(),
                child_number,
            },
            core: XpubCore {
                public_key,
                chain_code: chain_code.into(),
            },
        })
    }

    pub fn encode(&self) -> [u8; XPUB_LEN] {
        let mut ret = [0; XPUB_LEN];
        ret[0..4].copy_from_slice(&self.version.magic());
        ret[4] = self.meta.depth;
        ret[5..9].copy_from_slice(self.meta.parent_fp.as_ref());
        ret[9..13].copy_from_slice(&self.meta.child_number.to_be_bytes());
        ret[13..45].copy_from_slice(self.core.chain_code.as_ref());
        ret[45..78].copy_from_slice(&self.core.public_key.serialize());
        ret
    }

    pub fn version(&self) -> XpubVersion { self.version }

    pub fn depth(&self) -> u8 { self.meta.depth }

    pub fn child_number(&self) -> u32 { self.meta.child_number }

    pub fn parent_fp(&self) -> XpubFp { self.meta.parent_fp }

    pub fn meta(&self) -> XkeyMeta { self.meta }

    pub fn core(&self) -> XpubCore { self.core }

    pub fn chain_code(&self) -> ChainCode { self.core.chain_code }

    /// Returns the HASH160 of the public key
    pub fn identifier(&self) -> XpubId { self.core.identifier() }

    pub fn fingerprint(&self) -> XpubFp { self.core.fingerprint() }

    /// Constructs ECDSA public key.
    pub fn to_compr_pk(&self) -> CompressedPk { self.core.public_key }

    /// Attempts to derive an extended public key from a path.
    pub fn derive_pub(&self, path: impl AsRef<[NormalIndex]>) -> Result<Self, DeriveError> {
        let mut pk = *self;
        for cnum in path.as_ref() {
            pk = pk.ckd_pub(*cnum)?
        }
        Ok(pk)
    }

    /// Public->Public child key derivation
    pub fn ckd_pub(&self, child_no: NormalIndex) -> Result<Xpub, DeriveError> {
        let depth = self.meta.depth.checked_add(1).ok_or(DeriveError::MaxDepthExceeded)?;
        let meta = XkeyMeta {
            depth,
            parent_fp: self.fingerprint(),
            child_number: child_no.index(),
        };
        let core = self.core.ckd_pub(child_no)?;
        Ok(Xpub {
            version: self.version,
            meta,
            core,
        })
    }
}

impl Display for Xpub {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        base58::encode_check_to_fmt(f, &self.encode())
    }
}

impl FromStr for Xpub {
    type Err = XkeyParseError;

    fn from_str(inp: &str) -> Result<Xpub, XkeyParseError> {
        let data = base58::decode_check(inp)?;
        Ok(Xpub::decode(data)?)
    }
}

#[cfg(feature = "serde")]
mod _serde {
    use serde_crate::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for Xpub {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Xpub {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            let s = String::deserialize(deserializer)?;
            Xpub::from_str(&s).map_err(|err| {
                de::Error::custom(format!("invalid xpub string representation; {err}"))
            })
        }
    }

    impl Serialize for XpubVersion {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for XpubVersion {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            match String::deserialize(deserializer)?.as_str() {
                "xpub" => Ok(XpubVersion::Xpub),
                "ypub" => Ok(XpubVersion::Ypub),
                "zpub" => Ok(XpubVersion::Zpub),
                other => Err(de::Error::custom(format!("unknown extended key version '{other}'"))),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use secp256k1::{PublicKey, Secp256k1};

    use super::*;

    fn xpub(s: &str) -> Xpub { Xpub::from_str(s).unwrap() }

    #[test]
    fn bip32_vector2_public_child() {
        let master = xpub(
            "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        );
        assert_eq!(master.depth(), 0);
        assert_eq!(master.parent_fp(), XpubFp::master());
        let child = master.ckd_pub(NormalIndex::ZERO).unwrap();
        assert_eq!(
            child.to_string(),
            "xpub69H7F5d8KSRgmmdJg2KhpAK8SR3DjMwAdkxj3ZuxV27CprR9LgpeyGmXUbC6wb7ERfvrnKZjXoUmmDznezpbZb7ap6r1D3tgFxHmwMkQTPH"
        );
        assert_eq!(child.parent_fp(), master.fingerprint());
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn bip32_vector1_public_chain() {
        let m0h = xpub(
            "xpub68Gmy5EdvgibQVfPdqkBBCHxA5htiqg55crXYuXoQRKfDBFA1WEjWgP6LHhwBZeNK1VTsfTFUHCdrfp1bgwQ9xv5ski8PX9rL2dZXvgGDnw",
        );
        assert_eq!(
            m0h.ckd_pub(NormalIndex::ONE).unwrap().to_string(),
            "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ"
        );

        let m0h_1_2h_2 = xpub(
            "xpub6FHa3pjLCk84BayeJxFW2SP4XRrFd1JYnxeLeU8EqN3vDfZmbqBqaGJAyiLjTAwm6ZLRQUMv1ZACTj37sR62cfN7fe5JnJ7dh8zL4fiyLHV",
        );
        let index = NormalIndex::try_from_index(1_000_000_000).unwrap();
        assert_eq!(
            m0h_1_2h_2.derive_pub([index]).unwrap().to_string(),
            "xpub6H1LXWLaKsWFhvm6RVpEL9P4KfRZSW7abD2ttkWP3SSQvnyA8FSVqNTEcYFgJS2UaFcxupHiYkro49S8yGasTvXEYBVPamhGW6cFJodrTHy"
        );
    }

    #[test]
    fn matches_secp256k1_tweak() {
        let secp = Secp256k1::verification_only();
        let parent = xpub(
            "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        )
        .core();
        for i in [0u16, 1, 2, 77, 4096] {
            let index = NormalIndex::normal(i);
            let (tweak, chain_code) = parent.ckd_pub_tweak(index).unwrap();
            let child = parent.ckd_pub(index).unwrap();
            let tweak = secp256k1::Scalar::from_be_bytes(tweak.to_be_bytes()).unwrap();
            let expected = PublicKey::from_slice(&parent.public_key.serialize())
                .unwrap()
                .add_exp_tweak(&secp, &tweak)
                .unwrap();
            assert_eq!(child.public_key.serialize(), expected.serialize());
            assert_eq!(child.chain_code, chain_code);
        }
    }

    #[test]
    fn determinism_and_separation() {
        let parent = xpub(
            "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        )
        .core();
        let a = parent.ckd_pub(NormalIndex::ZERO).unwrap();
        assert_eq!(a, parent.ckd_pub(NormalIndex::ZERO).unwrap());
        let b = parent.ckd_pub(NormalIndex::ONE).unwrap();
        assert_ne!(a.public_key, b.public_key);
        assert_ne!(a.chain_code, b.chain_code);
        let c = a.ckd_pub(NormalIndex::ZERO).unwrap();
        assert_ne!(a.public_key, c.public_key);
    }

    #[test]
    fn hardened_raw_index() {
        let parent = xpub(
            "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        )
        .core();
        assert_eq!(parent.ckd_pub_index(1 << 31), Err(DeriveError::InvalidIndex(1 << 31)));
        assert_eq!(parent.ckd_pub_index(u32::MAX), Err(DeriveError::InvalidIndex(u32::MAX)));
        assert_eq!(parent.ckd_pub_index(5), parent.ckd_pub(NormalIndex::normal(5)));
    }

    #[test]
    fn core_working_form() {
        let core = xpub(
            "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        )
        .core();
        let bytes = core.to_bytes();
        assert_eq!(bytes[0], core.public_key.serialize()[0]);
        assert_eq!(XpubCore::from_bytes(bytes).unwrap(), core);
        assert_eq!(XpubCore::from_bytes(&bytes[..64]), Err(XkeyDecodeError::WrongCoreLength(64)));
        let mut broken = bytes;
        broken[0] = 0x05;
        assert!(matches!(XpubCore::from_bytes(broken), Err(XkeyDecodeError::InvalidPubkey(_))));
    }

    #[test]
    fn decode_errors() {
        let data = xpub(
            "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        )
        .encode();
        assert_eq!(Xpub::decode(&data[..77]), Err(XkeyDecodeError::WrongExtendedKeyLength(77)));
        let mut tpub = data;
        tpub[..4].copy_from_slice(&[0x04, 0x35, 0x87, 0xCF]);
        assert_eq!(Xpub::decode(tpub), Err(XkeyDecodeError::UnknownKeyType([0x04, 0x35, 0x87, 0xCF])));
        assert_eq!(Xpub::decode(data).unwrap().encode(), data);
    }

    #[test]
    fn versions() {
        for version in [XpubVersion::Xpub, XpubVersion::Ypub, XpubVersion::Zpub] {
            assert_eq!(XpubVersion::from_magic(version.magic()), Some(version));
            assert_eq!(XpubVersion::with_address_type(version.address_type()), version);
        }
        assert_eq!(XpubVersion::Ypub.address_type(), AddressType::P2shWpkh);
        assert_eq!(XpubVersion::from_magic([0x04, 0x88, 0xAD, 0xE4]), None);
    }

    #[test]
    fn max_depth() {
        let master = xpub(
            "xpub661MyMwAqRbcFW31YEwpkMuc5THy2PSt5bDMsktWQcFF8syAmRUapSCGu8ED9W6oDMSgv6Zz8idoc4a6mr8BDzTJY47LJhkJ8UB7WEGuduB",
        );
        let deep = Xpub::new(
            master.version(),
            XkeyMeta {
                depth: u8::MAX,
                ..master.meta()
            },
            master.core(),
        );
        assert_eq!(deep.ckd_pub(NormalIndex::ZERO), Err(DeriveError::MaxDepthExceeded));
    }
}
