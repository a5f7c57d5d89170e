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


//! Account-level extended public keys (BIP-44/49/84 depth 3) and derivation
//! of receiving and change addresses from them.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bc::InvalidPubkey;
use invoice::{base58, Address, AddressType};
use tracing::debug;

use crate::{DeriveError, NormalIndex, XkeyDecodeError, Xpub, XpubCore, XpubVersion, XPUB_LEN};

/// Depth of account-level keys in BIP-44, BIP-49 and BIP-84 hierarchies.
pub const ACCOUNT_DEPTH: u8 = 3;

/// Errors validating account-level extended public key strings.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum FormatError {
    /// extended key is not a valid Base58Check string - {0}
    #[from]
    MalformedEncoding(base58::Error),

    /// extended key data must be 78 bytes long, while {0} bytes were provided.
    WrongLength(usize),

    /// extended key version {0:02X?} is neither xpub, ypub nor zpub mainnet
    /// version.
    UnrecognizedVersion([u8; 4]),

    /// extended key has depth {0}, while account-level keys must have depth 3.
    WrongDepth(u8),

    /// extended key contains {0}
    #[from]
    InvalidPubkey(InvalidPubkey),
}

impl From<XkeyDecodeError> for FormatError {
    fn from(err: XkeyDecodeError) -> Self {
        match err {
            XkeyDecodeError::WrongExtendedKeyLength(len) | XkeyDecodeError::WrongCoreLength(len) => {
                FormatError::WrongLength(len)
            }
            XkeyDecodeError::UnknownKeyType(magic) => FormatError::UnrecognizedVersion(magic),
            XkeyDecodeError::InvalidPubkey(err) => FormatError::InvalidPubkey(err),
        }
    }
}

/// Branch directly below an account key.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Display)]
#[repr(u8)]
pub enum Keychain {
    /// Receiving addresses.
    #[default]
    #[display("external")]
    External = 0,

    /// Change addresses.
    #[display("internal")]
    Internal = 1,
}

impl From<Keychain> for NormalIndex {
    #[inline]
    fn from(keychain: Keychain) -> Self { NormalIndex::from(keychain as u8) }
}

impl Keychain {
    pub const fn with_change(change: bool) -> Self {
        if change { Keychain::Internal } else { Keychain::External }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("unknown keychain '{0}'; must be 0, 1, external or internal")]
pub struct KeychainParseError(String);

impl FromStr for Keychain {
    type Err = KeychainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "external" | "receive" => Ok(Keychain::External),
            "1" | "internal" | "change" => Ok(Keychain::Internal),
            _ => Err(KeychainParseError(s.to_owned())),
        }
    }
}

/// Extended public key of a BIP-44 (xpub), BIP-49 (ypub) or BIP-84 (zpub)
/// account. Always has depth 3.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AccountXpub(Xpub);

impl AccountXpub {
    pub fn version(&self) -> XpubVersion { self.0.version() }

    pub fn address_type(&self) -> AddressType { self.0.version().address_type() }

    pub fn core(&self) -> XpubCore { self.0.core() }

    pub fn as_xpub(&self) -> &Xpub { &self.0 }

    /// Derives the extended key of a keychain.
    pub fn keychain(&self, keychain: Keychain) -> Result<KeychainXpub, DeriveError> {
        let xpub = self.0.ckd_pub(keychain.into())?;
        debug!("derived {keychain} keychain of {} account {}", self.version(), self.0.fingerprint());
        Ok(KeychainXpub { keychain, xpub })
    }

    /// Derives address at a given index of a keychain.
    pub fn address(&self, keychain: Keychain, index: NormalIndex) -> Result<Address, DeriveError> {
        self.keychain(keychain)?.address(index)
    }
}

impl TryFrom<Xpub> for AccountXpub {
    type Error = FormatError;

    fn try_from(xpub: Xpub) -> Result<Self, Self::Error> {
        if xpub.depth() != ACCOUNT_DEPTH {
            return Err(FormatError::WrongDepth(xpub.depth()));
        }
        Ok(AccountXpub(xpub))
    }
}

impl From<AccountXpub> for Xpub {
    fn from(account: AccountXpub) -> Self { account.0 }
}

impl Display for AccountXpub {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { Display::fmt(&self.0, f) }
}

impl FromStr for AccountXpub {
    type Err = FormatError;

    /// Checks are applied in order and the first failing one is reported:
    /// Base58Check encoding, data length, version, depth and public key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = base58::decode_check(s)?;
        if data.len() != XPUB_LEN {
            return Err(FormatError::WrongLength(data.len()));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[..4]);
        if XpubVersion::from_magic(magic).is_none() {
            return Err(FormatError::UnrecognizedVersion(magic));
        }
        if data[4] != ACCOUNT_DEPTH {
            return Err(FormatError::WrongDepth(data[4]));
        }
        let account = AccountXpub::try_from(Xpub::decode(data)?)?;
        debug!("parsed {} account key {}", account.version(), account.0.fingerprint());
        Ok(account)
    }
}

/// Extended public key of an account keychain, from which addresses are
/// derived.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeychainXpub {
    keychain: Keychain,
    xpub: Xpub,
}

impl KeychainXpub {
    pub fn keychain(&self) -> Keychain { self.keychain }

    pub fn version(&self) -> XpubVersion { self.xpub.version() }

    pub fn as_xpub(&self) -> &Xpub { &self.xpub }

    pub fn address(&self, index: NormalIndex) -> Result<Address, DeriveError> {
        let child = self.xpub.core().ckd_pub(index)?;
        let address = Address::with(&child.public_key, self.version().address_type());
        debug!("derived {} address {address} at {}/{index}", self.version(), self.keychain);
        Ok(address)
    }
}

/// Parses an account-level extended public key, returning its working form
/// together with the version which defines the address format.
pub fn parse_and_validate(s: &str) -> Result<(XpubCore, XpubVersion), FormatError> {
    let account = AccountXpub::from_str(s)?;
    Ok((account.core(), account.version()))
}

/// Derives the external (receiving) keychain of an account.
pub fn derive_external_chain(account: &XpubCore) -> Result<XpubCore, DeriveError> {
    derive_keychain(account, Keychain::External)
}

pub fn derive_keychain(account: &XpubCore, keychain: Keychain) -> Result<XpubCore, DeriveError> {
    account.ckd_pub(keychain.into())
}

/// Derives the address at a given index of a keychain. Indexes at or above
/// 2^31 are hardened and fail with [`DeriveError::InvalidIndex`].
pub fn derive_address_at_index(
    chain: &XpubCore,
    index: u32,
    version: XpubVersion,
) -> Result<Address, DeriveError> {
    let child = chain.ckd_pub_index(index)?;
    Ok(Address::with(&child.public_key, version.address_type()))
}
