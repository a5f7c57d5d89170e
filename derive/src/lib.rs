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


//! Watch-only BIP-32 public derivation: child indexes, extended public keys
//! and account-level keychains producing receiving and change addresses.

#[macro_use]
extern crate amplify;

mod index;
mod xkey;
mod account;

pub use account::{
    derive_address_at_index, derive_external_chain, derive_keychain, parse_and_validate,
    AccountXpub, FormatError, Keychain, KeychainParseError, KeychainXpub, ACCOUNT_DEPTH,
};
pub use index::{Idx, IdxBase, IndexError, IndexParseError, NormalIndex, HARDENED_INDEX_BOUNDARY};
pub use xkey::{
    ChainCode, DeriveError, XkeyDecodeError, XkeyMeta, XkeyParseError, Xpub, XpubCore, XpubFp,
    XpubId, XpubVersion, XPUB_CORE_LEN, XPUB_LEN, XPUB_MAINNET_MAGIC, YPUB_MAINNET_MAGIC,
    ZPUB_MAINNET_MAGIC,
};
