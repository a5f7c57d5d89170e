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


use clap::{ArgAction, Parser};
use xderive::{Keychain, NormalIndex};

/// Derives Bitcoin addresses from BIP-44 (xpub), BIP-49 (ypub) and BIP-84
/// (zpub) account-level extended public keys.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about)]
pub struct Opts {
    /// Account-level extended public key.
    pub key: Option<String>,

    /// Account-level extended public key, used when no positional key is
    /// given.
    #[arg(long, env = "XDERIVE_XKEY", hide_env_values = true)]
    pub xkey: Option<String>,

    /// Index of the first address to derive.
    #[arg(short, long, default_value = "0")]
    pub index: NormalIndex,

    /// Number of consecutive addresses to derive.
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,

    /// Derive change addresses from the internal keychain.
    #[arg(short, long)]
    pub change: bool,

    /// Prompt for extended keys and address indexes.
    #[arg(long, conflicts_with_all = ["key", "index", "count", "change"])]
    pub interactive: bool,

    /// Increase verbosity of the log output; may be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Opts {
    pub fn xkey(&self) -> Option<&str> { self.key.as_deref().or(self.xkey.as_deref()) }

    pub fn keychain(&self) -> Keychain { Keychain::with_change(self.change) }

    /// Log filter directive used when `RUST_LOG` is not set or when verbosity
    /// is raised explicitly.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
