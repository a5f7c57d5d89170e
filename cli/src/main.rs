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


#[macro_use]
extern crate amplify;
#[macro_use]
extern crate tracing;

mod interactive;
mod opts;

use std::io;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use xderive::{AccountXpub, Idx, NormalIndex};

use crate::opts::Opts;

fn init_logging(opts: &Opts) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if opts.verbose == 0 => filter,
        _ => EnvFilter::try_new(opts.log_level())?,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(&opts)?;

    if opts.interactive {
        return interactive::run(io::stdin().lock(), io::stdout().lock())
            .context("interactive session failed");
    }

    let xkey = opts.xkey().context(
        "no extended public key provided; pass it as an argument or with --xkey or XDERIVE_XKEY",
    )?;
    let account = AccountXpub::from_str(xkey.trim())
        .context("invalid account-level extended public key")?;
    info!(
        "using {} account {} producing {} addresses",
        account.version(),
        account.as_xpub().fingerprint(),
        account.address_type()
    );

    let keychain = opts.keychain();
    let chain = account
        .keychain(keychain)
        .with_context(|| format!("unable to derive {keychain} keychain"))?;
    let mut index = opts.index;
    for n in 0..opts.count {
        let address = chain
            .address(index)
            .with_context(|| format!("unable to derive address at index {index}"))?;
        println!("{}/{index}\t{address}", NormalIndex::from(keychain));
        if n + 1 == opts.count {
            break;
        }
        index = match index.checked_inc() {
            Some(next) => next,
            None => {
                warn!("reached the last non-hardened index {index}");
                break;
            }
        };
    }
    Ok(())
}
