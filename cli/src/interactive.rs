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


//! Prompt loop: reads an account-level extended key, then address indexes
//! until `Q` returns to the key prompt. `Q` at the key prompt or the end of
//! input exits.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use xderive::{AccountXpub, Idx, Keychain, NormalIndex, HARDENED_INDEX_BOUNDARY};

/// Rejections of user-typed address indexes.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum IndexInputError {
    /// Only numbers are allowed.
    NotNumber,

    /// Index cannot be negative.
    Negative,

    /// Index must be a whole number.
    NotWhole,

    /// Index must be less than 2,147,483,648.
    TooLarge,
}

pub fn parse_index(s: &str) -> Result<NormalIndex, IndexInputError> {
    let value = f64::from_str(s).map_err(|_| IndexInputError::NotNumber)?;
    if value.is_nan() {
        return Err(IndexInputError::NotNumber);
    }
    if value >= HARDENED_INDEX_BOUNDARY as f64 {
        return Err(IndexInputError::TooLarge);
    }
    if value < 0.0 {
        return Err(IndexInputError::Negative);
    }
    if value.fract() != 0.0 {
        return Err(IndexInputError::NotWhole);
    }
    NormalIndex::try_from_index(value as u32).map_err(|_| IndexInputError::TooLarge)
}

fn is_quit(s: &str) -> bool { s.eq_ignore_ascii_case("q") }

fn read_line<'line>(
    input: &mut impl BufRead,
    line: &'line mut String,
) -> io::Result<Option<&'line str>> {
    line.clear();
    if input.read_line(line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim()))
}

pub fn run(mut input: impl BufRead, mut output: impl Write) -> io::Result<()> {
    let mut line = String::new();
    loop {
        writeln!(output, "Enter the account-level extended public key (Q to exit).")?;
        let Some(xkey) = read_line(&mut input, &mut line)? else {
            return Ok(());
        };
        if is_quit(xkey) {
            return Ok(());
        }
        let chain = match AccountXpub::from_str(xkey) {
            Ok(account) => account.keychain(Keychain::External),
            Err(err) => {
                writeln!(output, "{err}")?;
                continue;
            }
        };
        let chain = match chain {
            Ok(chain) => chain,
            Err(err) => {
                writeln!(output, "{err}")?;
                continue;
            }
        };

        loop {
            write!(output, "Enter an address index (Q to change extended key): ")?;
            output.flush()?;
            let Some(s) = read_line(&mut input, &mut line)? else {
                return Ok(());
            };
            if is_quit(s) {
                break;
            }
            let index = match parse_index(s) {
                Ok(index) => index,
                Err(err) => {
                    writeln!(output, "{err}")?;
                    continue;
                }
            };
            match chain.address(index) {
                Ok(address) => {
                    writeln!(output, "{} address at index {index}:", address.address_type())?;
                    writeln!(output, "{address}")?;
                }
                Err(err) => writeln!(output, "{err}")?,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ZPUB: &str = "zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs";

    fn session(input: &str) -> String {
        let mut output = Vec::new();
        run(input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn index_input() {
        assert_eq!(parse_index("0"), Ok(NormalIndex::ZERO));
        assert_eq!(parse_index("2147483647"), Ok(NormalIndex::MAX));
        assert_eq!(parse_index("2147483648"), Err(IndexInputError::TooLarge));
        assert_eq!(parse_index("-1"), Err(IndexInputError::Negative));
        assert_eq!(parse_index("1.5"), Err(IndexInputError::NotWhole));
        assert_eq!(parse_index("abc"), Err(IndexInputError::NotNumber));
        assert_eq!(parse_index("NaN"), Err(IndexInputError::NotNumber));
        assert_eq!(parse_index("3.0"), Ok(NormalIndex::normal(3)));
    }

    #[test]
    fn derives_addresses() {
        let out = session(&format!("{ZPUB}\n0\n1\nq\nq\n"));
        assert!(out.contains("P2WPKH address at index 0:\nbc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu\n"));
        assert!(out.contains("P2WPKH address at index 1:\nbc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g\n"));
    }

    #[test]
    fn reports_errors_and_continues() {
        let out = session(&format!("garbage\n{ZPUB}\n-5\nx\n0\n"));
        assert!(out.contains("extended key is not a valid Base58Check string"));
        assert!(out.contains("Index cannot be negative.\n"));
        assert!(out.contains("Only numbers are allowed.\n"));
        assert!(out.contains("bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"));
    }

    #[test]
    fn quits_immediately() {
        let out = session("Q\nnever read\n");
        assert_eq!(out, "Enter the account-level extended public key (Q to exit).\n");
    }
}
