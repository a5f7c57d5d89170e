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

//! Bech32 and Bech32m encodings (BIP-173, BIP-350) with segwit address
//! helpers.
//!
//! Data part values are plain bytes holding 5-bit groups; every encoding
//! function checks that no value exceeds 31.

use std::fmt::{self, Display, Formatter};

/// Bech32 data part alphabet.
pub const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Separator between the human-readable and the data parts.
pub const SEPARATOR: char = '1';

/// Maximal length of a Bech32 string.
pub const MAX_LEN: usize = 90;

/// Length of the checksum, in 5-bit groups.
pub const CHECKSUM_LEN: usize = 6;

const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
const BECH32_CONST: u32 = 1;
const BECH32M_CONST: u32 = 0x2bc830a3;

/// Checksum variant.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Variant {
    /// Original BIP-173 checksum, used by witness version 0.
    Bech32,
    /// BIP-350 checksum, used by witness versions 1 to 16.
    Bech32m,
}

impl Variant {
    fn constant(self) -> u32 {
        match self {
            Variant::Bech32 => BECH32_CONST,
            Variant::Bech32m => BECH32M_CONST,
        }
    }

    fn from_residue(residue: u32) -> Option<Self> {
        match residue {
            BECH32_CONST => Some(Variant::Bech32),
            BECH32M_CONST => Some(Variant::Bech32m),
            _ => None,
        }
    }

    /// Variant mandated for a given witness version.
    pub fn for_witness_version(version: u8) -> Self {
        if version == 0 { Variant::Bech32 } else { Variant::Bech32m }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bech32 => f.write_str("bech32"),
            Variant::Bech32m => f.write_str("bech32m"),
        }
    }
}

/// Bech32 encoding and decoding errors.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum Error {
    /// Bech32 string has no separator character.
    MissingSeparator,

    /// human-readable part is empty or contains character outside of the
    /// US-ASCII 33..=126 range.
    InvalidHrp,

    /// invalid Bech32 character {0:?}.
    InvalidChar(char),

    /// Bech32 string mixes upper and lower case characters.
    MixedCase,

    /// Bech32 string has invalid length {0}.
    InvalidLength(usize),

    /// invalid Bech32 checksum.
    InvalidChecksum,

    /// value {0} does not fit into the group bit width.
    InvalidData(u8),

    /// non-zero or excessive padding in 5-bit data.
    InvalidPadding,

    /// witness version {0} is above 16.
    InvalidWitnessVersion(u8),

    /// witness program of {0} bytes is invalid for witness version {1}.
    InvalidProgramLength(usize, u8),

    /// witness version {0} must be encoded with {1} checksum.
    InvalidVariant(u8, Variant),

    /// human-readable part '{0}' does not match expected '{1}'.
    HrpMismatch(String, String),
}

fn polymod(values: impl IntoIterator<Item = u8>) -> u32 {
    let mut chk = 1u32;
    for value in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ value as u32;
        for (i, gen) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= gen;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &[u8]) -> impl Iterator<Item = u8> + '_ {
    hrp.iter()
        .map(|c| c >> 5)
        .chain([0])
        .chain(hrp.iter().map(|c| c & 0x1f))
}

fn checksum(hrp: &[u8], data: &[u8], variant: Variant) -> [u8; CHECKSUM_LEN] {
    let residue = polymod(
        hrp_expand(hrp)
            .chain(data.iter().copied())
            .chain([0u8; CHECKSUM_LEN]),
    ) ^ variant.constant();
    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, group) in checksum.iter_mut().enumerate() {
        *group = ((residue >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f) as u8;
    }
    checksum
}

fn check_hrp(hrp: &str) -> Result<(), Error> {
    if hrp.is_empty() || hrp.bytes().any(|b| !(33..=126).contains(&b)) {
        return Err(Error::InvalidHrp);
    }
    Ok(())
}

fn check_case(s: &str) -> Result<(), Error> {
    let has_lower = s.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = s.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Error::MixedCase);
    }
    Ok(())
}

/// Encodes human-readable part and 5-bit data into a lowercase Bech32 string
/// with the checksum of the given variant.
pub fn encode(hrp: &str, data: &[u8], variant: Variant) -> Result<String, Error> {
    check_hrp(hrp)?;
    check_case(hrp)?;
    if let Some(value) = data.iter().find(|v| **v > 0x1f) {
        return Err(Error::InvalidData(*value));
    }
    let len = hrp.len() + 1 + data.len() + CHECKSUM_LEN;
    if len > MAX_LEN {
        return Err(Error::InvalidLength(len));
    }

    let hrp = hrp.to_ascii_lowercase();
    let checksum = checksum(hrp.as_bytes(), data, variant);
    let mut s = String::with_capacity(len);
    s.push_str(&hrp);
    s.push(SEPARATOR);
    s.extend(
        data.iter()
            .chain(checksum.iter())
            .map(|v| CHARSET[*v as usize] as char),
    );
    Ok(s)
}

/// Decodes Bech32 or Bech32m string into a lowercase human-readable part, the
/// 5-bit data without the checksum and the detected checksum variant.
pub fn decode(s: &str) -> Result<(String, Vec<u8>, Variant), Error> {
    if s.len() > MAX_LEN {
        return Err(Error::InvalidLength(s.len()));
    }
    check_case(s)?;
    let s = s.to_ascii_lowercase();
    let split = s.rfind(SEPARATOR).ok_or(Error::MissingSeparator)?;
    let (hrp, data) = (&s[..split], &s[split + 1..]);
    check_hrp(hrp)?;
    if data.len() < CHECKSUM_LEN {
        return Err(Error::InvalidLength(s.len()));
    }

    let mut values = data
        .chars()
        .map(|c| {
            CHARSET
                .iter()
                .position(|a| c.is_ascii() && *a == c as u8)
                .map(|pos| pos as u8)
                .ok_or(Error::InvalidChar(c))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let residue = polymod(hrp_expand(hrp.as_bytes()).chain(values.iter().copied()));
    let variant = Variant::from_residue(residue).ok_or(Error::InvalidChecksum)?;
    values.truncate(values.len() - CHECKSUM_LEN);
    Ok((hrp.to_owned(), values, variant))
}

/// Regroups bits of the data from `from`-bit into `to`-bit values. With
/// `pad` set the trailing incomplete group is zero-padded; otherwise it
/// must consist of fewer than `from` zero bits.
pub fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, Error> {
    let mut acc = 0u32;
    let mut bits = 0u32;
    let max_value = (1u32 << to) - 1;
    let max_acc = (1u32 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for value in data {
        let v = *value as u32;
        if v >> from != 0 {
            return Err(Error::InvalidData(*value));
        }
        acc = ((acc << from) | v) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return Err(Error::InvalidPadding);
    }
    Ok(out)
}

fn check_program(version: u8, len: usize) -> Result<(), Error> {
    if version > 16 {
        return Err(Error::InvalidWitnessVersion(version));
    }
    if !(2..=40).contains(&len) || (version == 0 && len != 20 && len != 32) {
        return Err(Error::InvalidProgramLength(len, version));
    }
    Ok(())
}

/// Encodes a witness program into a segwit address.
pub fn encode_segwit(hrp: &str, version: u8, program: &[u8]) -> Result<String, Error> {
    check_program(version, program.len())?;
    let mut data = Vec::with_capacity(1 + (program.len() * 8 + 4) / 5);
    data.push(version);
    data.extend(convert_bits(program, 8, 5, true)?);
    encode(hrp, &data, Variant::for_witness_version(version))
}

/// Decodes a segwit address for the expected human-readable part into the
/// witness version and program.
pub fn decode_segwit(hrp: &str, s: &str) -> Result<(u8, Vec<u8>), Error> {
    let (found, data, variant) = decode(s)?;
    if found != hrp.to_ascii_lowercase() {
        return Err(Error::HrpMismatch(found, hrp.to_owned()));
    }
    let Some((&version, program)) = data.split_first() else {
        return Err(Error::InvalidProgramLength(0, 0));
    };
    if version > 16 {
        return Err(Error::InvalidWitnessVersion(version));
    }
    let program = convert_bits(program, 5, 8, false)?;
    check_program(version, program.len())?;
    let expected = Variant::for_witness_version(version);
    if variant != expected {
        return Err(Error::InvalidVariant(version, expected));
    }
    Ok((version, program))
}
