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

//! Base58 and Base58Check encodings used by legacy addresses and extended
//! key serialization.

use std::fmt;

use bc::sha256d;
use num_bigint::BigUint;

/// Bitcoin Base58 alphabet.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the Base58Check checksum suffix.
pub const CHECKSUM_LEN: usize = 4;

/// Base58 decoding errors.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum Error {
    /// invalid Base58 character {0:?} at position {1}.
    InvalidCharacter(char, usize),

    /// Base58Check data of {0} bytes is too short to contain a checksum.
    TooShort(usize),

    /// Base58Check checksum mismatch: expected {0:#010x}, found {1:#010x}.
    BadChecksum(u32, u32),
}

fn digit(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    ALPHABET.iter().position(|a| *a == c as u8).map(|pos| pos as u8)
}

fn checksum(data: &[u8]) -> u32 {
    let hash = sha256d(data);
    u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
}

/// Encodes bytes into Base58. Every leading zero byte is represented with a
/// leading `1` character.
pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|b| **b == 0).count();
    let mut s = String::with_capacity(data.len() * 138 / 100 + 1);
    s.extend(std::iter::repeat('1').take(zeros));
    let rest = &data[zeros..];
    if !rest.is_empty() {
        s.extend(
            BigUint::from_bytes_be(rest)
                .to_radix_be(58)
                .into_iter()
                .map(|d| ALPHABET[d as usize] as char),
        );
    }
    s
}

/// Encodes bytes into Base58 after appending the four-byte double SHA256
/// checksum.
pub fn encode_check(data: &[u8]) -> String {
    let mut buf = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    buf.extend_from_slice(data);
    buf.extend_from_slice(&checksum(data).to_be_bytes());
    encode(&buf)
}

/// Writes Base58Check encoding of the data into a formatter.
pub fn encode_check_to_fmt(f: &mut dyn fmt::Write, data: &[u8]) -> fmt::Result {
    f.write_str(&encode_check(data))
}

/// Decodes Base58 string into bytes.
pub fn decode(s: &str) -> Result<Vec<u8>, Error> {
    let digits = s
        .chars()
        .enumerate()
        .map(|(pos, c)| digit(c).ok_or(Error::InvalidCharacter(c, pos)))
        .collect::<Result<Vec<_>, _>>()?;
    let zeros = digits.iter().take_while(|d| **d == 0).count();
    let mut data = vec![0u8; zeros];
    let rest = &digits[zeros..];
    if !rest.is_empty() {
        let num = BigUint::from_radix_be(rest, 58).expect("digits are always below the radix");
        data.extend(num.to_bytes_be());
    }
    Ok(data)
}

/// Decodes Base58Check string, verifying and stripping the checksum.
pub fn decode_check(s: &str) -> Result<Vec<u8>, Error> {
    let mut data = decode(s)?;
    if data.len() < CHECKSUM_LEN {
        return Err(Error::TooShort(data.len()));
    }
    let split = data.len() - CHECKSUM_LEN;
    let found = u32::from_be_bytes([data[split], data[split + 1], data[split + 2], data[split + 3]]);
    let expected = checksum(&data[..split]);
    if expected != found {
        return Err(Error::BadChecksum(expected, found));
    }
    data.truncate(split);
    Ok(data)
}

#[cfg(test)]
mod test {
    use amplify::hex::FromHex;

    use super::*;

    #[test]
    fn known_vectors() {
        let vectors = [
            ("", ""),
            ("61", "2g"),
            ("626262", "a3gV"),
            ("516b6fcd0f", "ABnLTmg"),
            ("bf4f89001e670274dd", "3SEo3LWLoPntC"),
            ("00000000000000000000", "1111111111"),
            ("00eb15231dfceb60925886b67d065299925915aeb172c06647", "1NS17iag9jJgTHD1VXjvLCEnZuQ3rJDE9L"),
        ];
        for (hex, b58) in vectors {
            let data = Vec::<u8>::from_hex(hex).unwrap();
            assert_eq!(encode(&data), b58);
            assert_eq!(decode(b58).unwrap(), data);
        }
        assert_eq!(encode(b"hello world"), "StV1DL6CwTryKyV");
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(encode(&[0]), "1");
        assert_eq!(encode(&[0, 0, 1]), "112");
        assert_eq!(decode("11").unwrap(), vec![0, 0]);
        assert_eq!(decode("112").unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn invalid_characters() {
        assert_eq!(decode("10"), Err(Error::InvalidCharacter('0', 1)));
        assert_eq!(decode("O1"), Err(Error::InvalidCharacter('O', 0)));
        assert_eq!(decode("1Il"), Err(Error::InvalidCharacter('I', 1)));
        assert_eq!(decode("abç"), Err(Error::InvalidCharacter('ç', 2)));
    }

    #[test]
    fn check_encoding() {
        let hash = Vec::<u8>::from_hex("00751e76e8199196d454941c45d1b3a323f1433bd6").unwrap();
        let s = encode_check(&hash);
        assert_eq!(s, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
        assert_eq!(decode_check(&s).unwrap(), hash);

        let mut formatted = String::new();
        encode_check_to_fmt(&mut formatted, &hash).unwrap();
        assert_eq!(formatted, s);
    }

    #[test]
    fn checksum_corruption() {
        let s = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";
        for pos in 1..s.len() {
            let mut corrupted = s.as_bytes().to_vec();
            corrupted[pos] = if corrupted[pos] == b'z' { b'y' } else { b'z' };
            let corrupted = String::from_utf8(corrupted).unwrap();
            assert!(decode_check(&corrupted).is_err(), "{corrupted}");
        }
        assert!(matches!(
            decode_check("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMh"),
            Err(Error::BadChecksum(..))
        ));
    }

    #[test]
    fn too_short() {
        assert_eq!(decode_check(""), Err(Error::TooShort(0)));
        assert_eq!(decode_check("111"), Err(Error::TooShort(3)));
    }
}
