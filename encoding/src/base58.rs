// Bitcoin formats library: consensus codecs, keys, scripts and PSBTs
// by LNP/BP Association (https://lnp-bp.org)
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the Apache-2.0 License
// along with this software.
// If not, see <https://opensource.org/licenses/Apache-2.0>.

//! Base58 and base58check encodings as used by legacy addresses and
//! extended keys.

use bitcoin::util::base58;

/// Errors of base58 decoding
#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Base58Error {
    /// invalid base58 data: {0}
    #[from]
    Decode(base58::Error),

    /// base58check payload has length {actual} while {expected} bytes were
    /// expected
    LengthMismatch {
        /// Expected payload length
        expected: usize,
        /// Actual payload length
        actual: usize,
    },

    /// base58check payload does not start with the expected version prefix
    WrongPrefix,
}

/// Encodes data in base58 without checksum. Leading zero bytes are encoded
/// as leading `1` characters.
#[inline]
pub fn encode(data: &[u8]) -> String { base58::encode_slice(data) }

/// Decodes base58 string without checksum.
#[inline]
pub fn decode(s: &str) -> Result<Vec<u8>, Base58Error> { base58::from(s).map_err(Base58Error::from) }

/// Encodes data in base58 with a 4-byte double SHA-256 checksum appended.
#[inline]
pub fn check_encode(data: &[u8]) -> String { base58::check_encode_slice(data) }

/// Decodes base58check string, verifying and stripping the checksum.
#[inline]
pub fn check_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    base58::from_check(s).map_err(Base58Error::from)
}

/// Decodes base58check string and ensures that the payload has the given
/// length.
pub fn check_decode_len(s: &str, expected: usize) -> Result<Vec<u8>, Base58Error> {
    let data = check_decode(s)?;
    if data.len() != expected {
        return Err(Base58Error::LengthMismatch {
            expected,
            actual: data.len(),
        });
    }
    Ok(data)
}

/// Encodes payload with a version prefix in base58check.
pub fn check_encode_versioned(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    check_encode(&data)
}

/// Decodes base58check string which must start with the given version
/// prefix, returning the payload following the prefix.
pub fn check_decode_versioned(s: &str, prefix: &[u8]) -> Result<Vec<u8>, Base58Error> {
    let data = check_decode(s)?;
    if !data.starts_with(prefix) {
        return Err(Base58Error::WrongPrefix);
    }
    Ok(data[prefix.len()..].to_vec())
}
