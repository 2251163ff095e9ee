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

//! Primitives for the bitcoin consensus binary format: encoding traits,
//! compact integers, length-prefixed byte strings and lists, together with
//! the hash functions and text encodings (base58check, bech32) used across
//! the bitcoin protocol.

// Coding conventions
#![recursion_limit = "256"]
#![deny(unsafe_code /* , missing_docs */)]

#[macro_use]
extern crate amplify;

pub mod base58;
pub mod bech32;
mod compact;
mod error;
pub mod hashes;
mod primitives;

pub use compact::{
    compact_len, read_compact, read_greedy, read_list, read_to_end, read_var_bytes,
    write_compact, write_list, write_var_bytes, CompactUint,
};
pub use error::Error;

use std::io;

/// Maximum number of bytes a single decoded collection may pre-allocate.
///
/// Matches the consensus limit on the size of a serialized block, which is
/// an upper bound for any length prefix found in well-formed data.
pub const MAX_VEC_SIZE: usize = 4_000_000;

/// Data structures which can be written in bitcoin consensus format.
pub trait Encode {
    /// Writes the consensus representation of `self` into the writer,
    /// returning the number of bytes written.
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error>;

    /// Serializes the data into a byte vector.
    ///
    /// Fails only if the data structure is internally inconsistent and
    /// can't be represented in the consensus format.
    fn serialize(&self) -> Result<Vec<u8>, io::Error> {
        let mut buf = Vec::new();
        self.consensus_encode(&mut buf)?;
        Ok(buf)
    }
}

/// Data structures which can be read from bitcoin consensus format.
pub trait Decode: Sized {
    /// Reads the data structure from the reader, consuming exactly the
    /// number of bytes its representation takes.
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error>;

    /// Deserializes the data structure from a byte slice, requiring all the
    /// data to be consumed.
    fn deserialize(data: &[u8]) -> Result<Self, Error> {
        let mut cursor = io::Cursor::new(data);
        let value = Self::consensus_decode(&mut cursor)?;
        let consumed = cursor.position() as usize;
        if consumed != data.len() {
            return Err(Error::DataNotConsumed(data.len() - consumed));
        }
        Ok(value)
    }
}

impl<T> Encode for &T
where
    T: Encode,
{
    #[inline]
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        T::consensus_encode(self, writer)
    }
}

impl<T> Encode for Box<T>
where
    T: Encode,
{
    #[inline]
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        T::consensus_encode(self, writer)
    }
}
