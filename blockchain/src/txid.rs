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


use std::fmt::{self, Debug, Display, Formatter};
use std::io;
use std::str::FromStr;

use bitcoin::hashes::hex::{self, FromHex, ToHex};
use bitcoinformats_encoding::{Decode, Encode};

macro_rules! txid_type {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        ///
        /// Bytes are kept in the internal (consensus) order; text forms use
        /// the reversed byte order, as block explorers and RPC do.
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Constructs identifier from bytes in internal order
            #[inline]
            pub const fn from_inner(bytes: [u8; 32]) -> Self { $name(bytes) }

            /// Returns bytes in internal order
            #[inline]
            pub const fn into_inner(self) -> [u8; 32] { self.0 }

            /// Returns reference to the bytes in internal order
            #[inline]
            pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self { $name(bytes) }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                let mut bytes = self.0;
                bytes.reverse();
                f.write_str(&bytes[..].to_hex())
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = hex::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = <[u8; 32]>::from_hex(s)?;
                bytes.reverse();
                Ok($name(bytes))
            }
        }

        impl Encode for $name {
            fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
                self.0.consensus_encode(writer)
            }
        }

        impl Decode for $name {
            fn consensus_decode<R: io::Read + ?Sized>(
                reader: &mut R,
            ) -> Result<Self, bitcoinformats_encoding::Error> {
                <[u8; 32]>::consensus_decode(reader).map($name)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                $name::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

txid_type!(
    /// Transaction identifier: double SHA-256 of the transaction serialized
    /// without witness data
    Txid
);

txid_type!(
    /// Witness transaction identifier: double SHA-256 of the transaction
    /// serialized with witness data
    Wtxid
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reversed_text_form() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x01;
        bytes[31] = 0xFF;
        let txid = Txid::from_inner(bytes);
        let s = txid.to_string();
        assert!(s.starts_with("ff"));
        assert!(s.ends_with("01"));
        assert_eq!(Txid::from_str(&s).unwrap(), txid);
        assert_eq!(txid.serialize().unwrap(), bytes.to_vec());
    }

    #[test]
    fn wrong_length() {
        assert!(Txid::from_str("abcd").is_err());
        assert!(Wtxid::from_str("zz").is_err());
    }
}
