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

use std::io;

use crate::{Decode, Encode, Error};

/// Generates little-endian [`Encode`] and [`Decode`] implementations for the
/// integer types
macro_rules! impl_int_encoding {
    ($ty:ty) => {
        impl Encode for $ty {
            #[inline]
            fn consensus_encode<W: io::Write + ?Sized>(
                &self,
                writer: &mut W,
            ) -> Result<usize, io::Error> {
                let bytes = self.to_le_bytes();
                writer.write_all(&bytes)?;
                Ok(bytes.len())
            }
        }

        impl Decode for $ty {
            #[inline]
            fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
                let mut buf = [0u8; core::mem::size_of::<$ty>()];
                reader.read_exact(&mut buf)?;
                Ok(<$ty>::from_le_bytes(buf))
            }
        }
    };
}

impl_int_encoding!(u8);
impl_int_encoding!(u16);
impl_int_encoding!(u32);
impl_int_encoding!(u64);
impl_int_encoding!(i8);
impl_int_encoding!(i16);
impl_int_encoding!(i32);
impl_int_encoding!(i64);

impl Encode for bool {
    #[inline]
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        (*self as u8).consensus_encode(writer)
    }
}

impl Decode for bool {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        match u8::consensus_decode(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::invalid(format_args!("boolean value {:#04x}", other))),
        }
    }
}

impl<const LEN: usize> Encode for [u8; LEN] {
    #[inline]
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(self)?;
        Ok(LEN)
    }
}

impl<const LEN: usize> Decode for [u8; LEN] {
    #[inline]
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let mut buf = [0u8; LEN];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}
