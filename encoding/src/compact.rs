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

use crate::{Decode, Encode, Error, MAX_VEC_SIZE};

/// Bitcoin compact unsigned integer (also known as `CompactSize` or
/// `VarInt`).
///
/// Encodes the value as either
/// - a single byte, if the value is smaller than `0xFD`;
/// - `0xFD` followed by `u16` if the value fits into 16 bits;
/// - `0xFE` followed by `u32` if the value fits into 32 bits;
/// - `0xFF` followed by `u64` otherwise.
///
/// All multi-byte values are little-endian. Decoding rejects values which
/// are not encoded in their shortest form.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display)]
#[display(inner)]
pub struct CompactUint(pub u64);

impl From<u64> for CompactUint {
    #[inline]
    fn from(value: u64) -> Self { CompactUint(value) }
}

impl From<usize> for CompactUint {
    #[inline]
    fn from(value: usize) -> Self { CompactUint(value as u64) }
}

impl CompactUint {
    /// Returns the number of bytes the value takes when encoded.
    pub fn len(self) -> usize {
        match self.0 {
            0..=0xFC => 1,
            0xFD..=0xFFFF => 3,
            0x1_0000..=0xFFFF_FFFF => 5,
            _ => 9,
        }
    }

    /// Decodes compact integer whose first byte was already read from the
    /// reader.
    pub fn decode_with_prefix<R: io::Read + ?Sized>(prefix: u8, reader: &mut R) -> Result<Self, Error> {
        let value = match prefix {
            0xFD => {
                let value = u16::consensus_decode(reader)? as u64;
                if value < 0xFD {
                    return Err(Error::NonCanonicalCompactUint(value));
                }
                value
            }
            0xFE => {
                let value = u32::consensus_decode(reader)? as u64;
                if value <= 0xFFFF {
                    return Err(Error::NonCanonicalCompactUint(value));
                }
                value
            }
            0xFF => {
                let value = u64::consensus_decode(reader)?;
                if value <= 0xFFFF_FFFF {
                    return Err(Error::NonCanonicalCompactUint(value));
                }
                value
            }
            small => small as u64,
        };
        Ok(CompactUint(value))
    }
}

impl Encode for CompactUint {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        match self.0 {
            value @ 0..=0xFC => (value as u8).consensus_encode(writer),
            value @ 0xFD..=0xFFFF => {
                writer.write_all(&[0xFD])?;
                Ok(1 + (value as u16).consensus_encode(writer)?)
            }
            value @ 0x1_0000..=0xFFFF_FFFF => {
                writer.write_all(&[0xFE])?;
                Ok(1 + (value as u32).consensus_encode(writer)?)
            }
            value => {
                writer.write_all(&[0xFF])?;
                Ok(1 + value.consensus_encode(writer)?)
            }
        }
    }
}

impl Decode for CompactUint {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let prefix = u8::consensus_decode(reader)?;
        CompactUint::decode_with_prefix(prefix, reader)
    }
}

/// Returns the number of bytes needed to encode `value` as a compact
/// integer.
#[inline]
pub fn compact_len(value: usize) -> usize { CompactUint::from(value).len() }

/// Writes `value` as a compact integer.
#[inline]
pub fn write_compact<W: io::Write + ?Sized>(writer: &mut W, value: usize) -> Result<usize, io::Error> {
    CompactUint::from(value).consensus_encode(writer)
}

/// Reads a compact integer used as a length or count prefix, refusing values
/// above [`MAX_VEC_SIZE`].
pub fn read_compact<R: io::Read + ?Sized>(reader: &mut R) -> Result<usize, Error> {
    let CompactUint(value) = CompactUint::consensus_decode(reader)?;
    if value > MAX_VEC_SIZE as u64 {
        return Err(Error::OversizedAllocation(value));
    }
    Ok(value as usize)
}

/// Writes bytes prefixed with their compact-encoded length.
pub fn write_var_bytes<W: io::Write + ?Sized>(writer: &mut W, data: &[u8]) -> Result<usize, io::Error> {
    let len = write_compact(writer, data.len())?;
    writer.write_all(data)?;
    Ok(len + data.len())
}

/// Reads bytes prefixed with their compact-encoded length.
pub fn read_var_bytes<R: io::Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>, Error> {
    let len = read_compact(reader)?;
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;
    Ok(data)
}

/// Writes a list of items prefixed with the compact-encoded item count.
pub fn write_list<W, T>(writer: &mut W, items: &[T]) -> Result<usize, io::Error>
where
    W: io::Write + ?Sized,
    T: Encode,
{
    let mut len = write_compact(writer, items.len())?;
    for item in items {
        len += item.consensus_encode(writer)?;
    }
    Ok(len)
}

/// Reads a list of items prefixed with the compact-encoded item count.
pub fn read_list<R, T>(reader: &mut R) -> Result<Vec<T>, Error>
where
    R: io::Read + ?Sized,
    T: Decode,
{
    let count = read_compact(reader)?;
    // items are at least one byte long, so this does not over-allocate
    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        items.push(T::consensus_decode(reader)?);
    }
    Ok(items)
}

/// Reads all the remaining data from the reader.
pub fn read_to_end<R: io::Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(data)
}

/// Reads items one after another until the data are exhausted.
///
/// Each item must be complete: data ending in the middle of an item is an
/// error.
pub fn read_greedy<T: Decode>(data: &[u8]) -> Result<Vec<T>, Error> {
    let mut cursor = io::Cursor::new(data);
    let mut items = Vec::new();
    while (cursor.position() as usize) < data.len() {
        items.push(T::consensus_decode(&mut cursor)?);
    }
    Ok(items)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compact_boundaries() {
        assert_eq!(CompactUint(0).serialize().unwrap(), vec![0x00]);
        assert_eq!(CompactUint(0xFC).serialize().unwrap(), vec![0xFC]);
        assert_eq!(CompactUint(0xFD).serialize().unwrap(), vec![0xFD, 0xFD, 0x00]);
        assert_eq!(CompactUint(0xFFFF).serialize().unwrap(), vec![0xFD, 0xFF, 0xFF]);
        assert_eq!(CompactUint(0x1_0000).serialize().unwrap(), vec![0xFE, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(CompactUint(0x1_0000_0000).serialize().unwrap(), vec![
            0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00
        ]);
        for value in [0u64, 0xFC, 0xFD, 0xFFFF, 0x1_0000, 0xFFFF_FFFF, u64::MAX] {
            let compact = CompactUint(value);
            let data = compact.serialize().unwrap();
            assert_eq!(data.len(), compact.len());
            assert_eq!(CompactUint::deserialize(&data), Ok(compact));
        }
    }

    #[test]
    fn compact_rejects_non_canonical() {
        assert_eq!(
            CompactUint::deserialize(&[0xFD, 0x05, 0x00]),
            Err(Error::NonCanonicalCompactUint(5))
        );
        assert_eq!(
            CompactUint::deserialize(&[0xFE, 0xFF, 0x00, 0x00, 0x00]),
            Err(Error::NonCanonicalCompactUint(0xFF))
        );
        assert_eq!(CompactUint::deserialize(&[0xFD, 0x05]), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn var_bytes() {
        let mut buf = vec![];
        assert_eq!(write_var_bytes(&mut buf, b"hello").unwrap(), 6);
        assert_eq!(buf, b"\x05hello");
        assert_eq!(read_var_bytes(&mut io::Cursor::new(&buf)).unwrap(), b"hello".to_vec());
        assert_eq!(read_var_bytes(&mut io::Cursor::new(b"\x05hel")), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn oversized_prefix() {
        let data = [0xFE, 0x00, 0x00, 0x00, 0x10];
        assert_eq!(
            read_var_bytes(&mut io::Cursor::new(&data[..])),
            Err(Error::OversizedAllocation(0x1000_0000))
        );
    }

    #[test]
    fn lists() {
        let mut buf = vec![];
        write_list(&mut buf, &[1u16, 2, 3]).unwrap();
        assert_eq!(buf, vec![3, 1, 0, 2, 0, 3, 0]);
        let items: Vec<u16> = read_list(&mut io::Cursor::new(&buf)).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn greedy() {
        assert_eq!(read_greedy::<u16>(&[1, 0, 2, 0]), Ok(vec![1, 2]));
        assert_eq!(read_greedy::<u16>(&[]), Ok(vec![]));
        assert_eq!(read_greedy::<u16>(&[1, 0, 2]), Err(Error::UnexpectedEnd));
    }
}
