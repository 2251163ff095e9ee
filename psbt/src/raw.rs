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


//! Raw PSBT data: keys, key-value pairs, proprietary keys and the envelope
//! holding key-value maps.

use std::fmt::{self, Display, Formatter};
use std::io;

use bitcoin::hashes::hex::ToHex;
use bitcoinformats_encoding::{
    read_compact, read_to_end, read_var_bytes, write_compact, write_var_bytes, CompactUint,
    Decode, Encode, Error,
};

use crate::PsbtError;

/// Magic bytes starting each serialized PSBT
pub const PSBT_MAGIC: [u8; 5] = *b"psbt\xff";

/// Key type of proprietary fields, identical in all PSBT maps
pub const PSBT_PROPRIETARY_TYPE: u64 = 0xFC;

/// PSBT key: field type followed by optional key data
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Key {
    /// Field type
    pub type_value: u64,

    /// Key data, empty for unkeyed fields
    pub key_data: Vec<u8>,
}

impl Key {
    /// Constructs key of a field without key data
    #[inline]
    pub fn unkeyed(type_value: u64) -> Self {
        Key {
            type_value,
            key_data: vec![],
        }
    }

    /// Constructs key of a field with key data
    #[inline]
    pub fn with_data(type_value: u64, key_data: impl Into<Vec<u8>>) -> Self {
        Key {
            type_value,
            key_data: key_data.into(),
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "type: {:#x}, key: {}", self.type_value, self.key_data[..].to_hex())
    }
}

impl Encode for Key {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let type_value = CompactUint(self.type_value);
        let mut len = write_compact(writer, type_value.len() + self.key_data.len())?;
        len += type_value.consensus_encode(writer)?;
        writer.write_all(&self.key_data)?;
        Ok(len + self.key_data.len())
    }
}

impl Decode for Key {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let data = read_var_bytes(reader)?;
        Key::from_bytes(&data)
    }
}

impl Key {
    /// Parses key from its bytes, not including the length prefix
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::invalid("empty PSBT key"));
        }
        let mut cursor = io::Cursor::new(data);
        let CompactUint(type_value) = CompactUint::consensus_decode(&mut cursor)?;
        let key_data = read_to_end(&mut cursor)?;
        Ok(Key {
            type_value,
            key_data,
        })
    }
}

/// Key-value pair of a PSBT map
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// Key of the pair
    pub key: Key,

    /// Value of the pair
    pub value: Vec<u8>,
}

impl KeyValue {
    /// Constructs key-value pair
    #[inline]
    pub fn new(key: Key, value: Vec<u8>) -> Self { KeyValue { key, value } }
}

impl Encode for KeyValue {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        Ok(self.key.consensus_encode(writer)? + write_var_bytes(writer, &self.value)?)
    }
}

impl Decode for KeyValue {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        Ok(KeyValue {
            key: Key::consensus_decode(reader)?,
            value: read_var_bytes(reader)?,
        })
    }
}

/// Key of a proprietary field (type `0xFC`): identifier prefix, subtype and
/// key data
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct ProprietaryKey {
    /// Identifier prefix, usually an ASCII name of the vendor
    pub prefix: Vec<u8>,

    /// Vendor-defined field subtype
    pub subtype: u64,

    /// Additional key data
    pub key_data: Vec<u8>,
}

impl ProprietaryKey {
    /// Parses proprietary key from the key data of a raw `0xFC` key
    pub fn from_key(key: &Key) -> Result<Self, Error> {
        if key.type_value != PSBT_PROPRIETARY_TYPE {
            return Err(Error::invalid(format_args!("key type {:#x} is not proprietary", key.type_value)));
        }
        let mut cursor = io::Cursor::new(&key.key_data);
        let prefix = read_var_bytes(&mut cursor)?;
        let CompactUint(subtype) = CompactUint::consensus_decode(&mut cursor)?;
        let key_data = read_to_end(&mut cursor)?;
        Ok(ProprietaryKey {
            prefix,
            subtype,
            key_data,
        })
    }

    /// Converts proprietary key into raw `0xFC` key
    pub fn to_key(&self) -> Key {
        let mut key_data = Vec::with_capacity(self.prefix.len() + self.key_data.len() + 10);
        write_var_bytes(&mut key_data, &self.prefix).expect("in-memory writers don't error");
        CompactUint(self.subtype)
            .consensus_encode(&mut key_data)
            .expect("in-memory writers don't error");
        key_data.extend_from_slice(&self.key_data);
        Key::with_data(PSBT_PROPRIETARY_TYPE, key_data)
    }
}

impl Display for ProprietaryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.prefix) {
            Ok(prefix) => write!(f, "{}({})", prefix, self.subtype)?,
            Err(_) => write!(f, "{}({})", self.prefix[..].to_hex(), self.subtype)?,
        }
        if !self.key_data.is_empty() {
            write!(f, " {}", self.key_data[..].to_hex())?;
        }
        Ok(())
    }
}

/// Reads a single PSBT map up to and including its `0x00` separator
pub fn read_map<R: io::Read + ?Sized>(reader: &mut R) -> Result<Vec<KeyValue>, Error> {
    let mut pairs = Vec::new();
    loop {
        let key_len = read_compact(reader)?;
        if key_len == 0 {
            break;
        }
        let mut key = vec![0u8; key_len];
        reader.read_exact(&mut key)?;
        pairs.push(KeyValue {
            key: Key::from_bytes(&key)?,
            value: read_var_bytes(reader)?,
        });
    }
    Ok(pairs)
}

/// Writes PSBT map followed by the `0x00` separator
pub fn write_map<W: io::Write + ?Sized>(writer: &mut W, pairs: &[KeyValue]) -> Result<usize, io::Error> {
    let mut len = 0;
    for pair in pairs {
        len += pair.consensus_encode(writer)?;
    }
    writer.write_all(&[0x00])?;
    Ok(len + 1)
}

/// Parses PSBT envelope: magic bytes followed by key-value maps until the
/// end of data
pub fn read_envelope(data: &[u8]) -> Result<Vec<Vec<KeyValue>>, PsbtError> {
    let body = data.strip_prefix(&PSBT_MAGIC[..]).ok_or(PsbtError::InvalidMagic)?;
    let mut cursor = io::Cursor::new(body);
    let mut maps = Vec::new();
    while (cursor.position() as usize) < body.len() {
        maps.push(read_map(&mut cursor)?);
    }
    if maps.is_empty() {
        return Err(PsbtError::EmptyEnvelope);
    }
    Ok(maps)
}

/// Serializes key-value maps into PSBT envelope
pub fn write_envelope(maps: &[Vec<KeyValue>]) -> Result<Vec<u8>, io::Error> {
    let mut data = PSBT_MAGIC.to_vec();
    for map in maps {
        write_map(&mut data, map)?;
    }
    Ok(data)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_encoding() {
        let key = Key::with_data(0x06, vec![0xAA, 0xBB]);
        assert_eq!(key.serialize().unwrap(), vec![0x03, 0x06, 0xAA, 0xBB]);
        assert_eq!(Key::deserialize(&[0x03, 0x06, 0xAA, 0xBB]), Ok(key));
        assert!(Key::deserialize(&[0x00]).is_err());

        let large = Key::unkeyed(0xFD);
        let data = large.serialize().unwrap();
        assert_eq!(data, vec![0x03, 0xFD, 0xFD, 0x00]);
        assert_eq!(Key::deserialize(&data), Ok(large));
    }

    #[test]
    fn proprietary_key() {
        let prop = ProprietaryKey {
            prefix: b"DBC".to_vec(),
            subtype: 5,
            key_data: vec![0x01],
        };
        let key = prop.to_key();
        assert_eq!(key.type_value, PSBT_PROPRIETARY_TYPE);
        assert_eq!(key.key_data, vec![0x03, b'D', b'B', b'C', 0x05, 0x01]);
        assert_eq!(ProprietaryKey::from_key(&key), Ok(prop.clone()));
        assert_eq!(prop.to_string(), "DBC(5) 01");
        assert!(ProprietaryKey::from_key(&Key::unkeyed(0x01)).is_err());
    }

    #[test]
    fn envelope() {
        let maps = vec![vec![KeyValue::new(Key::unkeyed(0xFB), vec![2, 0, 0, 0])], vec![]];
        let data = write_envelope(&maps).unwrap();
        assert_eq!(data, b"psbt\xff\x01\xfb\x04\x02\x00\x00\x00\x00\x00".to_vec());
        assert_eq!(read_envelope(&data), Ok(maps));

        assert_eq!(read_envelope(b"psbt\xff"), Err(PsbtError::EmptyEnvelope));
        assert_eq!(read_envelope(b"psbu\xff\x00"), Err(PsbtError::InvalidMagic));
        assert_eq!(
            read_envelope(b"psbt\xff\x01\xfb\x04\x02\x00"),
            Err(PsbtError::Encoding(Error::UnexpectedEnd))
        );
    }
}
