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


use std::collections::{BTreeMap, BTreeSet};
use std::io;

use bitcoinformats_encoding::{Decode, Encode};

use crate::raw::{Key, KeyValue, ProprietaryKey, PSBT_PROPRIETARY_TYPE};
use crate::PsbtError;

/// Typed PSBT key-value map (global, input or output)
pub trait Map: Default {
    /// Name of the map used in error reporting
    const NAME: &'static str;

    /// Parses a field into the map. Returns `Ok(false)` if the field type is
    /// not known for this map.
    fn insert_field(&mut self, key: &Key, value: &[u8]) -> Result<bool, PsbtError>;

    /// Returns known fields of the map ordered by their types
    fn known_pairs(&self) -> Result<Vec<KeyValue>, io::Error>;

    /// Returns proprietary fields of the map
    fn proprietary(&self) -> &BTreeMap<ProprietaryKey, Vec<u8>>;

    /// Returns mutable proprietary fields of the map
    fn proprietary_mut(&mut self) -> &mut BTreeMap<ProprietaryKey, Vec<u8>>;

    /// Returns fields of unknown types, kept verbatim
    fn unknown(&self) -> &BTreeMap<Key, Vec<u8>>;

    /// Returns mutable fields of unknown types
    fn unknown_mut(&mut self) -> &mut BTreeMap<Key, Vec<u8>>;

    /// Constructs map from raw key-value pairs, rejecting duplicated keys
    fn from_pairs(pairs: &[KeyValue]) -> Result<Self, PsbtError> {
        let mut map = Self::default();
        let mut seen = BTreeSet::new();
        for KeyValue { key, value } in pairs {
            if !seen.insert(key) {
                return Err(PsbtError::DuplicateKey(key.type_value, Self::NAME));
            }
            if key.type_value == PSBT_PROPRIETARY_TYPE {
                let prop = ProprietaryKey::from_key(key)
                    .map_err(|err| PsbtError::InvalidField(key.type_value, Self::NAME, err))?;
                map.proprietary_mut().insert(prop, value.clone());
                continue;
            }
            if !map.insert_field(key, value)? {
                warn!("unknown field type {:#04x} in {} map is kept as is", key.type_value, Self::NAME);
                map.unknown_mut().insert(key.clone(), value.clone());
            }
        }
        Ok(map)
    }

    /// Returns all fields of the map: known ones, then proprietary, then
    /// unknown
    fn to_pairs(&self) -> Result<Vec<KeyValue>, io::Error> {
        let mut pairs = self.known_pairs()?;
        pairs.extend(
            self.proprietary()
                .iter()
                .map(|(key, value)| KeyValue::new(key.to_key(), value.clone())),
        );
        pairs.extend(
            self.unknown()
                .iter()
                .map(|(key, value)| KeyValue::new(key.clone(), value.clone())),
        );
        Ok(pairs)
    }
}

/// Ensures that a field has no key data
pub(crate) fn expect_unkeyed<M: Map>(key: &Key) -> Result<(), PsbtError> {
    if !key.key_data.is_empty() {
        return Err(PsbtError::KeyDataNotAllowed(key.type_value, M::NAME));
    }
    Ok(())
}

/// Ensures that a field has key data
pub(crate) fn expect_keyed<M: Map>(key: &Key) -> Result<(), PsbtError> {
    if key.key_data.is_empty() {
        return Err(PsbtError::KeyDataMissing(key.type_value, M::NAME));
    }
    Ok(())
}

/// Decodes value of an unkeyed field
pub(crate) fn unkeyed<M: Map, T: Decode>(key: &Key, value: &[u8]) -> Result<T, PsbtError> {
    expect_unkeyed::<M>(key)?;
    decode::<M, T>(key, value)
}

/// Decodes key data and value of a keyed field
pub(crate) fn keyed<M: Map, K: Decode, T: Decode>(key: &Key, value: &[u8]) -> Result<(K, T), PsbtError> {
    expect_keyed::<M>(key)?;
    Ok((decode::<M, K>(key, &key.key_data)?, decode::<M, T>(key, value)?))
}

/// Decodes data, requiring all of them to be consumed
pub(crate) fn decode<M: Map, T: Decode>(key: &Key, data: &[u8]) -> Result<T, PsbtError> {
    T::deserialize(data).map_err(|err| PsbtError::InvalidField(key.type_value, M::NAME, err))
}

/// Accumulates serialized fields of a map
#[derive(Default)]
pub(crate) struct PairsWriter(Vec<KeyValue>);

impl PairsWriter {
    pub fn new() -> Self { Self::default() }

    /// Adds unkeyed field with raw value
    pub fn raw(&mut self, type_value: u64, value: Option<&Vec<u8>>) {
        if let Some(value) = value {
            self.0.push(KeyValue::new(Key::unkeyed(type_value), value.clone()));
        }
    }

    /// Adds unkeyed field with encoded value
    pub fn value<T: Encode>(&mut self, type_value: u64, value: Option<&T>) -> Result<(), io::Error> {
        if let Some(value) = value {
            self.0.push(KeyValue::new(Key::unkeyed(type_value), value.serialize()?));
        }
        Ok(())
    }

    /// Adds keyed fields with raw key data and raw values
    pub fn raw_map<K: AsRef<[u8]>>(&mut self, type_value: u64, map: &BTreeMap<K, Vec<u8>>) {
        for (key, value) in map {
            self.0
                .push(KeyValue::new(Key::with_data(type_value, key.as_ref()), value.clone()));
        }
    }

    /// Adds keyed fields with raw key data and encoded values
    pub fn value_map<K: AsRef<[u8]>, T: Encode>(
        &mut self,
        type_value: u64,
        map: &BTreeMap<K, T>,
    ) -> Result<(), io::Error> {
        for (key, value) in map {
            self.0
                .push(KeyValue::new(Key::with_data(type_value, key.as_ref()), value.serialize()?));
        }
        Ok(())
    }

    /// Adds keyed fields with encoded key data and encoded values
    pub fn encoded_map<K: Encode, T: Encode>(
        &mut self,
        type_value: u64,
        map: &BTreeMap<K, T>,
    ) -> Result<(), io::Error> {
        for (key, value) in map {
            self.0
                .push(KeyValue::new(Key::with_data(type_value, key.serialize()?), value.serialize()?));
        }
        Ok(())
    }

    /// Adds keyed fields with encoded key data and raw values
    pub fn encoded_key_map<K: Encode>(
        &mut self,
        type_value: u64,
        map: &BTreeMap<K, Vec<u8>>,
    ) -> Result<(), io::Error> {
        for (key, value) in map {
            self.0
                .push(KeyValue::new(Key::with_data(type_value, key.serialize()?), value.clone()));
        }
        Ok(())
    }

    pub fn finish(self) -> Vec<KeyValue> { self.0 }
}
