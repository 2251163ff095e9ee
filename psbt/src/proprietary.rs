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



//! Textual notation for proprietary PSBT fields.
//!
//! A field is written as `<map>/<prefix>(<subtype>)[/<key data>][=<value>]`,
//! where `<map>` is `global`, `input:N` or `output:N`, prefix is either an
//! ASCII identifier or `0x`-prefixed hex, and key data and value are hex
//! strings. Examples: `global/DBC(5)`, `input:1/DBC(5)/8536ba03=01`,
//! `output:0/0x00ff(1)=beef`.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bitcoin::hashes::hex::{FromHex, ToHex};

use crate::map::Map;
use crate::raw::ProprietaryKey;
use crate::Psbt;

/// Errors in proprietary field notation or placement
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum ProprietaryKeyError {
    /// unknown PSBT map `{0}`; expected `global`, `input:N` or `output:N`
    MapLocation(String),

    /// invalid proprietary key type `{0}`; expected `prefix(subtype)` with
    /// ASCII or `0x`-prefixed hex prefix and decimal subtype
    KeyType(String),

    /// invalid hex data `{0}` in proprietary field
    Hex(String),

    /// proprietary field `{0}` must have form
    /// `<map>/<prefix>(<subtype>)[/<key data>][=<value>]`
    Syntax(String),

    /// PSBT has no {0} map: there are only {1} of them
    NoSuchMap(MapLocation, usize),
}

/// PSBT key-value map addressed by its position
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
pub enum MapLocation {
    /// Global map
    #[display("global")]
    Global,

    /// Map of the input with the given index
    #[display("input:{0}")]
    Input(usize),

    /// Map of the output with the given index
    #[display("output:{0}")]
    Output(usize),
}

impl FromStr for MapLocation {
    type Err = ProprietaryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ProprietaryKeyError::MapLocation(s.to_owned());
        match s.split_once(':') {
            None if s == "global" => Ok(MapLocation::Global),
            Some(("input", index)) => index.parse().map(MapLocation::Input).map_err(|_| err()),
            Some(("output", index)) => index.parse().map(MapLocation::Output).map_err(|_| err()),
            _ => Err(err()),
        }
    }
}

/// Type of a proprietary field: identifier prefix and subtype
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ProprietaryKeyType {
    /// Identifier prefix
    pub prefix: Vec<u8>,

    /// Vendor-defined subtype
    pub subtype: u64,
}

impl Display for ProprietaryKeyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let printable = !self.prefix.is_empty() &&
            !self.prefix.starts_with(b"0x") &&
            self.prefix.iter().all(|b| b.is_ascii_graphic() && !b"()/=".contains(b));
        if printable {
            // checked to be ASCII above
            f.write_str(&String::from_utf8_lossy(&self.prefix))?;
        } else {
            write!(f, "0x{}", self.prefix.to_hex())?;
        }
        write!(f, "({})", self.subtype)
    }
}

impl FromStr for ProprietaryKeyType {
    type Err = ProprietaryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ProprietaryKeyError::KeyType(s.to_owned());
        let (prefix, subtype) = s
            .strip_suffix(')')
            .and_then(|s| s.split_once('('))
            .ok_or_else(err)?;
        let prefix = match prefix.strip_prefix("0x") {
            Some(hex) => Vec::from_hex(hex).map_err(|_| err())?,
            None if prefix.is_empty() || !prefix.is_ascii() => return Err(err()),
            None => prefix.as_bytes().to_vec(),
        };
        let subtype = subtype.parse().map_err(|_| err())?;
        Ok(ProprietaryKeyType { prefix, subtype })
    }
}

/// Proprietary field together with the map it belongs to
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ProprietaryKeyDescriptor {
    /// Map containing the field
    pub location: MapLocation,

    /// Field key
    pub key: ProprietaryKey,

    /// Field value
    pub value: Vec<u8>,
}

impl ProprietaryKeyDescriptor {
    /// Returns type of the proprietary key
    pub fn key_type(&self) -> ProprietaryKeyType {
        ProprietaryKeyType {
            prefix: self.key.prefix.clone(),
            subtype: self.key.subtype,
        }
    }
}

fn parse_hex(s: &str) -> Result<Vec<u8>, ProprietaryKeyError> {
    Vec::from_hex(s).map_err(|_| ProprietaryKeyError::Hex(s.to_owned()))
}

impl FromStr for ProprietaryKeyDescriptor {
    type Err = ProprietaryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = match s.split_once('=') {
            Some((field, value)) => (field, parse_hex(value)?),
            None => (s, vec![]),
        };
        let mut parts = field.splitn(3, '/');
        let (location, key_type) = match (parts.next(), parts.next()) {
            (Some(location), Some(key_type)) => (location, key_type),
            _ => return Err(ProprietaryKeyError::Syntax(s.to_owned())),
        };
        let ProprietaryKeyType { prefix, subtype } = key_type.parse()?;
        let key_data = parts.next().map(parse_hex).transpose()?.unwrap_or_default();
        Ok(ProprietaryKeyDescriptor {
            location: location.parse()?,
            key: ProprietaryKey {
                prefix,
                subtype,
                key_data,
            },
            value,
        })
    }
}

impl Display for ProprietaryKeyDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.key_type())?;
        if !self.key.key_data.is_empty() {
            write!(f, "/{}", self.key.key_data.to_hex())?;
        }
        if !self.value.is_empty() {
            write!(f, "={}", self.value.to_hex())?;
        }
        Ok(())
    }
}

impl Psbt {
    fn proprietary_map_mut(
        &mut self,
        location: MapLocation,
    ) -> Result<&mut BTreeMap<ProprietaryKey, Vec<u8>>, ProprietaryKeyError> {
        let no_map = |count| ProprietaryKeyError::NoSuchMap(location, count);
        Ok(match location {
            MapLocation::Global => self.global.proprietary_mut(),
            MapLocation::Input(index) => {
                let count = self.inputs.len();
                self.inputs.get_mut(index).ok_or_else(|| no_map(count))?.proprietary_mut()
            }
            MapLocation::Output(index) => {
                let count = self.outputs.len();
                self.outputs.get_mut(index).ok_or_else(|| no_map(count))?.proprietary_mut()
            }
        })
    }

    /// Inserts proprietary field into the map given by the descriptor,
    /// replacing the value stored under the same key
    pub fn push_proprietary(&mut self, descriptor: &ProprietaryKeyDescriptor) -> Result<(), ProprietaryKeyError> {
        debug!("setting proprietary field {}", descriptor);
        self.proprietary_map_mut(descriptor.location)?
            .insert(descriptor.key.clone(), descriptor.value.clone());
        Ok(())
    }

    /// Lists proprietary fields of all maps
    pub fn proprietary_fields(&self) -> Vec<ProprietaryKeyDescriptor> {
        let global = self.global.proprietary().iter().map(|kv| (MapLocation::Global, kv));
        let inputs = self.inputs.iter().enumerate().flat_map(|(index, input)| {
            input.proprietary().iter().map(move |kv| (MapLocation::Input(index), kv))
        });
        let outputs = self.outputs.iter().enumerate().flat_map(|(index, output)| {
            output.proprietary().iter().map(move |kv| (MapLocation::Output(index), kv))
        });
        global
            .chain(inputs)
            .chain(outputs)
            .map(|(location, (key, value))| ProprietaryKeyDescriptor {
                location,
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }
}
