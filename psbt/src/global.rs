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


use std::collections::BTreeMap;
use std::io;

use bitcoinformats_blockchain::Transaction;
use bitcoinformats_encoding::CompactUint;
use bitcoinformats_hd::ExtendedKeyData;

use crate::fields::{KeySource, TxModifiable};
use crate::map::{self, Map, PairsWriter};
use crate::raw::{Key, KeyValue, ProprietaryKey};
use crate::PsbtError;

pub const PSBT_GLOBAL_UNSIGNED_TX: u64 = 0x00;
pub const PSBT_GLOBAL_XPUB: u64 = 0x01;
pub const PSBT_GLOBAL_TX_VERSION: u64 = 0x02;
pub const PSBT_GLOBAL_FALLBACK_LOCKTIME: u64 = 0x03;
pub const PSBT_GLOBAL_INPUT_COUNT: u64 = 0x04;
pub const PSBT_GLOBAL_OUTPUT_COUNT: u64 = 0x05;
pub const PSBT_GLOBAL_TX_MODIFIABLE: u64 = 0x06;
pub const PSBT_GLOBAL_VERSION: u64 = 0xFB;

/// Global PSBT map
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct GlobalMap {
    /// Unsigned transaction in the non-witness serialization (v0 only)
    pub unsigned_tx: Option<Transaction>,

    /// Extended public keys with their master fingerprints and derivation
    /// paths
    pub xpub: BTreeMap<ExtendedKeyData, KeySource>,

    /// Transaction version (v2; filled from the unsigned transaction in v0)
    pub tx_version: Option<u32>,

    /// Lock time used if none of the inputs specifies a required lock time
    pub fallback_locktime: Option<u32>,

    /// Number of inputs
    pub input_count: Option<usize>,

    /// Number of outputs
    pub output_count: Option<usize>,

    /// Flags telling which parts of the transaction can be modified
    pub tx_modifiable: Option<TxModifiable>,

    /// PSBT version; absent for v0
    pub version: Option<u32>,

    /// Global proprietary key-value pairs
    pub proprietary: BTreeMap<ProprietaryKey, Vec<u8>>,

    /// Global key-value pairs of unknown types
    pub unknown: BTreeMap<Key, Vec<u8>>,
}

impl Map for GlobalMap {
    const NAME: &'static str = "global";

    fn insert_field(&mut self, key: &Key, value: &[u8]) -> Result<bool, PsbtError> {
        match key.type_value {
            PSBT_GLOBAL_UNSIGNED_TX => {
                self.unsigned_tx = Some(map::unkeyed::<Self, _>(key, value)?)
            }
            PSBT_GLOBAL_XPUB => {
                let (xpub, source) = map::keyed::<Self, ExtendedKeyData, KeySource>(key, value)?;
                self.xpub.insert(xpub, source);
            }
            PSBT_GLOBAL_TX_VERSION => self.tx_version = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_GLOBAL_FALLBACK_LOCKTIME => {
                self.fallback_locktime = Some(map::unkeyed::<Self, _>(key, value)?)
            }
            PSBT_GLOBAL_INPUT_COUNT => {
                let CompactUint(count) = map::unkeyed::<Self, _>(key, value)?;
                self.input_count = Some(usize::try_from(count).unwrap_or(usize::MAX))
            }
            PSBT_GLOBAL_OUTPUT_COUNT => {
                let CompactUint(count) = map::unkeyed::<Self, _>(key, value)?;
                self.output_count = Some(usize::try_from(count).unwrap_or(usize::MAX))
            }
            PSBT_GLOBAL_TX_MODIFIABLE => {
                self.tx_modifiable = Some(map::unkeyed::<Self, _>(key, value)?)
            }
            PSBT_GLOBAL_VERSION => self.version = Some(map::unkeyed::<Self, _>(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn known_pairs(&self) -> Result<Vec<KeyValue>, io::Error> {
        let mut writer = PairsWriter::new();
        if let Some(tx) = &self.unsigned_tx {
            let mut data = Vec::new();
            tx.encode_legacy(&mut data)?;
            writer.raw(PSBT_GLOBAL_UNSIGNED_TX, Some(&data));
        }
        writer.encoded_map(PSBT_GLOBAL_XPUB, &self.xpub)?;
        writer.value(PSBT_GLOBAL_TX_VERSION, self.tx_version.as_ref())?;
        writer.value(PSBT_GLOBAL_FALLBACK_LOCKTIME, self.fallback_locktime.as_ref())?;
        writer.value(PSBT_GLOBAL_INPUT_COUNT, self.input_count.map(CompactUint::from).as_ref())?;
        writer.value(PSBT_GLOBAL_OUTPUT_COUNT, self.output_count.map(CompactUint::from).as_ref())?;
        writer.value(PSBT_GLOBAL_TX_MODIFIABLE, self.tx_modifiable.as_ref())?;
        writer.value(PSBT_GLOBAL_VERSION, self.version.as_ref())?;
        Ok(writer.finish())
    }

    fn proprietary(&self) -> &BTreeMap<ProprietaryKey, Vec<u8>> { &self.proprietary }

    fn proprietary_mut(&mut self) -> &mut BTreeMap<ProprietaryKey, Vec<u8>> { &mut self.proprietary }

    fn unknown(&self) -> &BTreeMap<Key, Vec<u8>> { &self.unknown }

    fn unknown_mut(&mut self) -> &mut BTreeMap<Key, Vec<u8>> { &mut self.unknown }
}

impl GlobalMap {
    /// Fills transaction-level fields from the unsigned transaction of a v0
    /// PSBT
    pub(crate) fn fill_from_unsigned_tx(&mut self) -> Result<(), PsbtError> {
        let tx = self.unsigned_tx.as_ref().ok_or(PsbtError::NoUnsignedTx)?;
        self.tx_version = Some(tx.version);
        self.fallback_locktime = match tx.locktime {
            0 => None,
            locktime => Some(locktime),
        };
        self.input_count = Some(tx.inputs.len());
        self.output_count = Some(tx.outputs.len());
        Ok(())
    }

    /// Checks presence of the fields required by PSBT v2
    pub(crate) fn check_v2(&self) -> Result<(), PsbtError> {
        if self.tx_version.is_none() {
            return Err(PsbtError::NoGlobalField("tx_version"));
        }
        if self.input_count.is_none() {
            return Err(PsbtError::NoGlobalField("input_count"));
        }
        if self.output_count.is_none() {
            return Err(PsbtError::NoGlobalField("output_count"));
        }
        Ok(())
    }
}
