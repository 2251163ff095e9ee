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

use bitcoinformats_blockchain::TxOut;

use crate::fields::{KeySource, TapKeyOrigin, TapTree};
use crate::map::{self, Map, PairsWriter};
use crate::raw::{Key, KeyValue, ProprietaryKey};
use crate::PsbtError;

pub const PSBT_OUT_REDEEM_SCRIPT: u64 = 0x00;
pub const PSBT_OUT_WITNESS_SCRIPT: u64 = 0x01;
pub const PSBT_OUT_BIP32_DERIVATION: u64 = 0x02;
pub const PSBT_OUT_AMOUNT: u64 = 0x03;
pub const PSBT_OUT_SCRIPT: u64 = 0x04;
pub const PSBT_OUT_TAP_INTERNAL_KEY: u64 = 0x05;
pub const PSBT_OUT_TAP_TREE: u64 = 0x06;
pub const PSBT_OUT_TAP_BIP32_DERIVATION: u64 = 0x07;

/// PSBT output map
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct OutputMap {
    /// Redeem script
    pub redeem_script: Option<Vec<u8>>,

    /// Witness script
    pub witness_script: Option<Vec<u8>>,

    /// Master fingerprints and derivation paths of public keys
    pub bip32_derivation: BTreeMap<Vec<u8>, KeySource>,

    /// Output amount in satoshis
    pub amount: Option<u64>,

    /// Output scriptPubkey
    pub script: Option<Vec<u8>>,

    /// Taproot internal key
    pub tap_internal_key: Option<[u8; 32]>,

    /// Taproot script tree
    pub tap_tree: Option<TapTree>,

    /// Origins of taproot x-only public keys
    pub tap_key_origins: BTreeMap<[u8; 32], TapKeyOrigin>,

    /// Proprietary key-value pairs
    pub proprietary: BTreeMap<ProprietaryKey, Vec<u8>>,

    /// Key-value pairs of unknown types
    pub unknown: BTreeMap<Key, Vec<u8>>,
}

impl Map for OutputMap {
    const NAME: &'static str = "output";

    fn insert_field(&mut self, key: &Key, value: &[u8]) -> Result<bool, PsbtError> {
        match key.type_value {
            PSBT_OUT_REDEEM_SCRIPT => {
                map::expect_unkeyed::<Self>(key)?;
                self.redeem_script = Some(value.to_vec());
            }
            PSBT_OUT_WITNESS_SCRIPT => {
                map::expect_unkeyed::<Self>(key)?;
                self.witness_script = Some(value.to_vec());
            }
            PSBT_OUT_BIP32_DERIVATION => {
                map::expect_keyed::<Self>(key)?;
                let source = map::decode::<Self, KeySource>(key, value)?;
                self.bip32_derivation.insert(key.key_data.clone(), source);
            }
            PSBT_OUT_AMOUNT => self.amount = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_OUT_SCRIPT => {
                map::expect_unkeyed::<Self>(key)?;
                self.script = Some(value.to_vec());
            }
            PSBT_OUT_TAP_INTERNAL_KEY => {
                self.tap_internal_key = Some(map::unkeyed::<Self, _>(key, value)?)
            }
            PSBT_OUT_TAP_TREE => self.tap_tree = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_OUT_TAP_BIP32_DERIVATION => {
                let (xonly, origin) = map::keyed::<Self, [u8; 32], TapKeyOrigin>(key, value)?;
                self.tap_key_origins.insert(xonly, origin);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn known_pairs(&self) -> Result<Vec<KeyValue>, io::Error> {
        let mut writer = PairsWriter::new();
        writer.raw(PSBT_OUT_REDEEM_SCRIPT, self.redeem_script.as_ref());
        writer.raw(PSBT_OUT_WITNESS_SCRIPT, self.witness_script.as_ref());
        writer.value_map(PSBT_OUT_BIP32_DERIVATION, &self.bip32_derivation)?;
        writer.value(PSBT_OUT_AMOUNT, self.amount.as_ref())?;
        writer.raw(PSBT_OUT_SCRIPT, self.script.as_ref());
        writer.value(PSBT_OUT_TAP_INTERNAL_KEY, self.tap_internal_key.as_ref())?;
        writer.value(PSBT_OUT_TAP_TREE, self.tap_tree.as_ref())?;
        writer.value_map(PSBT_OUT_TAP_BIP32_DERIVATION, &self.tap_key_origins)?;
        Ok(writer.finish())
    }

    fn proprietary(&self) -> &BTreeMap<ProprietaryKey, Vec<u8>> { &self.proprietary }

    fn proprietary_mut(&mut self) -> &mut BTreeMap<ProprietaryKey, Vec<u8>> { &mut self.proprietary }

    fn unknown(&self) -> &BTreeMap<Key, Vec<u8>> { &self.unknown }

    fn unknown_mut(&mut self) -> &mut BTreeMap<Key, Vec<u8>> { &mut self.unknown }
}

impl OutputMap {
    /// Fills amount and script from an output of the unsigned transaction
    pub(crate) fn fill_from_txout(&mut self, txout: &TxOut) {
        self.amount = Some(txout.amount);
        self.script = Some(txout.script_pubkey.clone());
    }

    /// Checks presence of the fields required by PSBT v2
    pub(crate) fn check_v2(&self, index: usize) -> Result<(), PsbtError> {
        if self.amount.is_none() {
            return Err(PsbtError::NoOutputField(index, "amount"));
        }
        if self.script.is_none() {
            return Err(PsbtError::NoOutputField(index, "script"));
        }
        Ok(())
    }

    /// Reconstructs unsigned transaction output, if amount and script are
    /// known
    pub fn to_txout(&self) -> Option<TxOut> {
        Some(TxOut {
            amount: self.amount?,
            script_pubkey: self.script.clone()?,
        })
    }
}

#[cfg(test)]
mod test {
    use bitcoinformats_hd::HARDENED_INDEX_BOUNDARY;

    use super::*;
    use crate::fields::TapLeaf;

    #[test]
    fn fields_roundtrip() {
        let mut output = OutputMap::default();
        output.witness_script = Some(vec![0x51]);
        output
            .bip32_derivation
            .insert(vec![0x02; 33], KeySource::new([0xAA; 4], vec![HARDENED_INDEX_BOUNDARY + 84, 0, 5]));
        output.amount = Some(50_000);
        output.script = Some(vec![0x00, 0x14, 0x01]);
        output.tap_tree = Some(TapTree {
            leaves: vec![TapLeaf {
                depth: 0,
                leaf_version: 0xC0,
                script: vec![0x51],
            }],
        });
        let pairs = output.to_pairs().unwrap();
        let types = pairs.iter().map(|pair| pair.key.type_value).collect::<Vec<_>>();
        assert_eq!(types, vec![0x01, 0x02, 0x03, 0x04, 0x06]);
        assert_eq!(pairs[2].value, 50_000u64.to_le_bytes().to_vec());
        assert_eq!(OutputMap::from_pairs(&pairs), Ok(output));
    }

    #[test]
    fn unknown_and_proprietary_are_kept() {
        let unknown = KeyValue::new(Key::with_data(0x42, vec![1, 2]), vec![3]);
        let prop = ProprietaryKey {
            prefix: b"test".to_vec(),
            subtype: 1,
            key_data: vec![],
        };
        let proprietary = KeyValue::new(prop.to_key(), vec![4]);
        let output = OutputMap::from_pairs(&[unknown.clone(), proprietary.clone()]).unwrap();
        assert_eq!(output.unknown.get(&unknown.key), Some(&vec![3]));
        assert_eq!(output.proprietary.get(&prop), Some(&vec![4]));
        assert_eq!(output.to_pairs().unwrap(), vec![proprietary, unknown]);
    }

    #[test]
    fn duplicates() {
        let pair = KeyValue::new(Key::unkeyed(PSBT_OUT_AMOUNT), vec![0; 8]);
        assert_eq!(
            OutputMap::from_pairs(&[pair.clone(), pair]),
            Err(PsbtError::DuplicateKey(PSBT_OUT_AMOUNT, "output"))
        );
    }
}
