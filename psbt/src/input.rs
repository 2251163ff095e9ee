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

use bitcoinformats_blockchain::{Transaction, TxIn, TxOut, Txid};
use bitcoinformats_encoding::hashes::{hash160, hash256, ripemd160, sha256};
use bitcoinformats_encoding::{read_compact, read_var_bytes, write_compact, write_var_bytes, Error};

use crate::fields::{KeySource, TapKeyOrigin, TapLeafScript, TapScriptSigKey};
use crate::map::{self, Map, PairsWriter};
use crate::raw::{Key, KeyValue, ProprietaryKey};
use crate::PsbtError;

pub const PSBT_IN_NON_WITNESS_UTXO: u64 = 0x00;
pub const PSBT_IN_WITNESS_UTXO: u64 = 0x01;
pub const PSBT_IN_PARTIAL_SIG: u64 = 0x02;
pub const PSBT_IN_SIGHASH_TYPE: u64 = 0x03;
pub const PSBT_IN_REDEEM_SCRIPT: u64 = 0x04;
pub const PSBT_IN_WITNESS_SCRIPT: u64 = 0x05;
pub const PSBT_IN_BIP32_DERIVATION: u64 = 0x06;
pub const PSBT_IN_FINAL_SCRIPTSIG: u64 = 0x07;
pub const PSBT_IN_FINAL_SCRIPTWITNESS: u64 = 0x08;
pub const PSBT_IN_POR_COMMITMENT: u64 = 0x09;
pub const PSBT_IN_RIPEMD160: u64 = 0x0A;
pub const PSBT_IN_SHA256: u64 = 0x0B;
pub const PSBT_IN_HASH160: u64 = 0x0C;
pub const PSBT_IN_HASH256: u64 = 0x0D;
pub const PSBT_IN_PREVIOUS_TXID: u64 = 0x0E;
pub const PSBT_IN_OUTPUT_INDEX: u64 = 0x0F;
pub const PSBT_IN_SEQUENCE: u64 = 0x10;
pub const PSBT_IN_REQUIRED_TIME_LOCKTIME: u64 = 0x11;
pub const PSBT_IN_REQUIRED_HEIGHT_LOCKTIME: u64 = 0x12;
pub const PSBT_IN_TAP_KEY_SIG: u64 = 0x13;
pub const PSBT_IN_TAP_SCRIPT_SIG: u64 = 0x14;
pub const PSBT_IN_TAP_LEAF_SCRIPT: u64 = 0x15;
pub const PSBT_IN_TAP_BIP32_DERIVATION: u64 = 0x16;
pub const PSBT_IN_TAP_INTERNAL_KEY: u64 = 0x17;
pub const PSBT_IN_TAP_MERKLE_ROOT: u64 = 0x18;

/// Lock time values below this threshold are block heights, the rest are
/// UNIX timestamps
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// PSBT input map
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct InputMap {
    /// Full transaction containing the spent output
    pub non_witness_utxo: Option<Transaction>,

    /// Spent output, for segwit inputs
    pub witness_utxo: Option<TxOut>,

    /// Partial signatures keyed by public keys
    pub partial_sigs: BTreeMap<Vec<u8>, Vec<u8>>,

    /// Signature hash type which must be used for signing
    pub sighash_type: Option<u32>,

    /// Redeem script
    pub redeem_script: Option<Vec<u8>>,

    /// Witness script
    pub witness_script: Option<Vec<u8>>,

    /// Master fingerprints and derivation paths of public keys
    pub bip32_derivation: BTreeMap<Vec<u8>, KeySource>,

    /// Finalized scriptSig
    pub final_script_sig: Option<Vec<u8>>,

    /// Finalized witness stack
    pub final_script_witness: Option<Vec<Vec<u8>>>,

    /// Proof-of-reserves commitment
    pub por_commitment: Option<String>,

    /// RIPEMD-160 preimages keyed by their hashes
    pub ripemd160_preimages: BTreeMap<[u8; 20], Vec<u8>>,

    /// SHA-256 preimages keyed by their hashes
    pub sha256_preimages: BTreeMap<[u8; 32], Vec<u8>>,

    /// HASH160 preimages keyed by their hashes
    pub hash160_preimages: BTreeMap<[u8; 20], Vec<u8>>,

    /// HASH256 preimages keyed by their hashes
    pub hash256_preimages: BTreeMap<[u8; 32], Vec<u8>>,

    /// Id of the transaction containing the spent output
    pub previous_txid: Option<Txid>,

    /// Index of the spent output
    pub output_index: Option<u32>,

    /// Sequence number; `0xFFFFFFFF` if absent
    pub sequence: Option<u32>,

    /// Minimal UNIX timestamp lock time required by the input
    pub required_time_locktime: Option<u32>,

    /// Minimal block height lock time required by the input
    pub required_height_locktime: Option<u32>,

    /// Taproot key-path signature
    pub tap_key_sig: Option<Vec<u8>>,

    /// Taproot script-path signatures
    pub tap_script_sigs: BTreeMap<TapScriptSigKey, Vec<u8>>,

    /// Taproot leaf scripts keyed by their control blocks
    pub tap_leaf_scripts: BTreeMap<Vec<u8>, TapLeafScript>,

    /// Origins of taproot x-only public keys
    pub tap_key_origins: BTreeMap<[u8; 32], TapKeyOrigin>,

    /// Taproot internal key
    pub tap_internal_key: Option<[u8; 32]>,

    /// Taproot script tree merkle root
    pub tap_merkle_root: Option<[u8; 32]>,

    /// Proprietary key-value pairs
    pub proprietary: BTreeMap<ProprietaryKey, Vec<u8>>,

    /// Key-value pairs of unknown types
    pub unknown: BTreeMap<Key, Vec<u8>>,
}

fn decode_witness(data: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    let mut cursor = io::Cursor::new(data);
    let count = read_compact(&mut cursor)?;
    let mut stack = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        stack.push(read_var_bytes(&mut cursor)?);
    }
    let consumed = cursor.position() as usize;
    if consumed != data.len() {
        return Err(Error::DataNotConsumed(data.len() - consumed));
    }
    Ok(stack)
}

fn encode_witness(stack: &[Vec<u8>]) -> Result<Vec<u8>, io::Error> {
    let mut data = Vec::new();
    write_compact(&mut data, stack.len())?;
    for item in stack {
        write_var_bytes(&mut data, item)?;
    }
    Ok(data)
}

fn insert_preimage<const LEN: usize>(
    key: &Key,
    value: &[u8],
    map: &mut BTreeMap<[u8; LEN], Vec<u8>>,
    hash: impl Fn(&[u8]) -> [u8; LEN],
) -> Result<(), PsbtError> {
    map::expect_keyed::<InputMap>(key)?;
    let digest = map::decode::<InputMap, [u8; LEN]>(key, &key.key_data)?;
    if hash(value) != digest {
        return Err(PsbtError::InvalidField(
            key.type_value,
            InputMap::NAME,
            Error::invalid("preimage does not match its hash"),
        ));
    }
    map.insert(digest, value.to_vec());
    Ok(())
}

fn check_locktime(key: &Key, locktime: u32, time_based: bool) -> Result<u32, PsbtError> {
    if (locktime >= LOCKTIME_THRESHOLD) != time_based {
        return Err(PsbtError::InvalidField(
            key.type_value,
            InputMap::NAME,
            Error::invalid(format_args!("lock time {} has wrong type", locktime)),
        ));
    }
    Ok(locktime)
}

impl Map for InputMap {
    const NAME: &'static str = "input";

    fn insert_field(&mut self, key: &Key, value: &[u8]) -> Result<bool, PsbtError> {
        match key.type_value {
            PSBT_IN_NON_WITNESS_UTXO => {
                self.non_witness_utxo = Some(map::unkeyed::<Self, _>(key, value)?)
            }
            PSBT_IN_WITNESS_UTXO => self.witness_utxo = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_IN_PARTIAL_SIG => {
                map::expect_keyed::<Self>(key)?;
                self.partial_sigs.insert(key.key_data.clone(), value.to_vec());
            }
            PSBT_IN_SIGHASH_TYPE => self.sighash_type = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_IN_REDEEM_SCRIPT => {
                map::expect_unkeyed::<Self>(key)?;
                self.redeem_script = Some(value.to_vec());
            }
            PSBT_IN_WITNESS_SCRIPT => {
                map::expect_unkeyed::<Self>(key)?;
                self.witness_script = Some(value.to_vec());
            }
            PSBT_IN_BIP32_DERIVATION => {
                map::expect_keyed::<Self>(key)?;
                let source = map::decode::<Self, KeySource>(key, value)?;
                self.bip32_derivation.insert(key.key_data.clone(), source);
            }
            PSBT_IN_FINAL_SCRIPTSIG => {
                map::expect_unkeyed::<Self>(key)?;
                self.final_script_sig = Some(value.to_vec());
            }
            PSBT_IN_FINAL_SCRIPTWITNESS => {
                map::expect_unkeyed::<Self>(key)?;
                let stack = decode_witness(value)
                    .map_err(|err| PsbtError::InvalidField(key.type_value, Self::NAME, err))?;
                self.final_script_witness = Some(stack);
            }
            PSBT_IN_POR_COMMITMENT => {
                map::expect_unkeyed::<Self>(key)?;
                let commitment = String::from_utf8(value.to_vec())
                    .map_err(|err| PsbtError::InvalidField(key.type_value, Self::NAME, err.into()))?;
                self.por_commitment = Some(commitment);
            }
            PSBT_IN_RIPEMD160 => {
                insert_preimage(key, value, &mut self.ripemd160_preimages, |data| ripemd160(data))?
            }
            PSBT_IN_SHA256 => insert_preimage(key, value, &mut self.sha256_preimages, |data| sha256(data))?,
            PSBT_IN_HASH160 => {
                insert_preimage(key, value, &mut self.hash160_preimages, |data| hash160(data))?
            }
            PSBT_IN_HASH256 => {
                insert_preimage(key, value, &mut self.hash256_preimages, |data| hash256(data))?
            }
            PSBT_IN_PREVIOUS_TXID => self.previous_txid = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_IN_OUTPUT_INDEX => self.output_index = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_IN_SEQUENCE => self.sequence = Some(map::unkeyed::<Self, _>(key, value)?),
            PSBT_IN_REQUIRED_TIME_LOCKTIME => {
                let locktime = map::unkeyed::<Self, u32>(key, value)?;
                self.required_time_locktime = Some(check_locktime(key, locktime, true)?);
            }
            PSBT_IN_REQUIRED_HEIGHT_LOCKTIME => {
                let locktime = map::unkeyed::<Self, u32>(key, value)?;
                self.required_height_locktime = Some(check_locktime(key, locktime, false)?);
            }
            PSBT_IN_TAP_KEY_SIG => {
                map::expect_unkeyed::<Self>(key)?;
                if value.len() != 64 && value.len() != 65 {
                    return Err(PsbtError::InvalidField(
                        key.type_value,
                        Self::NAME,
                        Error::invalid(format_args!("signature length {}", value.len())),
                    ));
                }
                self.tap_key_sig = Some(value.to_vec());
            }
            PSBT_IN_TAP_SCRIPT_SIG => {
                map::expect_keyed::<Self>(key)?;
                let sig_key = map::decode::<Self, TapScriptSigKey>(key, &key.key_data)?;
                self.tap_script_sigs.insert(sig_key, value.to_vec());
            }
            PSBT_IN_TAP_LEAF_SCRIPT => {
                map::expect_keyed::<Self>(key)?;
                let leaf = map::decode::<Self, TapLeafScript>(key, value)?;
                self.tap_leaf_scripts.insert(key.key_data.clone(), leaf);
            }
            PSBT_IN_TAP_BIP32_DERIVATION => {
                let (xonly, origin) = map::keyed::<Self, [u8; 32], TapKeyOrigin>(key, value)?;
                self.tap_key_origins.insert(xonly, origin);
            }
            PSBT_IN_TAP_INTERNAL_KEY => {
                self.tap_internal_key = Some(map::unkeyed::<Self, _>(key, value)?)
            }
            PSBT_IN_TAP_MERKLE_ROOT => self.tap_merkle_root = Some(map::unkeyed::<Self, _>(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn known_pairs(&self) -> Result<Vec<KeyValue>, io::Error> {
        let mut writer = PairsWriter::new();
        writer.value(PSBT_IN_NON_WITNESS_UTXO, self.non_witness_utxo.as_ref())?;
        writer.value(PSBT_IN_WITNESS_UTXO, self.witness_utxo.as_ref())?;
        writer.raw_map(PSBT_IN_PARTIAL_SIG, &self.partial_sigs);
        writer.value(PSBT_IN_SIGHASH_TYPE, self.sighash_type.as_ref())?;
        writer.raw(PSBT_IN_REDEEM_SCRIPT, self.redeem_script.as_ref());
        writer.raw(PSBT_IN_WITNESS_SCRIPT, self.witness_script.as_ref());
        writer.value_map(PSBT_IN_BIP32_DERIVATION, &self.bip32_derivation)?;
        writer.raw(PSBT_IN_FINAL_SCRIPTSIG, self.final_script_sig.as_ref());
        if let Some(stack) = &self.final_script_witness {
            writer.raw(PSBT_IN_FINAL_SCRIPTWITNESS, Some(&encode_witness(stack)?));
        }
        if let Some(commitment) = &self.por_commitment {
            writer.raw(PSBT_IN_POR_COMMITMENT, Some(&commitment.as_bytes().to_vec()));
        }
        writer.raw_map(PSBT_IN_RIPEMD160, &self.ripemd160_preimages);
        writer.raw_map(PSBT_IN_SHA256, &self.sha256_preimages);
        writer.raw_map(PSBT_IN_HASH160, &self.hash160_preimages);
        writer.raw_map(PSBT_IN_HASH256, &self.hash256_preimages);
        writer.value(PSBT_IN_PREVIOUS_TXID, self.previous_txid.as_ref())?;
        writer.value(PSBT_IN_OUTPUT_INDEX, self.output_index.as_ref())?;
        writer.value(PSBT_IN_SEQUENCE, self.sequence.as_ref())?;
        writer.value(PSBT_IN_REQUIRED_TIME_LOCKTIME, self.required_time_locktime.as_ref())?;
        writer.value(PSBT_IN_REQUIRED_HEIGHT_LOCKTIME, self.required_height_locktime.as_ref())?;
        writer.raw(PSBT_IN_TAP_KEY_SIG, self.tap_key_sig.as_ref());
        writer.encoded_key_map(PSBT_IN_TAP_SCRIPT_SIG, &self.tap_script_sigs)?;
        writer.value_map(PSBT_IN_TAP_LEAF_SCRIPT, &self.tap_leaf_scripts)?;
        writer.value_map(PSBT_IN_TAP_BIP32_DERIVATION, &self.tap_key_origins)?;
        writer.value(PSBT_IN_TAP_INTERNAL_KEY, self.tap_internal_key.as_ref())?;
        writer.value(PSBT_IN_TAP_MERKLE_ROOT, self.tap_merkle_root.as_ref())?;
        Ok(writer.finish())
    }

    fn proprietary(&self) -> &BTreeMap<ProprietaryKey, Vec<u8>> { &self.proprietary }

    fn proprietary_mut(&mut self) -> &mut BTreeMap<ProprietaryKey, Vec<u8>> { &mut self.proprietary }

    fn unknown(&self) -> &BTreeMap<Key, Vec<u8>> { &self.unknown }

    fn unknown_mut(&mut self) -> &mut BTreeMap<Key, Vec<u8>> { &mut self.unknown }
}

impl InputMap {
    /// Fills outpoint and sequence from an input of the unsigned
    /// transaction
    pub(crate) fn fill_from_txin(&mut self, txin: &TxIn) {
        self.previous_txid = Some(txin.prev_tx);
        self.output_index = Some(txin.index);
        self.sequence = Some(txin.sequence);
    }

    /// Checks presence of the fields required by PSBT v2
    pub(crate) fn check_v2(&self, index: usize) -> Result<(), PsbtError> {
        if self.previous_txid.is_none() {
            return Err(PsbtError::NoInputField(index, "previous_txid"));
        }
        if self.output_index.is_none() {
            return Err(PsbtError::NoInputField(index, "output_index"));
        }
        Ok(())
    }

    /// Reconstructs unsigned transaction input, if the outpoint is known
    pub fn to_unsigned_txin(&self) -> Option<TxIn> {
        Some(TxIn {
            prev_tx: self.previous_txid?,
            index: self.output_index?,
            script_sig: vec![],
            sequence: self.sequence.unwrap_or(u32::MAX),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn preimages_are_checked() {
        let preimage = b"secret".to_vec();
        let pair = KeyValue::new(Key::with_data(PSBT_IN_SHA256, sha256(&preimage).to_vec()), preimage.clone());
        let input = InputMap::from_pairs(&[pair]).unwrap();
        assert_eq!(input.sha256_preimages.get(&sha256(&preimage)), Some(&preimage));

        let wrong = KeyValue::new(Key::with_data(PSBT_IN_HASH160, vec![0u8; 20]), preimage);
        assert!(matches!(
            InputMap::from_pairs(&[wrong]),
            Err(PsbtError::InvalidField(PSBT_IN_HASH160, "input", _))
        ));
    }

    #[test]
    fn keyed_and_unkeyed() {
        let unkeyed_with_data = KeyValue::new(Key::with_data(PSBT_IN_SEQUENCE, vec![1]), vec![0; 4]);
        assert_eq!(
            InputMap::from_pairs(&[unkeyed_with_data]),
            Err(PsbtError::KeyDataNotAllowed(PSBT_IN_SEQUENCE, "input"))
        );
        let keyed_without_data = KeyValue::new(Key::unkeyed(PSBT_IN_PARTIAL_SIG), vec![0x30]);
        assert_eq!(
            InputMap::from_pairs(&[keyed_without_data]),
            Err(PsbtError::KeyDataMissing(PSBT_IN_PARTIAL_SIG, "input"))
        );
    }

    #[test]
    fn locktimes() {
        let height = KeyValue::new(
            Key::unkeyed(PSBT_IN_REQUIRED_HEIGHT_LOCKTIME),
            LOCKTIME_THRESHOLD.to_le_bytes().to_vec(),
        );
        assert!(InputMap::from_pairs(&[height]).is_err());
        let time = KeyValue::new(
            Key::unkeyed(PSBT_IN_REQUIRED_TIME_LOCKTIME),
            LOCKTIME_THRESHOLD.to_le_bytes().to_vec(),
        );
        let input = InputMap::from_pairs(&[time]).unwrap();
        assert_eq!(input.required_time_locktime, Some(LOCKTIME_THRESHOLD));
    }

    #[test]
    fn witness_stack() {
        let value = vec![0x02, 0x01, 0xAA, 0x00];
        let pair = KeyValue::new(Key::unkeyed(PSBT_IN_FINAL_SCRIPTWITNESS), value.clone());
        let input = InputMap::from_pairs(&[pair.clone()]).unwrap();
        assert_eq!(input.final_script_witness, Some(vec![vec![0xAA], vec![]]));
        assert_eq!(input.to_pairs().unwrap(), vec![pair]);
    }

    #[test]
    fn taproot_fields() {
        let sig_key = TapScriptSigKey {
            xonly_pubkey: [1u8; 32],
            leaf_hash: [2u8; 32],
        };
        let mut input = InputMap::default();
        input.tap_key_sig = Some(vec![0x5A; 64]);
        input.tap_script_sigs.insert(sig_key, vec![0x5B; 65]);
        input.tap_internal_key = Some([3u8; 32]);
        input.tap_merkle_root = Some([4u8; 32]);
        let pairs = input.to_pairs().unwrap();
        let types = pairs.iter().map(|pair| pair.key.type_value).collect::<Vec<_>>();
        assert_eq!(types, vec![0x13, 0x14, 0x17, 0x18]);
        assert_eq!(pairs[1].key.key_data.len(), 64);
        assert_eq!(InputMap::from_pairs(&pairs), Ok(input));

        let short_sig = KeyValue::new(Key::unkeyed(PSBT_IN_TAP_KEY_SIG), vec![0; 63]);
        assert!(InputMap::from_pairs(&[short_sig]).is_err());
    }
}
