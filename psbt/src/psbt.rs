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


use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bitcoin::hashes::hex::FromHex;
use bitcoinformats_blockchain::Transaction;

use crate::global::{GlobalMap, PSBT_GLOBAL_UNSIGNED_TX};
use crate::input::InputMap;
use crate::map::Map;
use crate::output::OutputMap;
use crate::raw::{read_envelope, write_envelope, KeyValue};
use crate::PsbtError;

/// PSBT versions supported by the library
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Default)]
pub enum PsbtVersion {
    /// Version 0 (BIP-174), carrying unsigned transaction in the global map
    #[default]
    #[display("v0")]
    V0 = 0,

    /// Version 2 (BIP-370), carrying transaction data in per-input and
    /// per-output fields
    #[display("v2")]
    V2 = 2,
}

impl PsbtVersion {
    /// Converts numeric version into a supported PSBT version
    pub fn from_u32(version: u32) -> Result<Self, PsbtError> {
        match version {
            0 => Ok(PsbtVersion::V0),
            2 => Ok(PsbtVersion::V2),
            other => Err(PsbtError::UnsupportedVersion(other)),
        }
    }

    /// Returns numeric value of the version
    #[inline]
    pub fn to_u32(self) -> u32 { self as u32 }

    fn forbidden_global(self) -> &'static [u64] {
        match self {
            PsbtVersion::V0 => &[0x02, 0x03, 0x04, 0x05, 0x06],
            PsbtVersion::V2 => &[PSBT_GLOBAL_UNSIGNED_TX],
        }
    }

    fn forbidden_input(self) -> &'static [u64] {
        match self {
            PsbtVersion::V0 => &[0x0E, 0x0F, 0x10, 0x11, 0x12],
            PsbtVersion::V2 => &[],
        }
    }

    fn forbidden_output(self) -> &'static [u64] {
        match self {
            PsbtVersion::V0 => &[0x03, 0x04],
            PsbtVersion::V2 => &[],
        }
    }
}

fn check_forbidden(
    version: PsbtVersion,
    pairs: &[KeyValue],
    forbidden: &[u64],
    map: &'static str,
) -> Result<(), PsbtError> {
    match pairs.iter().find(|pair| forbidden.contains(&pair.key.type_value)) {
        Some(pair) => Err(PsbtError::ForbiddenField(version.to_u32(), pair.key.type_value, map)),
        None => Ok(()),
    }
}

fn filter_forbidden(pairs: Vec<KeyValue>, forbidden: &[u64]) -> Vec<KeyValue> {
    pairs
        .into_iter()
        .filter(|pair| !forbidden.contains(&pair.key.type_value))
        .collect()
}

/// Partially signed bitcoin transaction of any supported version.
///
/// Independently of the version, global map always contains transaction
/// version and input and output counts, and inputs and outputs contain
/// outpoints, sequence numbers, amounts and scripts. For v0 these fields are
/// filled from the unsigned transaction and are never serialized.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Psbt {
    /// Global map
    pub global: GlobalMap,

    /// Input maps
    pub inputs: Vec<InputMap>,

    /// Output maps
    pub outputs: Vec<OutputMap>,
}

impl Psbt {
    /// Constructs v0 PSBT from an unsigned transaction. Fails if any of the
    /// inputs has a scriptSig or witness.
    pub fn from_unsigned_tx(mut tx: Transaction) -> Result<Self, PsbtError> {
        for (index, txin) in tx.inputs.iter().enumerate() {
            if !txin.script_sig.is_empty() {
                return Err(PsbtError::UnsignedTxHasScriptSigs(index));
            }
        }
        for (index, stack) in tx.witness.iter().enumerate() {
            if tx.segwit && !stack.is_empty() {
                return Err(PsbtError::UnsignedTxHasScriptWitnesses(index));
            }
        }
        tx.segwit = false;
        tx.witness = vec![];

        let mut psbt = Psbt {
            global: GlobalMap {
                unsigned_tx: Some(tx),
                ..GlobalMap::default()
            },
            inputs: vec![],
            outputs: vec![],
        };
        psbt.fill_from_unsigned_tx()?;
        debug!(
            "created PSBT v0 with {} inputs and {} outputs",
            psbt.inputs.len(),
            psbt.outputs.len()
        );
        Ok(psbt)
    }

    /// Fills v2 fields of all maps from the unsigned transaction of v0 PSBT,
    /// creating missed input and output maps
    fn fill_from_unsigned_tx(&mut self) -> Result<(), PsbtError> {
        self.global.fill_from_unsigned_tx()?;
        let tx = self.global.unsigned_tx.as_ref().ok_or(PsbtError::NoUnsignedTx)?;
        self.inputs.resize(tx.inputs.len(), InputMap::default());
        self.outputs.resize(tx.outputs.len(), OutputMap::default());
        for (input, txin) in self.inputs.iter_mut().zip(&tx.inputs) {
            input.fill_from_txin(txin);
        }
        for (output, txout) in self.outputs.iter_mut().zip(&tx.outputs) {
            output.fill_from_txout(txout);
        }
        Ok(())
    }

    /// Returns PSBT version. Absent version field means v0.
    pub fn version(&self) -> Result<PsbtVersion, PsbtError> {
        PsbtVersion::from_u32(self.global.version.unwrap_or_default())
    }

    /// Parses binary PSBT, validating required and forbidden fields for its
    /// version
    pub fn deserialize(data: &[u8]) -> Result<Self, PsbtError> {
        let maps = read_envelope(data)?;
        let (global_pairs, rest) = maps.split_first().ok_or(PsbtError::EmptyEnvelope)?;

        let mut global = GlobalMap::from_pairs(global_pairs)?;
        let version = PsbtVersion::from_u32(global.version.unwrap_or_default())?;
        match version {
            PsbtVersion::V0 => global.fill_from_unsigned_tx()?,
            PsbtVersion::V2 => global.check_v2()?,
        }
        let input_count = global.input_count.unwrap_or_default();
        let output_count = global.output_count.unwrap_or_default();
        debug!(
            "parsing PSBT {} with {} inputs and {} outputs",
            version, input_count, output_count
        );

        let expected = input_count.checked_add(output_count).and_then(|count| count.checked_add(1));
        if expected != Some(maps.len()) {
            return Err(PsbtError::MapCount {
                expected: expected.unwrap_or(usize::MAX),
                actual: maps.len(),
            });
        }
        let (input_pairs, output_pairs) = rest.split_at(input_count);

        let inputs = input_pairs
            .iter()
            .map(|pairs| InputMap::from_pairs(pairs))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = output_pairs
            .iter()
            .map(|pairs| OutputMap::from_pairs(pairs))
            .collect::<Result<Vec<_>, _>>()?;

        check_forbidden(version, global_pairs, version.forbidden_global(), GlobalMap::NAME)?;
        for pairs in input_pairs {
            check_forbidden(version, pairs, version.forbidden_input(), InputMap::NAME)?;
        }
        for pairs in output_pairs {
            check_forbidden(version, pairs, version.forbidden_output(), OutputMap::NAME)?;
        }

        let mut psbt = Psbt {
            global,
            inputs,
            outputs,
        };
        match version {
            PsbtVersion::V0 => psbt.fill_from_unsigned_tx()?,
            PsbtVersion::V2 => {
                for (index, input) in psbt.inputs.iter().enumerate() {
                    input.check_v2(index)?;
                }
                for (index, output) in psbt.outputs.iter().enumerate() {
                    output.check_v2(index)?;
                }
            }
        }
        Ok(psbt)
    }

    /// Parses hex-encoded binary PSBT
    pub fn from_hex(s: &str) -> Result<Self, PsbtError> {
        let data = Vec::<u8>::from_hex(s.trim())?;
        Psbt::deserialize(&data)
    }

    /// Serializes PSBT, omitting the fields forbidden in its version
    pub fn serialize(&self) -> Result<Vec<u8>, PsbtError> {
        let version = self.version()?;
        let mut global = self.global.clone();
        match version {
            PsbtVersion::V0 if global.unsigned_tx.is_none() => return Err(PsbtError::NoUnsignedTx),
            PsbtVersion::V0 => {}
            PsbtVersion::V2 => {
                global.input_count = Some(self.inputs.len());
                global.output_count = Some(self.outputs.len());
            }
        }

        let mut maps = Vec::with_capacity(1 + self.inputs.len() + self.outputs.len());
        maps.push(filter_forbidden(global.to_pairs()?, version.forbidden_global()));
        for input in &self.inputs {
            maps.push(filter_forbidden(input.to_pairs()?, version.forbidden_input()));
        }
        for output in &self.outputs {
            maps.push(filter_forbidden(output.to_pairs()?, version.forbidden_output()));
        }
        Ok(write_envelope(&maps)?)
    }

    /// Computes transaction lock time from the input requirements and the
    /// fallback lock time. If inputs allow both height- and time-based lock
    /// times, the height-based one is chosen.
    pub fn lock_time(&self) -> Result<u32, PsbtError> {
        let mut constrained = false;
        let mut height_allowed = true;
        let mut time_allowed = true;
        for input in &self.inputs {
            let (time, height) = (input.required_time_locktime, input.required_height_locktime);
            if time.is_none() && height.is_none() {
                continue;
            }
            constrained = true;
            height_allowed &= height.is_some();
            time_allowed &= time.is_some();
        }

        if !constrained {
            return Ok(self.global.fallback_locktime.unwrap_or_default());
        }
        let max_height = self.inputs.iter().filter_map(|input| input.required_height_locktime).max();
        let max_time = self.inputs.iter().filter_map(|input| input.required_time_locktime).max();
        match (height_allowed, time_allowed) {
            (true, _) => Ok(max_height.unwrap_or_default()),
            (false, true) => Ok(max_time.unwrap_or_default()),
            (false, false) => Err(PsbtError::IncompatibleLocktimes),
        }
    }

    /// Returns unsigned transaction: the one from the global map for v0,
    /// or the transaction reconstructed from the input and output fields for
    /// v2
    pub fn unsigned_tx(&self) -> Result<Transaction, PsbtError> {
        if self.version()? == PsbtVersion::V0 {
            return self.global.unsigned_tx.clone().ok_or(PsbtError::NoUnsignedTx);
        }
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                input
                    .to_unsigned_txin()
                    .ok_or(PsbtError::NoInputField(index, "previous_txid"))
            })
            .collect::<Result<_, _>>()?;
        let outputs = self
            .outputs
            .iter()
            .enumerate()
            .map(|(index, output)| output.to_txout().ok_or(PsbtError::NoOutputField(index, "amount")))
            .collect::<Result<_, _>>()?;
        Ok(Transaction {
            version: self.global.tx_version.ok_or(PsbtError::NoGlobalField("tx_version"))?,
            segwit: false,
            inputs,
            outputs,
            witness: vec![],
            locktime: self.lock_time()?,
        })
    }

    /// Converts PSBT to the other version
    pub fn into_version(mut self, version: PsbtVersion) -> Result<Self, PsbtError> {
        let current = self.version()?;
        if current == version {
            return Ok(self);
        }
        debug!("converting PSBT {} into {}", current, version);
        match version {
            PsbtVersion::V0 => {
                let tx = self.unsigned_tx()?;
                self.global.unsigned_tx = Some(tx);
                self.global.version = None;
                self.fill_from_unsigned_tx()?;
            }
            PsbtVersion::V2 => {
                self.fill_from_unsigned_tx()?;
                self.global.unsigned_tx = None;
                self.global.version = Some(PsbtVersion::V2.to_u32());
            }
        }
        Ok(self)
    }
}

impl Display for Psbt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let data = self.serialize().map_err(|_| fmt::Error)?;
        f.write_str(&base64::encode(data))
    }
}

impl FromStr for Psbt {
    type Err = PsbtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = base64::decode(s.trim())?;
        Psbt::deserialize(&data)
    }
}

#[cfg(test)]
mod test {
    use bitcoin::hashes::hex::ToHex;
    use bitcoinformats_blockchain::{TxIn, TxOut, Txid};

    use super::*;
    use crate::fields::TapScriptSigKey;
    use crate::raw::Key;

    const BIP174_PSBT: &str = "\
        70736274ff0100750200000001268171371edff285e937adeea4b37b78000c0566\
        cbb3ad64641713ca42171bf60000000000feffffff02d3dff505000000001976a91\
        4d0c59903c5bac2868760e90fd521a4665aa7652088ac00e1f5050000000017a914\
        3545e6e33b832c47050f24d3eeb93c9c03948bc787b32e1300000100fda50101000\
        00000010289a3c71eab4d20e0371bbba4cc698fa295c9463afa2e397f8533ccb62f\
        9567e50100000017160014be18d152a9b012039daf3da7de4f53349eecb985fffff\
        fff86f8aa43a71dff1448893a530a7237ef6b4608bbb2dd2d0171e63aec6a4890b4\
        0100000017160014fe3e9ef1a745e974d902c4355943abcb34bd5353ffffffff020\
        0c2eb0b000000001976a91485cff1097fd9e008bb34af709c62197b38978a4888ac\
        72fef84e2c00000017a914339725ba21efd62ac753a9bcd067d6c7a6a39d0587024\
        7304402202712be22e0270f394f568311dc7ca9a68970b8025fdd3b240229f07f8a\
        5f3a240220018b38d7dcd314e734c9276bd6fb40f673325bc4baa144c800d2f2f02\
        db2765c012103d2e15674941bad4a996372cb87e1856d3652606d98562fe39c5e9e\
        7e413f210502483045022100d12b852d85dcd961d2f5f4ab660654df6eedcc794c0\
        c33ce5cc309ffb5fce58d022067338a8e0e1725c197fb1a88af59f51e44e4255b20\
        167c8684031c05d1f2592a01210223b72beef0965d10be0778efecd61fcac6f79a4\
        ea169393380734464f84f2ab300000000000000";

    const PREV_TXID: &str = "f61b1742ca13176464adb3cb66050c00787bb3a4eead37e985f2df1e37718126";

    fn envelope(maps: &[Vec<KeyValue>]) -> Vec<u8> { write_envelope(maps).unwrap() }

    fn pair(type_value: u64, value: Vec<u8>) -> KeyValue { KeyValue::new(Key::unkeyed(type_value), value) }

    fn v2_maps() -> Vec<Vec<KeyValue>> {
        vec![
            vec![
                pair(0x02, 2u32.to_le_bytes().to_vec()),
                pair(0x04, vec![1]),
                pair(0x05, vec![1]),
                pair(0xFB, 2u32.to_le_bytes().to_vec()),
            ],
            vec![pair(0x0E, vec![0x11; 32]), pair(0x0F, 1u32.to_le_bytes().to_vec())],
            vec![pair(0x03, 1000u64.to_le_bytes().to_vec()), pair(0x04, vec![0x51])],
        ]
    }

    #[test]
    fn bip174_serialization() {
        let psbt = Psbt::from_hex(BIP174_PSBT).unwrap();
        assert_eq!(psbt.version(), Ok(PsbtVersion::V0));
        assert_eq!(psbt.serialize().unwrap()[..].to_hex(), BIP174_PSBT);

        let base64 = psbt.to_string();
        assert_eq!(Psbt::from_str(&base64), Ok(psbt.clone()));

        let utxo = psbt.inputs[0].non_witness_utxo.as_ref().unwrap();
        assert_eq!(utxo.txid().to_string(), PREV_TXID);
        assert!(utxo.segwit);
    }

    #[test]
    fn v0_fills_transaction_fields() {
        let psbt = Psbt::from_hex(BIP174_PSBT).unwrap();
        assert_eq!(psbt.global.tx_version, Some(2));
        assert_eq!(psbt.global.fallback_locktime, Some(1257139));
        assert_eq!(psbt.global.input_count, Some(1));
        assert_eq!(psbt.global.output_count, Some(2));
        assert_eq!(psbt.inputs[0].previous_txid, Some(Txid::from_str(PREV_TXID).unwrap()));
        assert_eq!(psbt.inputs[0].output_index, Some(0));
        assert_eq!(psbt.inputs[0].sequence, Some(0xFFFF_FFFE));
        assert_eq!(psbt.outputs[0].amount, Some(99_999_699));
        assert_eq!(psbt.outputs[1].amount, Some(100_000_000));
        assert_eq!(psbt.lock_time(), Ok(1257139));
    }

    #[test]
    fn version_conversion() {
        let v0 = Psbt::from_hex(BIP174_PSBT).unwrap();
        let tx = v0.unsigned_tx().unwrap();

        let v2 = v0.clone().into_version(PsbtVersion::V2).unwrap();
        assert_eq!(v2.global.unsigned_tx, None);
        let data = v2.serialize().unwrap();
        let parsed = Psbt::deserialize(&data).unwrap();
        assert_eq!(parsed.version(), Ok(PsbtVersion::V2));
        assert_eq!(parsed.inputs[0].non_witness_utxo, v0.inputs[0].non_witness_utxo);
        assert_eq!(parsed.unsigned_tx(), Ok(tx.clone()));
        assert_eq!(parsed.unsigned_tx().unwrap().txid(), tx.txid());

        let back = parsed.into_version(PsbtVersion::V0).unwrap();
        assert_eq!(back.serialize().unwrap()[..].to_hex(), BIP174_PSBT);
    }

    #[test]
    fn v2_parsing() {
        let psbt = Psbt::deserialize(&envelope(&v2_maps())).unwrap();
        assert_eq!(psbt.version(), Ok(PsbtVersion::V2));
        let tx = psbt.unsigned_tx().unwrap();
        assert_eq!(tx.inputs[0].prev_tx, Txid::from_inner([0x11; 32]));
        assert_eq!(tx.inputs[0].index, 1);
        assert_eq!(tx.inputs[0].sequence, u32::MAX);
        assert_eq!(tx.outputs[0].amount, 1000);
        assert_eq!(tx.locktime, 0);
        assert_eq!(psbt.serialize().unwrap(), envelope(&v2_maps()));
    }

    #[test]
    fn v2_required_fields() {
        let mut maps = v2_maps();
        maps[0].remove(0);
        assert_eq!(
            Psbt::deserialize(&envelope(&maps)),
            Err(PsbtError::NoGlobalField("tx_version"))
        );

        let mut maps = v2_maps();
        maps[1].remove(1);
        assert_eq!(
            Psbt::deserialize(&envelope(&maps)),
            Err(PsbtError::NoInputField(0, "output_index"))
        );

        let mut maps = v2_maps();
        maps[2].remove(1);
        assert_eq!(Psbt::deserialize(&envelope(&maps)), Err(PsbtError::NoOutputField(0, "script")));
    }

    #[test]
    fn forbidden_fields() {
        let tx = Transaction {
            inputs: vec![TxIn::default()],
            ..Transaction::default()
        };
        let mut legacy_tx = vec![];
        tx.encode_legacy(&mut legacy_tx).unwrap();

        let mut maps = v2_maps();
        maps[0].insert(0, pair(0x00, legacy_tx.clone()));
        assert_eq!(
            Psbt::deserialize(&envelope(&maps)),
            Err(PsbtError::ForbiddenField(2, 0x00, "global"))
        );

        let mut maps = vec![vec![pair(0x00, legacy_tx)], vec![]];
        assert!(Psbt::deserialize(&envelope(&maps)).is_ok());
        maps[1].push(pair(0x10, vec![0; 4]));
        assert_eq!(
            Psbt::deserialize(&envelope(&maps)),
            Err(PsbtError::ForbiddenField(0, 0x10, "input"))
        );
    }

    #[test]
    fn envelope_errors() {
        let maps = vec![vec![pair(0xFB, 1u32.to_le_bytes().to_vec())]];
        assert_eq!(Psbt::deserialize(&envelope(&maps)), Err(PsbtError::UnsupportedVersion(1)));

        let maps = vec![vec![]];
        assert_eq!(Psbt::deserialize(&envelope(&maps)), Err(PsbtError::NoUnsignedTx));

        let mut maps = v2_maps();
        maps.pop();
        assert_eq!(
            Psbt::deserialize(&envelope(&maps)),
            Err(PsbtError::MapCount {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(Psbt::deserialize(b"psbt\xff"), Err(PsbtError::EmptyEnvelope));
        assert!(Psbt::from_str("not base64!").is_err());
    }

    #[test]
    fn oversized_counts() {
        let maps = vec![vec![
            pair(0x02, 2u32.to_le_bytes().to_vec()),
            pair(0x04, vec![0xFF; 9]),
            pair(0x05, vec![1]),
            pair(0xFB, 2u32.to_le_bytes().to_vec()),
        ]];
        assert_eq!(
            Psbt::deserialize(&envelope(&maps)),
            Err(PsbtError::MapCount {
                expected: usize::MAX,
                actual: 1
            })
        );

        let mut maps = v2_maps();
        maps[0][1] = pair(0x04, vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        maps[0][2] = pair(0x05, vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert!(matches!(Psbt::deserialize(&envelope(&maps)), Err(PsbtError::MapCount { actual: 3, .. })));
    }

    #[test]
    fn v2_taproot_script_sigs() {
        let mut psbt = Psbt::deserialize(&envelope(&v2_maps())).unwrap();
        let sig_key = TapScriptSigKey {
            xonly_pubkey: [0x22; 32],
            leaf_hash: [0x33; 32],
        };
        psbt.inputs[0].tap_script_sigs.insert(sig_key, vec![0x44; 64]);
        psbt.inputs[0].tap_key_sig = Some(vec![0x55; 65]);

        let data = psbt.serialize().unwrap();
        let parsed = Psbt::deserialize(&data).unwrap();
        assert_eq!(parsed, psbt);
        assert_eq!(parsed.inputs[0].tap_script_sigs.get(&sig_key), Some(&vec![0x44; 64]));

        let mut key_data = vec![0x22; 32];
        key_data.extend([0x33; 32]);
        let maps = read_envelope(&data).unwrap();
        assert!(maps[1].contains(&KeyValue::new(Key::with_data(0x14, key_data), vec![0x44; 64])));
    }

    #[test]
    fn creator() {
        let tx = Transaction {
            version: 1,
            inputs: vec![TxIn {
                prev_tx: Txid::from_inner([7; 32]),
                index: 3,
                script_sig: vec![],
                sequence: 0xFFFF_FFFD,
            }],
            outputs: vec![TxOut {
                amount: 5000,
                script_pubkey: vec![0x51],
            }],
            locktime: 0,
            ..Transaction::default()
        };
        let psbt = Psbt::from_unsigned_tx(tx.clone()).unwrap();
        assert_eq!(psbt.inputs.len(), 1);
        assert_eq!(psbt.outputs[0].script, Some(vec![0x51]));
        assert_eq!(psbt.global.fallback_locktime, None);
        assert_eq!(Psbt::deserialize(&psbt.serialize().unwrap()), Ok(psbt));

        let mut signed = tx;
        signed.inputs[0].script_sig = vec![0x00];
        assert_eq!(Psbt::from_unsigned_tx(signed), Err(PsbtError::UnsignedTxHasScriptSigs(0)));
    }

    #[test]
    fn lock_time_selection() {
        let mut psbt = Psbt::deserialize(&envelope(&v2_maps())).unwrap();
        psbt.global.fallback_locktime = Some(100);
        assert_eq!(psbt.lock_time(), Ok(100));

        psbt.inputs.push(InputMap::default());
        psbt.inputs[0].required_height_locktime = Some(700_000);
        psbt.inputs[0].required_time_locktime = Some(1_600_000_000);
        psbt.inputs[1].required_time_locktime = Some(1_650_000_000);
        assert_eq!(psbt.lock_time(), Ok(1_650_000_000));

        psbt.inputs[1].required_height_locktime = Some(710_000);
        assert_eq!(psbt.lock_time(), Ok(710_000));

        psbt.inputs[0].required_time_locktime = None;
        psbt.inputs[1].required_height_locktime = None;
        assert_eq!(psbt.lock_time(), Err(PsbtError::IncompatibleLocktimes));
    }
}
