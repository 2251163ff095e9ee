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

use bitcoinformats_encoding::hashes::Hash256Writer;
use bitcoinformats_encoding::{
    read_compact, read_var_bytes, write_compact, write_list, write_var_bytes, CompactUint, Decode,
    Encode, Error, MAX_VEC_SIZE,
};
use bitcoinformats_scripts::ScriptType;
#[cfg(feature = "serde")]
use serde_with::{hex::Hex, As};

use crate::{Txid, Wtxid};

/// Errors in transaction structure
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum TxError {
    /// segwit transaction has {witnesses} witness stacks for {inputs} inputs
    WitnessCount {
        /// Number of transaction inputs
        inputs: usize,
        /// Number of witness stacks
        witnesses: usize,
    },

    /// segwit marker is followed by unsupported flag {0}
    SegwitFlag(u8),
}

/// Transaction input
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct TxIn {
    /// Transaction containing the spent output
    pub prev_tx: Txid,

    /// Index of the spent output
    pub index: u32,

    /// Unlocking script
    #[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))]
    pub script_sig: Vec<u8>,

    /// Sequence number
    pub sequence: u32,
}

impl TxIn {
    /// Writes outpoint (previous transaction id and output index) of the
    /// input
    pub fn encode_outpoint<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        Ok(self.prev_tx.consensus_encode(writer)? + self.index.consensus_encode(writer)?)
    }
}

impl Encode for TxIn {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = self.encode_outpoint(writer)?;
        len += write_var_bytes(writer, &self.script_sig)?;
        len += self.sequence.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decode for TxIn {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        Ok(TxIn {
            prev_tx: Txid::consensus_decode(reader)?,
            index: u32::consensus_decode(reader)?,
            script_sig: read_var_bytes(reader)?,
            sequence: u32::consensus_decode(reader)?,
        })
    }
}

/// Transaction output
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct TxOut {
    /// Amount in satoshis
    pub amount: u64,

    /// Locking script
    #[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))]
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    /// Classifies the locking script of the output
    pub fn script_type(&self) -> ScriptType { ScriptType::from_script_pubkey(&self.script_pubkey) }
}

impl Encode for TxOut {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        Ok(self.amount.consensus_encode(writer)? + write_var_bytes(writer, &self.script_pubkey)?)
    }
}

impl Decode for TxOut {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        Ok(TxOut {
            amount: u64::consensus_decode(reader)?,
            script_pubkey: read_var_bytes(reader)?,
        })
    }
}

/// Bitcoin transaction.
///
/// Segwit transactions carry a `00 01` marker and flag after the version
/// and one witness stack per input before the lock time. A legacy
/// transaction without inputs is indistinguishable from the segwit marker
/// and can't be decoded.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Transaction {
    /// Transaction version
    pub version: u32,

    /// Whether the transaction is serialized with witness data
    pub segwit: bool,

    /// Transaction inputs
    pub inputs: Vec<TxIn>,

    /// Transaction outputs
    pub outputs: Vec<TxOut>,

    /// Witness stacks, one per input; ignored unless `segwit` is set
    #[cfg_attr(feature = "serde", serde(with = "As::<Vec<Vec<Hex>>>"))]
    pub witness: Vec<Vec<Vec<u8>>>,

    /// Lock time
    pub locktime: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Transaction {
            version: 2,
            segwit: false,
            inputs: vec![],
            outputs: vec![],
            witness: vec![],
            locktime: 0,
        }
    }
}

impl Transaction {
    /// Checks that a segwit transaction has a witness stack for each input
    pub fn check(&self) -> Result<(), TxError> {
        if self.segwit && self.witness.len() != self.inputs.len() {
            return Err(TxError::WitnessCount {
                inputs: self.inputs.len(),
                witnesses: self.witness.len(),
            });
        }
        Ok(())
    }

    /// Detects whether any of the inputs has witness data
    pub fn has_witness(&self) -> bool {
        self.segwit && self.witness.iter().any(|stack| !stack.is_empty())
    }

    fn encode_with<W: io::Write + ?Sized>(&self, writer: &mut W, segwit: bool) -> Result<usize, io::Error> {
        let mut len = self.version.consensus_encode(writer)?;
        if segwit {
            self.check()
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
            writer.write_all(&[0x00, 0x01])?;
            len += 2;
        }
        len += write_list(writer, &self.inputs)?;
        len += write_list(writer, &self.outputs)?;
        if segwit {
            for stack in &self.witness {
                len += write_compact(writer, stack.len())?;
                for item in stack {
                    len += write_var_bytes(writer, item)?;
                }
            }
        }
        len += self.locktime.consensus_encode(writer)?;
        Ok(len)
    }

    /// Writes transaction without the segwit marker and witness data
    pub fn encode_legacy<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.encode_with(writer, false)
    }

    /// Computes transaction id, which does not commit to witness data
    pub fn txid(&self) -> Txid {
        let mut engine = Hash256Writer::new();
        self.encode_legacy(&mut engine)
            .expect("legacy encoding into hash engine never fails");
        Txid::from_inner(engine.finish())
    }

    /// Computes witness transaction id, equal to the transaction id for
    /// non-segwit transactions
    pub fn wtxid(&self) -> Result<Wtxid, TxError> {
        self.check()?;
        let mut engine = Hash256Writer::new();
        self.encode_with(&mut engine, self.segwit)
            .expect("consistent transaction encoding into hash engine never fails");
        Ok(Wtxid::from_inner(engine.finish()))
    }

    /// Computes transaction weight in weight units
    pub fn weight(&self) -> Result<usize, TxError> {
        self.check()?;
        let base = self
            .encode_legacy(&mut io::sink())
            .expect("encoding into sink never fails");
        let total = self
            .encode_with(&mut io::sink(), self.segwit)
            .expect("consistent transaction encoding into sink never fails");
        Ok(base * 3 + total)
    }

    /// Computes virtual transaction size in vbytes
    pub fn vsize(&self) -> Result<usize, TxError> { Ok((self.weight()? + 3) / 4) }
}

impl Encode for Transaction {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.encode_with(writer, self.segwit)
    }
}

impl Decode for Transaction {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let version = u32::consensus_decode(reader)?;

        let prefix = u8::consensus_decode(reader)?;
        let (segwit, input_count) = if prefix == 0x00 {
            let flag = u8::consensus_decode(reader)?;
            if flag != 0x01 {
                return Err(Error::invalid(TxError::SegwitFlag(flag)));
            }
            (true, read_compact(reader)?)
        } else {
            let CompactUint(count) = CompactUint::decode_with_prefix(prefix, reader)?;
            if count > MAX_VEC_SIZE as u64 {
                return Err(Error::OversizedAllocation(count));
            }
            (false, count as usize)
        };

        let inputs = (0..input_count)
            .map(|_| TxIn::consensus_decode(reader))
            .collect::<Result<Vec<_>, _>>()?;
        let output_count = read_compact(reader)?;
        let outputs = (0..output_count)
            .map(|_| TxOut::consensus_decode(reader))
            .collect::<Result<Vec<_>, _>>()?;

        let mut witness = Vec::with_capacity(if segwit { inputs.len() } else { 0 });
        if segwit {
            for _ in 0..inputs.len() {
                let count = read_compact(reader)?;
                let stack = (0..count)
                    .map(|_| read_var_bytes(reader))
                    .collect::<Result<Vec<_>, _>>()?;
                witness.push(stack);
            }
        }

        let locktime = u32::consensus_decode(reader)?;
        trace!(
            "decoded transaction with {} inputs and {} outputs (segwit: {})",
            inputs.len(),
            outputs.len(),
            segwit
        );

        Ok(Transaction {
            version,
            segwit,
            inputs,
            outputs,
            witness,
            locktime,
        })
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use bitcoin::hashes::hex::{FromHex, ToHex};

    use super::*;

    // BIP-143 native P2WPKH example, unsigned
    const BIP143_UNSIGNED: &str = "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac11000000";

    // Genesis block coinbase transaction
    const GENESIS_COINBASE: &str = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

    #[test]
    fn genesis_txid() {
        let data = Vec::<u8>::from_hex(GENESIS_COINBASE).unwrap();
        let tx = Transaction::deserialize(&data).unwrap();
        assert!(!tx.segwit);
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs[0].amount, 50_0000_0000);
        assert_eq!(
            tx.txid(),
            Txid::from_str("4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b").unwrap()
        );
        assert_eq!(tx.wtxid().unwrap().into_inner(), tx.txid().into_inner());
        assert_eq!(tx.serialize().unwrap(), data);
    }

    #[test]
    fn unsigned_bip143_tx() {
        let data = Vec::<u8>::from_hex(BIP143_UNSIGNED).unwrap();
        let tx = Transaction::deserialize(&data).unwrap();
        assert_eq!(tx.version, 1);
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.inputs[0].sequence, 0xffff_ffee);
        assert_eq!(tx.inputs[1].index, 1);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].amount, 112_340_000);
        assert_eq!(tx.locktime, 17);
        assert!(matches!(tx.outputs[1].script_type(), ScriptType::P2pkh(_)));
        assert_eq!(tx.serialize().unwrap()[..].to_hex(), BIP143_UNSIGNED);
    }

    #[test]
    fn segwit_roundtrip() {
        let data = Vec::<u8>::from_hex(BIP143_UNSIGNED).unwrap();
        let mut tx = Transaction::deserialize(&data).unwrap();
        let txid = tx.txid();
        tx.segwit = true;
        tx.witness = vec![vec![], vec![vec![0x30; 71], vec![0x02; 33]]];

        let encoded = tx.serialize().unwrap();
        assert_eq!(&encoded[4..6], &[0x00, 0x01]);
        let decoded = Transaction::deserialize(&encoded).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.txid(), txid);
        assert_ne!(decoded.wtxid().unwrap().into_inner(), txid.into_inner());
        assert_eq!(tx.weight().unwrap(), data.len() * 3 + encoded.len());
    }

    #[test]
    fn witness_count_mismatch() {
        let data = Vec::<u8>::from_hex(BIP143_UNSIGNED).unwrap();
        let mut tx = Transaction::deserialize(&data).unwrap();
        tx.segwit = true;
        tx.witness = vec![vec![]];
        let err = TxError::WitnessCount {
            inputs: 2,
            witnesses: 1,
        };
        assert_eq!(tx.check(), Err(err.clone()));
        assert_eq!(tx.wtxid(), Err(err));
        assert!(tx.serialize().is_err());
        // txid ignores witness data
        assert_eq!(tx.txid(), Transaction::deserialize(&data).unwrap().txid());
    }

    #[test]
    fn malformed() {
        let mut data = Vec::<u8>::from_hex(BIP143_UNSIGNED).unwrap();
        data.push(0x00);
        assert_eq!(Transaction::deserialize(&data), Err(Error::DataNotConsumed(1)));

        let data = Vec::<u8>::from_hex("010000000002").unwrap();
        assert!(matches!(Transaction::deserialize(&data), Err(Error::InvalidValue(_))));

        let data = Vec::<u8>::from_hex(&BIP143_UNSIGNED[..100]).unwrap();
        assert_eq!(Transaction::deserialize(&data), Err(Error::UnexpectedEnd));
    }
}
