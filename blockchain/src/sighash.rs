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


//! Segwit v0 signature hashes as defined by BIP-143.

use std::io::Write;

use bitcoinformats_encoding::hashes::{hash256, Hash256Writer};
use bitcoinformats_encoding::{write_var_bytes, Encode};
use bitcoinformats_scripts::ScriptType;

use crate::{Transaction, TxOut};

/// Errors computing signature hashes
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum SighashError {
    /// input index {index} is out of range for transaction with {count} inputs
    InputIndex {
        /// Requested input index
        index: usize,
        /// Number of transaction inputs
        count: usize,
    },

    /// script code can't be derived for a {0} previous output; it must be
    /// provided explicitly
    NoScriptCode(&'static str),

    /// value {0} is not a valid signature hash type
    InvalidHashType(u32),

    /// unable to serialize signature message: {0}
    Io(String),
}

impl From<std::io::Error> for SighashError {
    fn from(err: std::io::Error) -> Self { SighashError::Io(err.to_string()) }
}

/// Signature hash type, defining which parts of the transaction are
/// committed to by a signature
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
#[repr(u32)]
pub enum HashType {
    /// Sign all inputs and outputs
    #[display("SIGHASH_ALL")]
    All = 0x01,

    /// Sign all inputs and no outputs
    #[display("SIGHASH_NONE")]
    None = 0x02,

    /// Sign all inputs and the output with the same index
    #[display("SIGHASH_SINGLE")]
    Single = 0x03,

    /// Sign only this input and all outputs
    #[display("SIGHASH_ALL|SIGHASH_ANYONECANPAY")]
    AllPlusAnyoneCanPay = 0x81,

    /// Sign only this input and no outputs
    #[display("SIGHASH_NONE|SIGHASH_ANYONECANPAY")]
    NonePlusAnyoneCanPay = 0x82,

    /// Sign only this input and the output with the same index
    #[display("SIGHASH_SINGLE|SIGHASH_ANYONECANPAY")]
    SinglePlusAnyoneCanPay = 0x83,
}

impl Default for HashType {
    fn default() -> Self { HashType::All }
}

impl HashType {
    /// Flag which restricts signature to the signed input only
    pub const ANYONECANPAY: u32 = 0x80;

    /// Parses standard hash type value
    pub fn from_u32(value: u32) -> Result<Self, SighashError> {
        Ok(match value {
            0x01 => HashType::All,
            0x02 => HashType::None,
            0x03 => HashType::Single,
            0x81 => HashType::AllPlusAnyoneCanPay,
            0x82 => HashType::NonePlusAnyoneCanPay,
            0x83 => HashType::SinglePlusAnyoneCanPay,
            _ => return Err(SighashError::InvalidHashType(value)),
        })
    }

    /// Returns numeric value of the hash type
    #[inline]
    pub fn to_u32(self) -> u32 { self as u32 }

    /// Detects `SIGHASH_ANYONECANPAY` flag
    #[inline]
    pub fn anyone_can_pay(self) -> bool { self.to_u32() & Self::ANYONECANPAY != 0 }

    /// Returns hash type with `SIGHASH_ANYONECANPAY` flag removed
    pub fn base(self) -> HashType {
        match self {
            HashType::All | HashType::AllPlusAnyoneCanPay => HashType::All,
            HashType::None | HashType::NonePlusAnyoneCanPay => HashType::None,
            HashType::Single | HashType::SinglePlusAnyoneCanPay => HashType::Single,
        }
    }
}

/// BIP-143 signature message builder for a transaction, caching the
/// intermediate hashes shared by all of its inputs
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SighashPreimage<'tx> {
    tx: &'tx Transaction,

    /// Double SHA-256 of all input outpoints
    pub hash_prevouts: [u8; 32],

    /// Double SHA-256 of all input sequence numbers
    pub hash_sequence: [u8; 32],

    /// Double SHA-256 of all serialized outputs
    pub hash_outputs: [u8; 32],
}

impl<'tx> SighashPreimage<'tx> {
    /// Computes shared hashes for the transaction
    pub fn with(tx: &'tx Transaction) -> Self {
        let mut prevouts = Hash256Writer::new();
        let mut sequence = Hash256Writer::new();
        for input in &tx.inputs {
            input
                .encode_outpoint(&mut prevouts)
                .expect("hash engines don't error");
            input
                .sequence
                .consensus_encode(&mut sequence)
                .expect("hash engines don't error");
        }
        SighashPreimage {
            tx,
            hash_prevouts: prevouts.finish(),
            hash_sequence: sequence.finish(),
            hash_outputs: hash_outputs(&tx.outputs),
        }
    }

    /// Returns transaction the hashes are computed for
    #[inline]
    pub fn transaction(&self) -> &'tx Transaction { self.tx }

    /// Serializes BIP-143 signature message for the input.
    ///
    /// `script_code` is written with its compact length prefix.
    pub fn segwit_v0_preimage(
        &self,
        input_index: usize,
        script_code: &[u8],
        amount: u64,
        hash_type: HashType,
    ) -> Result<Vec<u8>, SighashError> {
        let tx = self.tx;
        let input = tx.inputs.get(input_index).ok_or(SighashError::InputIndex {
            index: input_index,
            count: tx.inputs.len(),
        })?;
        let zero = [0u8; 32];

        let hash_prevouts = if hash_type.anyone_can_pay() { zero } else { self.hash_prevouts };
        let hash_sequence = if hash_type.anyone_can_pay() || hash_type.base() != HashType::All {
            zero
        } else {
            self.hash_sequence
        };
        let hash_outputs = match (hash_type.base(), tx.outputs.get(input_index)) {
            (HashType::All, _) => self.hash_outputs,
            (HashType::Single, Some(output)) => hash_outputs(std::slice::from_ref(output)),
            _ => zero,
        };

        let mut preimage = Vec::with_capacity(156 + script_code.len());
        tx.version.consensus_encode(&mut preimage)?;
        preimage.write_all(&hash_prevouts)?;
        preimage.write_all(&hash_sequence)?;
        input.encode_outpoint(&mut preimage)?;
        write_var_bytes(&mut preimage, script_code)?;
        amount.consensus_encode(&mut preimage)?;
        input.sequence.consensus_encode(&mut preimage)?;
        preimage.write_all(&hash_outputs)?;
        tx.locktime.consensus_encode(&mut preimage)?;
        hash_type.to_u32().consensus_encode(&mut preimage)?;
        Ok(preimage)
    }

    /// Computes BIP-143 signature hash for the input spending a segwit v0
    /// output of the given amount, with explicitly provided `scriptCode`
    pub fn segwit_v0_sighash(
        &self,
        input_index: usize,
        script_code: &[u8],
        amount: u64,
        hash_type: HashType,
    ) -> Result<[u8; 32], SighashError> {
        let preimage = self.segwit_v0_preimage(input_index, script_code, amount, hash_type)?;
        trace!("BIP-143 preimage for input {}: {} bytes", input_index, preimage.len());
        Ok(hash256(preimage))
    }

    /// Computes BIP-143 signature hash for the input spending the given
    /// previous output, deriving the `scriptCode` from it.
    ///
    /// Only P2WPKH outputs allow deriving the script code; other outputs
    /// require [`SighashPreimage::segwit_v0_sighash`] with the witness
    /// script.
    pub fn bip143_digest(
        &self,
        input_index: usize,
        prevout: &TxOut,
        hash_type: HashType,
    ) -> Result<[u8; 32], SighashError> {
        let script_code = match prevout.script_type() {
            ScriptType::P2wpkh(hash) => p2wpkh_script_code(&hash),
            other => return Err(SighashError::NoScriptCode(other.name())),
        };
        self.segwit_v0_sighash(input_index, &script_code, prevout.amount, hash_type)
    }
}

fn hash_outputs(outputs: &[TxOut]) -> [u8; 32] {
    let mut engine = Hash256Writer::new();
    for output in outputs {
        output
            .consensus_encode(&mut engine)
            .expect("hash engines don't error");
    }
    engine.finish()
}

/// Returns `scriptCode` used by BIP-143 to sign spending of the given
/// segwit v0 key hash output
pub fn p2wpkh_script_code(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script_code = vec![0x76, 0xA9, 0x14];
    script_code.extend_from_slice(pubkey_hash);
    script_code.extend([0x88, 0xAC]);
    script_code
}

impl Transaction {
    /// Creates BIP-143 signature message builder for the transaction. Use it
    /// when signing several inputs, so the shared hashes are computed once.
    #[inline]
    pub fn sighash_cache(&self) -> SighashPreimage<'_> { SighashPreimage::with(self) }

    /// Computes BIP-143 signature hash for a single input.
    ///
    /// See [`SighashPreimage::segwit_v0_sighash`].
    pub fn segwit_v0_sighash(
        &self,
        input_index: usize,
        script_code: &[u8],
        amount: u64,
        hash_type: HashType,
    ) -> Result<[u8; 32], SighashError> {
        self.sighash_cache()
            .segwit_v0_sighash(input_index, script_code, amount, hash_type)
    }

    /// Computes BIP-143 signature hash for a single input spending P2WPKH
    /// output.
    ///
    /// See [`SighashPreimage::bip143_digest`].
    pub fn bip143_digest(
        &self,
        input_index: usize,
        prevout: &TxOut,
        hash_type: HashType,
    ) -> Result<[u8; 32], SighashError> {
        self.sighash_cache().bip143_digest(input_index, prevout, hash_type)
    }
}

#[cfg(test)]
mod test {
    use bitcoin::hashes::hex::{FromHex, ToHex};
    use bitcoinformats_encoding::Decode;

    use super::*;

    // BIP-143 native P2WPKH example
    const UNSIGNED_TX: &str = "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac11000000";

    fn tx() -> Transaction { Transaction::deserialize(&Vec::<u8>::from_hex(UNSIGNED_TX).unwrap()).unwrap() }

    fn prevout() -> TxOut {
        TxOut {
            amount: 600_000_000,
            script_pubkey: Vec::from_hex("00141d0f172a0ecb48aee1be1f2687d2963ae33f71a1").unwrap(),
        }
    }

    #[test]
    fn bip143_shared_hashes() {
        let tx = tx();
        let shared = SighashPreimage::with(&tx);
        assert_eq!(
            shared.hash_prevouts[..].to_hex(),
            "96b827c8483d4e9b96712b6713a7b68d6e8003a781feba36c31143470b4efd37"
        );
        assert_eq!(
            shared.hash_sequence[..].to_hex(),
            "52b0a642eea2fb7ae638c36f6252b6750293dbe574a806984b8e4d8548339a3b"
        );
        assert_eq!(
            shared.hash_outputs[..].to_hex(),
            "863ef3e1a92afbfdb97f31ad0fc7683ee943e9abcf2501590ff8f6551f47e5e5"
        );
    }

    #[test]
    fn bip143_p2wpkh() {
        let sighash = tx().bip143_digest(1, &prevout(), HashType::All).unwrap();
        assert_eq!(
            sighash[..].to_hex(),
            "c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670"
        );
    }

    #[test]
    fn errors() {
        assert_eq!(
            tx().bip143_digest(2, &prevout(), HashType::All),
            Err(SighashError::InputIndex { index: 2, count: 2 })
        );
        let p2pkh = TxOut {
            amount: 1,
            script_pubkey: p2wpkh_script_code(&[0u8; 20]),
        };
        assert_eq!(
            tx().bip143_digest(0, &p2pkh, HashType::All),
            Err(SighashError::NoScriptCode("p2pkh"))
        );
        assert_eq!(HashType::from_u32(0x84), Err(SighashError::InvalidHashType(0x84)));
    }

    #[test]
    fn cache_is_shared_between_inputs() {
        let tx = tx();
        let cache = tx.sighash_cache();
        assert_eq!(cache.transaction(), &tx);

        let script_code = p2wpkh_script_code(&[7u8; 20]);
        let first = cache
            .segwit_v0_preimage(0, &script_code, 1000, HashType::All)
            .unwrap();
        let second = cache
            .segwit_v0_preimage(1, &script_code, 1000, HashType::All)
            .unwrap();
        assert_eq!(&first[4..36], &cache.hash_prevouts[..]);
        assert_eq!(&second[4..36], &cache.hash_prevouts[..]);
        assert_eq!(&second[36..68], &cache.hash_sequence[..]);
        assert_ne!(first, second);

        assert_eq!(
            cache.bip143_digest(1, &prevout(), HashType::All),
            tx.bip143_digest(1, &prevout(), HashType::All)
        );
        assert_eq!(
            cache.segwit_v0_sighash(0, &script_code, 1000, HashType::Single),
            tx.segwit_v0_sighash(0, &script_code, 1000, HashType::Single)
        );
    }

    #[test]
    fn hash_type_flags() {
        for value in [0x01, 0x02, 0x03, 0x81, 0x82, 0x83] {
            let hash_type = HashType::from_u32(value).unwrap();
            assert_eq!(hash_type.to_u32(), value);
            assert_eq!(hash_type.anyone_can_pay(), value & 0x80 != 0);
            assert_eq!(hash_type.base().to_u32(), value & 0x1f);
        }
        assert_eq!(HashType::SinglePlusAnyoneCanPay.to_string(), "SIGHASH_SINGLE|SIGHASH_ANYONECANPAY");
    }

    #[test]
    fn hash_types_commit_differently() {
        let tx = tx();
        let script_code = p2wpkh_script_code(&[7u8; 20]);
        let sighashes = [0x01, 0x02, 0x03, 0x81, 0x82, 0x83].map(|value| {
            tx.segwit_v0_sighash(0, &script_code, 1000, HashType::from_u32(value).unwrap())
                .unwrap()
        });
        for (i, a) in sighashes.iter().enumerate() {
            for b in &sighashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
