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


use bitcoinformats_blockchain::{TxOut, Txid};

use crate::Psbt;

/// Errors happening when PSBT input information does not match the structure
/// of the transaction
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum MatchError {
    /// no `witness_utxo` and `non_witness_utxo` is provided for input {0}
    NoInputTx(usize),

    /// input {0} does not specify the spent outpoint
    NoPrevout(usize),

    /// provided `non_witness_utxo` does not match transaction {1} spent by
    /// input {0}
    NoTxidMatch(usize, Txid),

    /// transaction spent by input {0} does not have the referenced output
    UnmatchingInputNumber(usize),

    /// PSBT has less than {0} inputs
    WrongInputNo(usize),
}

/// API for accessing previous transaction output data
pub trait InputPreviousTxo {
    /// Returns [`TxOut`] spent by the input, or reports specific matching
    /// error preventing from getting the output
    fn input_previous_txo(&self, index: usize) -> Result<&TxOut, MatchError>;
}

/// Errors happening during fee computation
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum FeeError {
    /// no input source information found because of wrong or incomplete PSBT
    /// structure: {0}
    #[from]
    MatchError(MatchError),

    /// sum of inputs is less than sum of outputs
    InputsLessThanOutputs,

    /// sum of amounts exceeds the maximal value
    AmountOverflow,
}

/// Fee computing resolver
pub trait Fee {
    /// Returns fee for a transaction, or returns error reporting resolver
    /// problem or wrong transaction structure
    fn fee(&self) -> Result<u64, FeeError>;
}

impl InputPreviousTxo for Psbt {
    fn input_previous_txo(&self, index: usize) -> Result<&TxOut, MatchError> {
        let input = self.inputs.get(index).ok_or(MatchError::WrongInputNo(index))?;
        if let Some(txout) = &input.witness_utxo {
            return Ok(txout);
        }
        let tx = input
            .non_witness_utxo
            .as_ref()
            .ok_or(MatchError::NoInputTx(index))?;
        let (Some(txid), Some(vout)) = (input.previous_txid, input.output_index) else {
            return Err(MatchError::NoPrevout(index));
        };
        if tx.txid() != txid {
            return Err(MatchError::NoTxidMatch(index, txid));
        }
        tx.outputs
            .get(vout as usize)
            .ok_or(MatchError::UnmatchingInputNumber(index))
    }
}

impl Fee for Psbt {
    fn fee(&self) -> Result<u64, FeeError> {
        let mut input_sum = 0u64;
        for index in 0..self.inputs.len() {
            input_sum = input_sum
                .checked_add(self.input_previous_txo(index)?.amount)
                .ok_or(FeeError::AmountOverflow)?;
        }

        let mut output_sum = 0u64;
        for output in &self.outputs {
            output_sum = output_sum
                .checked_add(output.amount.unwrap_or_default())
                .ok_or(FeeError::AmountOverflow)?;
        }

        input_sum
            .checked_sub(output_sum)
            .ok_or(FeeError::InputsLessThanOutputs)
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    const BIP174_PSBT: &str = "cHNidP8BAHUCAAAAASaBcTce3/KF6Tet7qSze3gADAVmy7OtZGQXE8pCFxv2AAAAAAD+////AtPf9QUAAAAAGXapFNDFmQPFusKGh2DpD9UhpGZap2UgiKwA4fUFAAAAABepFDVF5uM7gyxHBQ8k0+65PJwDlIvHh7MuEwAAAQD9pQEBAAAAAAECiaPHHqtNIOA3G7ukzGmPopXJRjr6Ljl/hTPMti+VZ+UBAAAAFxYAFL4Y0VKpsBIDna89p95PUzSe7LmF/////4b4qkOnHf8USIk6UwpyN+9rRgi7st0tAXHmOuxqSJC0AQAAABcWABT+Pp7xp0XpdNkCxDVZQ6vLNL1TU/////8CAMLrCwAAAAAZdqkUhc/xCX/Z4Ai7NK9wnGIZeziXikiIrHL++E4sAAAAF6kUM5cluiHv1irHU6m80GfWx6ajnQWHAkcwRAIgJxK+IuAnDzlPVoMR3HyppolwuAJf3TskAinwf4pfOiQCIAGLONfc0xTnNMkna9b7QPZzMlvEuqFEyADS8vAtsnZcASED0uFWdJQbrUqZY3LLh+GFbTZSYG2YVi/jnF6efkE/IQUCSDBFAiEA0SuFLYXc2WHS9fSrZgZU327tzHlMDDPOXMMJ/7X85Y0CIGczio4OFyXBl/saiK9Z9R5E5CVbIBZ8hoQDHAXR8lkqASECI7cr7vCWXRC+B3jv7NYfysb3mk6haTkzgHNEZPhPKrMAAAAAAAAA";

    #[test]
    fn fee_from_non_witness_utxo() {
        let psbt = Psbt::from_str(BIP174_PSBT).unwrap();
        assert_eq!(psbt.fee(), Ok(301));
        assert_eq!(psbt.input_previous_txo(0).unwrap().amount, 200_000_000);
        assert_eq!(psbt.input_previous_txo(1), Err(MatchError::WrongInputNo(1)));
    }

    #[test]
    fn fee_errors() {
        let mut psbt = Psbt::from_str(BIP174_PSBT).unwrap();
        psbt.inputs[0].output_index = Some(5);
        assert_eq!(psbt.fee(), Err(FeeError::MatchError(MatchError::UnmatchingInputNumber(0))));

        psbt.inputs[0].output_index = Some(0);
        let txid = Txid::from_inner([1; 32]);
        psbt.inputs[0].previous_txid = Some(txid);
        assert_eq!(psbt.fee(), Err(FeeError::MatchError(MatchError::NoTxidMatch(0, txid))));

        psbt.inputs[0].non_witness_utxo = None;
        assert_eq!(psbt.fee(), Err(FeeError::MatchError(MatchError::NoInputTx(0))));

        psbt.inputs[0].witness_utxo = Some(TxOut {
            amount: 1000,
            script_pubkey: vec![],
        });
        assert_eq!(psbt.fee(), Err(FeeError::InputsLessThanOutputs));
    }
}
