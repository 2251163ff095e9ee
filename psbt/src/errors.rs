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

use bitcoinformats_encoding as encoding;

/// Errors happening during PSBT parsing, validation and serialization
#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum PsbtError {
    /// data do not start with PSBT magic bytes
    InvalidMagic,

    /// PSBT envelope contains no key-value maps
    EmptyEnvelope,

    /// malformed PSBT data: {0}
    #[from]
    Encoding(encoding::Error),

    /// invalid PSBT base64 encoding: {0}
    #[from]
    Base64(base64::DecodeError),

    /// invalid PSBT hex encoding: {0}
    #[from]
    Hex(bitcoin::hashes::hex::Error),

    /// duplicate key of type {0} in {1} map
    DuplicateKey(u64, &'static str),

    /// field of type {0} in {1} map requires key data
    KeyDataMissing(u64, &'static str),

    /// field of type {0} in {1} map must not have key data
    KeyDataNotAllowed(u64, &'static str),

    /// invalid value of field type {0} in {1} map: {2}
    InvalidField(u64, &'static str, encoding::Error),

    /// unsupported PSBT version {0}
    UnsupportedVersion(u32),

    /// PSBT v0 does not contain an unsigned transaction
    NoUnsignedTx,

    /// PSBT v2 does not contain required global field `{0}`
    NoGlobalField(&'static str),

    /// PSBT v2 input #{0} does not contain required field `{1}`
    NoInputField(usize, &'static str),

    /// PSBT v2 output #{0} does not contain required field `{1}`
    NoOutputField(usize, &'static str),

    /// PSBT contains {actual} maps while the transaction requires {expected}
    MapCount {
        /// Number of maps required by the global input and output counts
        expected: usize,
        /// Number of maps present in the PSBT
        actual: usize,
    },

    /// PSBT v{0} contains forbidden field of type {1} in {2} map
    ForbiddenField(u32, u64, &'static str),

    /// input #{0} of the unsigned transaction has non-empty scriptSig
    UnsignedTxHasScriptSigs(usize),

    /// input #{0} of the unsigned transaction has non-empty witness
    UnsignedTxHasScriptWitnesses(usize),

    /// inputs require both time-based and height-based lock times, which
    /// can't be satisfied by a single transaction
    IncompatibleLocktimes,

    /// unable to serialize PSBT: {0}
    Serialize(String),
}

impl From<io::Error> for PsbtError {
    fn from(err: io::Error) -> Self { PsbtError::Serialize(err.to_string()) }
}
