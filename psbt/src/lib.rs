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


//! Partially signed bitcoin transactions: BIP-174 (v0), BIP-370 (v2) and
//! taproot fields of BIP-371. Parses and serializes raw key-value maps into
//! typed global, input and output maps, validating fields required and
//! forbidden by each PSBT version.

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, unsafe_code /* , missing_docs */)]

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;

mod errors;
pub mod fields;
mod global;
mod input;
mod map;
mod output;
mod proprietary;
#[allow(clippy::module_inception)]
mod psbt;
pub mod raw;
mod structure;

pub use errors::PsbtError;
pub use fields::{KeySource, TapKeyOrigin, TapLeaf, TapLeafScript, TapScriptSigKey, TapTree, TxModifiable};
pub use global::GlobalMap;
pub use input::{InputMap, LOCKTIME_THRESHOLD};
pub use map::Map;
pub use output::OutputMap;
pub use proprietary::{MapLocation, ProprietaryKeyDescriptor, ProprietaryKeyError, ProprietaryKeyType};
pub use psbt::{Psbt, PsbtVersion};
pub use raw::{Key, KeyValue, ProprietaryKey};
pub use structure::{Fee, FeeError, InputPreviousTxo, MatchError};
