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


//! Bitcoin script opcodes, standard output script templates and their
//! address representations for different networks.

// Coding conventions
#![recursion_limit = "256"]
#![deny(unsafe_code /* , missing_docs */)]

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

pub mod address;
mod network;
pub mod opcodes;
mod script_type;

pub use address::AddressError;
pub use network::{Chain, Network, UnknownChain};
pub use opcodes::{Opcode, PushError};
pub use script_type::{check_pubkey, KeyError, ScriptType};
