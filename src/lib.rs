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

//! Bitcoin binary formats: consensus encoding of transactions, partially
//! signed transactions (BIP-174 and BIP-370), BIP-32 extended keys, script
//! templates and addresses.

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, missing_docs, warnings)]

pub extern crate bitcoinformats_blockchain as blockchain;
pub extern crate bitcoinformats_encoding as encoding;
pub extern crate bitcoinformats_hd as hd;
pub extern crate bitcoinformats_psbt as psbt;
pub extern crate bitcoinformats_scripts as scripts;

pub mod address {
    //! Conversions between output scripts and addresses.
    pub use scripts::address::*;
    pub use scripts::{AddressError, ScriptType};
}
pub mod opcodes {
    //! Script opcodes, data pushes and disassembly.
    pub use scripts::opcodes::*;
}

pub use blockchain::{Transaction, TxIn, TxOut, Txid, Wtxid};
pub use encoding::{Decode, Encode};
pub use hd::{DerivationPath, ExtendedKey, ExtendedPrivKey, ExtendedPubKey};
pub use psbt::{Psbt, PsbtVersion};
pub use scripts::{Chain, Network};
