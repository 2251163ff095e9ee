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


//! Library implementing BIP-32 hierarchical deterministic keys: master key
//! generation from seeds, private and public child derivation, extended key
//! serialization and derivation path parsing.

// Coding conventions
#![recursion_limit = "256"]
#![deny(unsafe_code /* , missing_docs */)]

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;
#[cfg(feature = "serde")]
extern crate serde_crate as serde;

mod path;
mod xkey;

pub use path::{parse_path, unparse_path, DerivationPath, PathError};
pub use xkey::{
    from_seed, ExtendedKey, ExtendedKeyData, ExtendedPrivKey, ExtendedPubKey, XkeyError,
    BIP32_SEED_SALT,
};

/// Constant determining BIP32 boundary for u32 values after which index
/// is treated as hardened
pub const HARDENED_INDEX_BOUNDARY: u32 = 1 << 31;
