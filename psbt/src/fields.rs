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


//! Structured values and keys of PSBT fields.

use std::fmt::{self, Display, Formatter};
use std::io;

use bitcoin::hashes::hex::ToHex;
use bitcoinformats_encoding::{
    read_greedy, read_list, read_to_end, read_var_bytes, write_list, write_var_bytes, Decode,
    Encode, Error,
};
use bitcoinformats_hd::DerivationPath;

/// Master key fingerprint and derivation path of a key
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct KeySource {
    /// Fingerprint of the master key
    pub fingerprint: [u8; 4],

    /// Derivation path from the master key
    pub path: DerivationPath,
}

impl KeySource {
    /// Constructs key source from master fingerprint and derivation path
    pub fn new(fingerprint: [u8; 4], path: impl Into<DerivationPath>) -> Self {
        KeySource {
            fingerprint,
            path: path.into(),
        }
    }
}

impl Display for KeySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.fingerprint[..].to_hex())?;
        Display::fmt(&self.path, f)
    }
}

impl Encode for KeySource {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = self.fingerprint.consensus_encode(writer)?;
        for index in &self.path {
            len += index.consensus_encode(writer)?;
        }
        Ok(len)
    }
}

/// Key source takes all the remaining data, since the path is not
/// length-prefixed
impl Decode for KeySource {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let fingerprint = <[u8; 4]>::consensus_decode(reader)?;
        let path = read_greedy::<u32>(&read_to_end(reader)?)?;
        Ok(KeySource {
            fingerprint,
            path: path.into(),
        })
    }
}

/// Flags of `PSBT_GLOBAL_TX_MODIFIABLE` field
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct TxModifiable(u8);

impl TxModifiable {
    /// Inputs can be added or removed
    pub const INPUTS: u8 = 0x01;

    /// Outputs can be added or removed
    pub const OUTPUTS: u8 = 0x02;

    /// Transaction has a `SIGHASH_SINGLE` signature, so inputs and outputs
    /// must be added in pairs
    pub const SIGHASH_SINGLE: u8 = 0x04;

    /// Constructs flags from individual properties
    pub fn new(inputs_modifiable: bool, outputs_modifiable: bool, has_sighash_single: bool) -> Self {
        let mut bits = 0;
        if inputs_modifiable {
            bits |= Self::INPUTS;
        }
        if outputs_modifiable {
            bits |= Self::OUTPUTS;
        }
        if has_sighash_single {
            bits |= Self::SIGHASH_SINGLE;
        }
        TxModifiable(bits)
    }

    /// Constructs flags from the raw byte, keeping reserved bits
    #[inline]
    pub fn from_bits(bits: u8) -> Self { TxModifiable(bits) }

    /// Returns raw flag byte
    #[inline]
    pub fn bits(self) -> u8 { self.0 }

    /// Whether inputs can be added or removed
    #[inline]
    pub fn inputs_modifiable(self) -> bool { self.0 & Self::INPUTS != 0 }

    /// Whether outputs can be added or removed
    #[inline]
    pub fn outputs_modifiable(self) -> bool { self.0 & Self::OUTPUTS != 0 }

    /// Whether the transaction has a `SIGHASH_SINGLE` signature
    #[inline]
    pub fn has_sighash_single(self) -> bool { self.0 & Self::SIGHASH_SINGLE != 0 }
}

impl Encode for TxModifiable {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.0.consensus_encode(writer)
    }
}

impl Decode for TxModifiable {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        u8::consensus_decode(reader).map(TxModifiable)
    }
}

/// Key of a taproot script-path signature: x-only public key and hash of
/// the leaf the signature is made for
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct TapScriptSigKey {
    /// X-only public key
    pub xonly_pubkey: [u8; 32],

    /// Tapleaf hash
    pub leaf_hash: [u8; 32],
}

impl Encode for TapScriptSigKey {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        Ok(self.xonly_pubkey.consensus_encode(writer)? + self.leaf_hash.consensus_encode(writer)?)
    }
}

impl Decode for TapScriptSigKey {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        Ok(TapScriptSigKey {
            xonly_pubkey: Decode::consensus_decode(reader)?,
            leaf_hash: Decode::consensus_decode(reader)?,
        })
    }
}

/// Taproot leaf script with its leaf version
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct TapLeafScript {
    /// Leaf script
    pub script: Vec<u8>,

    /// Leaf version, `0xC0` for tapscript
    pub leaf_version: u8,
}

/// Leaf version goes after the script and the script is not length-prefixed,
/// so the value takes all the remaining data
impl Encode for TapLeafScript {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(&self.script)?;
        Ok(self.script.len() + self.leaf_version.consensus_encode(writer)?)
    }
}

impl Decode for TapLeafScript {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let mut script = read_to_end(reader)?;
        let leaf_version = script.pop().ok_or(Error::UnexpectedEnd)?;
        Ok(TapLeafScript {
            script,
            leaf_version,
        })
    }
}

/// Taproot key origin: hashes of the leaves using the key and the key
/// source
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct TapKeyOrigin {
    /// Hashes of the leaves the key is used in
    pub leaf_hashes: Vec<[u8; 32]>,

    /// Master key fingerprint and derivation path
    pub source: KeySource,
}

impl Encode for TapKeyOrigin {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        Ok(write_list(writer, &self.leaf_hashes)? + self.source.consensus_encode(writer)?)
    }
}

impl Decode for TapKeyOrigin {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        Ok(TapKeyOrigin {
            leaf_hashes: read_list(reader)?,
            source: KeySource::consensus_decode(reader)?,
        })
    }
}

/// Single leaf of a taproot script tree in depth-first order
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct TapLeaf {
    /// Depth of the leaf in the tree
    pub depth: u8,

    /// Leaf version
    pub leaf_version: u8,

    /// Leaf script
    pub script: Vec<u8>,
}

impl Encode for TapLeaf {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let len = self.depth.consensus_encode(writer)? + self.leaf_version.consensus_encode(writer)?;
        Ok(len + write_var_bytes(writer, &self.script)?)
    }
}

impl Decode for TapLeaf {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        Ok(TapLeaf {
            depth: u8::consensus_decode(reader)?,
            leaf_version: u8::consensus_decode(reader)?,
            script: read_var_bytes(reader)?,
        })
    }
}

/// Taproot script tree as a list of leaves with their depths
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct TapTree {
    /// Tree leaves in depth-first order
    pub leaves: Vec<TapLeaf>,
}

/// Leaves follow each other without a count prefix up to the end of data
impl Encode for TapTree {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = 0;
        for leaf in &self.leaves {
            len += leaf.consensus_encode(writer)?;
        }
        Ok(len)
    }
}

impl Decode for TapTree {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        let leaves = read_greedy(&read_to_end(reader)?)?;
        Ok(TapTree { leaves })
    }
}
