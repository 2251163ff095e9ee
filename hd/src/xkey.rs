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
use std::io;
use std::str::FromStr;

use bitcoinformats_encoding::base58::{self, Base58Error};
use bitcoinformats_encoding::hashes::{hash160, hmac_sha512};
use bitcoinformats_encoding::{Decode, Encode};
use bitcoinformats_scripts::Network;
use secp256k1::{PublicKey, Scalar, SecretKey, SECP256K1};

use crate::HARDENED_INDEX_BOUNDARY;

/// HMAC key used to generate master keys from seeds
pub const BIP32_SEED_SALT: &[u8] = b"Bitcoin seed";

/// Errors in extended key construction, derivation and serialization
#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum XkeyError {
    /// invalid base58 encoding of an extended key: {0}
    #[from]
    Base58(Base58Error),

    /// extended key data must be 78 bytes long, not {0}
    InvalidLength(usize),

    /// extended key data contains invalid public key
    InvalidPublicKey,

    /// extended key data contains invalid private key
    InvalidPrivateKey,

    /// extended private key was provided where public key is expected
    UnexpectedPrivate,

    /// extended public key was provided where private key is expected
    UnexpectedPublic,

    /// public derivation is impossible for hardened index {0}
    HardenedPublicDerivation(u32),

    /// derivation at index {0} results in an invalid key
    InvalidChild(u32),

    /// seed results in an invalid master key
    InvalidMasterKey,

    /// maximum derivation depth of 255 exceeded
    DepthOverflow,

    /// network does not define {0} version
    UnsupportedNetwork(&'static str),
}

/// Serialized form of a BIP-32 extended key (both public and private), as it
/// is encoded in base58check strings and PSBT global fields.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ExtendedKeyData {
    /// Version magic defining network and key type
    pub version: u32,

    /// Derivation depth, zero for master keys
    pub depth: u8,

    /// First four bytes of the parent key identifier
    pub parent_fingerprint: [u8; 4],

    /// Index of this key in its parent
    pub child_number: u32,

    /// Chain code
    pub chain_code: [u8; 32],

    /// Compressed public key, or a zero byte followed by private key
    pub key: [u8; 33],
}

impl ExtendedKeyData {
    /// Length of serialized extended key data
    pub const LEN: usize = 78;

    /// Parses extended key data from its 78-byte serialization
    pub fn from_bytes(data: &[u8]) -> Result<Self, XkeyError> {
        if data.len() != Self::LEN {
            return Err(XkeyError::InvalidLength(data.len()));
        }
        Self::deserialize(data).map_err(|_| XkeyError::InvalidLength(data.len()))
    }

    /// Serializes extended key data into 78 bytes
    pub fn to_bytes(&self) -> [u8; 78] {
        let mut data = [0u8; 78];
        data[..4].copy_from_slice(&self.version.to_be_bytes());
        data[4] = self.depth;
        data[5..9].copy_from_slice(&self.parent_fingerprint);
        data[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        data[13..45].copy_from_slice(&self.chain_code);
        data[45..].copy_from_slice(&self.key);
        data
    }

    /// Decodes base58check-encoded extended key
    pub fn decode(s: &str) -> Result<Self, XkeyError> {
        let data = base58::check_decode_len(s, Self::LEN)?;
        Self::from_bytes(&data)
    }

    /// Encodes extended key in base58check
    pub fn encode(&self) -> String { base58::check_encode(&self.to_bytes()) }

    /// Detects whether the data contain a private key
    #[inline]
    pub fn is_private(&self) -> bool { self.key[0] == 0 }

    /// Converts data into an extended key, private or public depending on
    /// the key bytes
    pub fn into_key(self) -> Result<ExtendedKey, XkeyError> {
        if self.is_private() {
            ExtendedPrivKey::from_data(&self).map(ExtendedKey::Private)
        } else {
            ExtendedPubKey::from_data(&self).map(ExtendedKey::Public)
        }
    }
}

impl Encode for ExtendedKeyData {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        writer.write_all(&self.to_bytes())?;
        Ok(Self::LEN)
    }
}

impl Decode for ExtendedKeyData {
    fn consensus_decode<R: io::Read + ?Sized>(
        reader: &mut R,
    ) -> Result<Self, bitcoinformats_encoding::Error> {
        Ok(ExtendedKeyData {
            version: u32::from_be_bytes(<[u8; 4]>::consensus_decode(reader)?),
            depth: u8::consensus_decode(reader)?,
            parent_fingerprint: <[u8; 4]>::consensus_decode(reader)?,
            child_number: u32::from_be_bytes(<[u8; 4]>::consensus_decode(reader)?),
            chain_code: <[u8; 32]>::consensus_decode(reader)?,
            key: <[u8; 33]>::consensus_decode(reader)?,
        })
    }
}

impl Display for ExtendedKeyData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.encode()) }
}

impl FromStr for ExtendedKeyData {
    type Err = XkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::decode(s) }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ExtendedKeyData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ExtendedKeyData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        ExtendedKeyData::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Computes BIP-32 child key material `I = HMAC-SHA512(chain_code, data)`,
/// returning tweak scalar and child chain code
fn child_material(chain_code: &[u8; 32], data: &[u8], index: u32) -> Result<(Scalar, [u8; 32]), XkeyError> {
    let i = hmac_sha512(chain_code, data);
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&i[..32]);
    right.copy_from_slice(&i[32..]);
    let tweak = Scalar::from_be_bytes(left).map_err(|_| XkeyError::InvalidChild(index))?;
    Ok((tweak, right))
}

/// BIP-32 extended public key
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ExtendedPubKey {
    /// Derivation depth, zero for master keys
    pub depth: u8,

    /// First four bytes of the parent key identifier
    pub parent_fingerprint: [u8; 4],

    /// Index of this key in its parent
    pub child_number: u32,

    /// Chain code
    pub chain_code: [u8; 32],

    /// Public key
    pub public_key: PublicKey,
}

impl ExtendedPubKey {
    /// Derives non-hardened public child key
    pub fn public_child(&self, index: u32) -> Result<Self, XkeyError> {
        if index >= HARDENED_INDEX_BOUNDARY {
            return Err(XkeyError::HardenedPublicDerivation(index));
        }
        let pubkey = self.public_key.serialize();
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&pubkey);
        data.extend(index.to_be_bytes());
        let (tweak, chain_code) = child_material(&self.chain_code, &data, index)?;
        let public_key = self
            .public_key
            .add_exp_tweak(SECP256K1, &tweak)
            .map_err(|_| XkeyError::InvalidChild(index))?;
        trace!("derived public child {} at depth {}", index, self.depth as u16 + 1);
        Ok(ExtendedPubKey {
            depth: self.depth.checked_add(1).ok_or(XkeyError::DepthOverflow)?,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            public_key,
        })
    }

    /// Derives public key for the path, which must not contain hardened
    /// indexes
    pub fn derive(&self, path: &[u32]) -> Result<Self, XkeyError> {
        path.iter()
            .try_fold(*self, |xpub, index| xpub.public_child(*index))
    }

    /// Returns key identifier: `HASH160` of the compressed public key
    pub fn identifier(&self) -> [u8; 20] { hash160(self.public_key.serialize()) }

    /// Returns the first four bytes of the key identifier
    pub fn fingerprint(&self) -> [u8; 4] {
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&self.identifier()[..4]);
        fingerprint
    }

    /// Serializes the key with the given version magic
    pub fn to_data(&self, version: u32) -> ExtendedKeyData {
        ExtendedKeyData {
            version,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            key: self.public_key.serialize(),
        }
    }

    /// Constructs the key from serialized data, which must contain a public
    /// key
    pub fn from_data(data: &ExtendedKeyData) -> Result<Self, XkeyError> {
        if data.is_private() {
            return Err(XkeyError::UnexpectedPrivate);
        }
        Ok(ExtendedPubKey {
            depth: data.depth,
            parent_fingerprint: data.parent_fingerprint,
            child_number: data.child_number,
            chain_code: data.chain_code,
            public_key: PublicKey::from_slice(&data.key).map_err(|_| XkeyError::InvalidPublicKey)?,
        })
    }

    /// Encodes the key in base58check using the network `xpub` version
    pub fn to_string_with(&self, network: &Network) -> Result<String, XkeyError> {
        let version = network
            .xpub_version
            .ok_or(XkeyError::UnsupportedNetwork("extended public key"))?;
        Ok(self.to_data(version).encode())
    }
}

impl Display for ExtendedPubKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let version = Network::BITCOIN.xpub_version.unwrap_or_default();
        f.write_str(&self.to_data(version).encode())
    }
}

impl FromStr for ExtendedPubKey {
    type Err = XkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_data(&ExtendedKeyData::decode(s)?) }
}

/// BIP-32 extended private key
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ExtendedPrivKey {
    /// Derivation depth, zero for master keys
    pub depth: u8,

    /// First four bytes of the parent key identifier
    pub parent_fingerprint: [u8; 4],

    /// Index of this key in its parent
    pub child_number: u32,

    /// Chain code
    pub chain_code: [u8; 32],

    /// Private key
    pub private_key: SecretKey,
}

impl ExtendedPrivKey {
    /// Generates master key from a seed using the given HMAC key
    /// ([`BIP32_SEED_SALT`] for bitcoin)
    pub fn master_key(seed: &[u8], salt: &[u8]) -> Result<Self, XkeyError> {
        let i = hmac_sha512(salt, seed);
        let private_key = SecretKey::from_slice(&i[..32]).map_err(|_| XkeyError::InvalidMasterKey)?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(ExtendedPrivKey {
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            private_key,
        })
    }

    /// Generates master key from a seed with the standard bitcoin salt
    pub fn new_master(seed: &[u8]) -> Result<Self, XkeyError> { Self::master_key(seed, BIP32_SEED_SALT) }

    /// Returns public key matching the private key
    pub fn public_key(&self) -> PublicKey { PublicKey::from_secret_key(SECP256K1, &self.private_key) }

    /// Derives child key, hardened or normal
    pub fn private_child(&self, index: u32) -> Result<Self, XkeyError> {
        let mut data = Vec::with_capacity(37);
        if index >= HARDENED_INDEX_BOUNDARY {
            data.push(0u8);
            data.extend_from_slice(&self.private_key.secret_bytes());
        } else {
            data.extend_from_slice(&self.public_key().serialize());
        }
        data.extend(index.to_be_bytes());
        let (tweak, chain_code) = child_material(&self.chain_code, &data, index)?;
        let private_key = self
            .private_key
            .add_tweak(&tweak)
            .map_err(|_| XkeyError::InvalidChild(index))?;
        trace!("derived private child {} at depth {}", index, self.depth as u16 + 1);
        Ok(ExtendedPrivKey {
            depth: self.depth.checked_add(1).ok_or(XkeyError::DepthOverflow)?,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            private_key,
        })
    }

    /// Derives private key for the path
    pub fn derive(&self, path: &[u32]) -> Result<Self, XkeyError> {
        path.iter()
            .try_fold(*self, |xprv, index| xprv.private_child(*index))
    }

    /// Returns extended public key matching this extended private key
    pub fn extended_public_key(&self) -> ExtendedPubKey {
        ExtendedPubKey {
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            public_key: self.public_key(),
        }
    }

    /// Returns key identifier: `HASH160` of the compressed public key
    pub fn identifier(&self) -> [u8; 20] { hash160(self.public_key().serialize()) }

    /// Returns the first four bytes of the key identifier
    pub fn fingerprint(&self) -> [u8; 4] { self.extended_public_key().fingerprint() }

    /// Serializes the key with the given version magic
    pub fn to_data(&self, version: u32) -> ExtendedKeyData {
        let mut key = [0u8; 33];
        key[1..].copy_from_slice(&self.private_key.secret_bytes());
        ExtendedKeyData {
            version,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            key,
        }
    }

    /// Constructs the key from serialized data, which must contain a private
    /// key
    pub fn from_data(data: &ExtendedKeyData) -> Result<Self, XkeyError> {
        if !data.is_private() {
            return Err(XkeyError::UnexpectedPublic);
        }
        Ok(ExtendedPrivKey {
            depth: data.depth,
            parent_fingerprint: data.parent_fingerprint,
            child_number: data.child_number,
            chain_code: data.chain_code,
            private_key: SecretKey::from_slice(&data.key[1..])
                .map_err(|_| XkeyError::InvalidPrivateKey)?,
        })
    }

    /// Encodes the key in base58check using the network `xprv` version
    pub fn to_string_with(&self, network: &Network) -> Result<String, XkeyError> {
        let version = network
            .xprv_version
            .ok_or(XkeyError::UnsupportedNetwork("extended private key"))?;
        Ok(self.to_data(version).encode())
    }
}

impl Display for ExtendedPrivKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let version = Network::BITCOIN.xprv_version.unwrap_or_default();
        f.write_str(&self.to_data(version).encode())
    }
}

impl FromStr for ExtendedPrivKey {
    type Err = XkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_data(&ExtendedKeyData::decode(s)?) }
}

/// Extended key of either kind, as found in an arbitrary extended key string
#[derive(Copy, Clone, PartialEq, Eq, Debug, From)]
pub enum ExtendedKey {
    /// Extended public key
    #[from]
    Public(ExtendedPubKey),

    /// Extended private key
    #[from]
    Private(ExtendedPrivKey),
}

impl ExtendedKey {
    /// Decodes base58check extended key string of any kind and network
    pub fn decode(s: &str) -> Result<Self, XkeyError> { ExtendedKeyData::decode(s)?.into_key() }

    /// Returns extended public key, neutering private key if necessary
    pub fn extended_public_key(&self) -> ExtendedPubKey {
        match self {
            ExtendedKey::Public(xpub) => *xpub,
            ExtendedKey::Private(xprv) => xprv.extended_public_key(),
        }
    }

    /// Derives child key for the path; hardened indexes require a private
    /// key
    pub fn derive(&self, path: &[u32]) -> Result<Self, XkeyError> {
        Ok(match self {
            ExtendedKey::Public(xpub) => ExtendedKey::Public(xpub.derive(path)?),
            ExtendedKey::Private(xprv) => ExtendedKey::Private(xprv.derive(path)?),
        })
    }

    /// Detects whether this is a private key
    pub fn is_private(&self) -> bool { matches!(self, ExtendedKey::Private(_)) }
}

impl FromStr for ExtendedKey {
    type Err = XkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::decode(s) }
}

/// Derives extended private key from a seed and derivation path
pub fn from_seed(seed: &[u8], path: &[u32], salt: &[u8]) -> Result<ExtendedPrivKey, XkeyError> {
    ExtendedPrivKey::master_key(seed, salt)?.derive(path)
}
