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


//! Address encodings of the standard output scripts.

use bitcoinformats_encoding::base58::{self, Base58Error};
use bitcoinformats_encoding::bech32::{self, SegwitError};
use bitcoinformats_encoding::hashes::hash160;

use crate::script_type::{check_pubkey, KeyError};
use crate::Network;

/// Errors converting between scripts and addresses
#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AddressError {
    /// {0} scripts have no address representation
    NoAddressForm(&'static str),

    /// network does not define {0} parameter
    UnsupportedByNetwork(&'static str),

    /// invalid base58 address: {0}
    #[from]
    Base58(Base58Error),

    /// invalid segwit address: {0}
    #[from]
    Segwit(SegwitError),

    /// invalid public key: {0}
    #[from]
    Key(KeyError),

    /// address does not match any known script type on the network
    Unrecognized,
}

/// Serializes address version as a minimal big-endian byte string (at least
/// one byte long).
pub fn version_to_bytes(version: u32) -> Vec<u8> {
    let bytes = version.to_be_bytes();
    let skip = bytes.iter().take(3).take_while(|byte| **byte == 0).count();
    bytes[skip..].to_vec()
}

/// Legacy P2PKH address for a compressed public key.
pub fn address_p2pkh(version: u32, pubkey: &[u8]) -> Result<String, AddressError> {
    check_pubkey(pubkey)?;
    Ok(base58::check_encode_versioned(&version_to_bytes(version), &hash160(pubkey)))
}

/// P2SH address wrapping P2WPKH output for a compressed public key.
pub fn address_p2sh_p2wpkh(version: u32, pubkey: &[u8]) -> Result<String, AddressError> {
    check_pubkey(pubkey)?;
    let mut witness = vec![0x00, 0x14];
    witness.extend(hash160(pubkey));
    Ok(base58::check_encode_versioned(&version_to_bytes(version), &hash160(witness)))
}

/// Native segwit P2WPKH address for a compressed public key.
pub fn address_p2wpkh(hrp: &str, pubkey: &[u8]) -> Result<String, AddressError> {
    check_pubkey(pubkey)?;
    Ok(bech32::encode_segwit(hrp, 0, &hash160(pubkey))?)
}

pub(crate) fn p2pkh_prefix(network: &Network) -> Result<Vec<u8>, AddressError> {
    network
        .p2pkh_version
        .map(version_to_bytes)
        .ok_or(AddressError::UnsupportedByNetwork("P2PKH version"))
}

pub(crate) fn p2sh_prefix(network: &Network) -> Result<Vec<u8>, AddressError> {
    network
        .p2sh_version
        .map(version_to_bytes)
        .ok_or(AddressError::UnsupportedByNetwork("P2SH version"))
}

pub(crate) fn hrp(network: &Network) -> Result<&'static str, AddressError> {
    network
        .bech32_hrp
        .ok_or(AddressError::UnsupportedByNetwork("bech32 human-readable part"))
}

#[cfg(test)]
mod test {
    use bitcoin::hashes::hex::FromHex;

    use super::*;

    // BIP-143 native P2WPKH example key
    const PUBKEY: &str = "025476c2e83188368da1ff3e292e7acafcdb3566bb0ad253f62fc70f07aeee6357";

    #[test]
    fn versions() {
        assert_eq!(version_to_bytes(0), vec![0]);
        assert_eq!(version_to_bytes(5), vec![5]);
        assert_eq!(version_to_bytes(0x1CB8), vec![0x1C, 0xB8]);
        assert_eq!(version_to_bytes(0x0488_B21E), vec![0x04, 0x88, 0xB2, 0x1E]);
    }

    #[test]
    fn pubkey_addresses() {
        let pubkey = Vec::<u8>::from_hex(PUBKEY).unwrap();
        let p2wpkh = address_p2wpkh("bc", &pubkey).unwrap();
        assert_eq!(p2wpkh, "bc1qr583w2swedy2acd7rung055k8t3n7udp7vyzyg");
        let p2pkh = address_p2pkh(0, &pubkey).unwrap();
        assert!(p2pkh.starts_with('1'));
        let nested = address_p2sh_p2wpkh(5, &pubkey).unwrap();
        assert!(nested.starts_with('3'));
    }

    #[test]
    fn uncompressed_keys_rejected() {
        let mut pubkey = vec![0x04];
        pubkey.extend([1u8; 64]);
        assert_eq!(
            address_p2pkh(0, &pubkey),
            Err(AddressError::Key(KeyError::Uncompressed))
        );
    }
}
