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


//! Standard output script templates.

use std::fmt::{self, Display, Formatter};

use bitcoin::hashes::hex::ToHex;
use bitcoinformats_encoding::hashes::{hash160, sha256};
use bitcoinformats_encoding::{base58, bech32};
#[cfg(feature = "serde")]
use serde_with::{hex::Hex, As};

use crate::address::{self, AddressError};
use crate::opcodes::{build_op_push, extract_op_push, Opcode, PushError};
use crate::Network;

/// Errors in public keys used to construct scripts
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum KeyError {
    /// uncompressed public keys are not supported
    Uncompressed,

    /// public key must be 33 bytes long, while {0} bytes were provided
    InvalidLength(usize),
}

/// Checks that the public key is given in its compressed 33-byte form.
pub fn check_pubkey(pubkey: &[u8]) -> Result<(), KeyError> {
    match pubkey.first() {
        Some(0x04) => Err(KeyError::Uncompressed),
        _ if pubkey.len() != 33 => Err(KeyError::InvalidLength(pubkey.len())),
        _ => Ok(()),
    }
}

/// Output script (`scriptPubkey`) classified by its standard template.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
pub enum ScriptType {
    /// Pay to a compressed public key
    P2pk(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; 33]),

    /// Pay to public key hash
    P2pkh(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; 20]),

    /// Pay to script hash
    P2sh(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; 20]),

    /// Pay to witness public key hash (segwit v0)
    P2wpkh(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; 20]),

    /// Pay to witness script hash (segwit v0)
    P2wsh(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; 32]),

    /// Pay to taproot output key (segwit v1)
    P2tr(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; 32]),

    /// Provably unspendable output carrying a single data push
    OpReturn(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] Vec<u8>),

    /// Any other script, kept verbatim
    Unknown(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] Vec<u8>),
}

impl ScriptType {
    /// Constructs P2PK script for a compressed public key
    pub fn p2pk(pubkey: &[u8]) -> Result<Self, KeyError> {
        check_pubkey(pubkey)?;
        let mut key = [0u8; 33];
        key.copy_from_slice(pubkey);
        Ok(ScriptType::P2pk(key))
    }

    /// Constructs P2PKH script for a compressed public key
    pub fn p2pkh_from_pubkey(pubkey: &[u8]) -> Result<Self, KeyError> {
        check_pubkey(pubkey)?;
        Ok(ScriptType::P2pkh(hash160(pubkey)))
    }

    /// Constructs P2SH script committing to the redeem script
    pub fn p2sh_from_script(redeem_script: &[u8]) -> Self { ScriptType::P2sh(hash160(redeem_script)) }

    /// Constructs P2SH-wrapped P2WPKH script for a compressed public key
    pub fn p2sh_p2wpkh_from_pubkey(pubkey: &[u8]) -> Result<Self, KeyError> {
        let witness_program = ScriptType::p2wpkh_from_pubkey(pubkey)?;
        Ok(ScriptType::P2sh(hash160(witness_program.fixed_script_pubkey())))
    }

    /// Constructs P2WPKH script for a compressed public key
    pub fn p2wpkh_from_pubkey(pubkey: &[u8]) -> Result<Self, KeyError> {
        check_pubkey(pubkey)?;
        Ok(ScriptType::P2wpkh(hash160(pubkey)))
    }

    /// Constructs P2WSH script committing to the witness script
    pub fn p2wsh_from_witness_script(witness_script: &[u8]) -> Self {
        ScriptType::P2wsh(sha256(witness_script))
    }

    /// Returns lowercase name of the script template
    pub fn name(&self) -> &'static str {
        match self {
            ScriptType::P2pk(_) => "p2pk",
            ScriptType::P2pkh(_) => "p2pkh",
            ScriptType::P2sh(_) => "p2sh",
            ScriptType::P2wpkh(_) => "p2wpkh",
            ScriptType::P2wsh(_) => "p2wsh",
            ScriptType::P2tr(_) => "p2tr",
            ScriptType::OpReturn(_) => "op_return",
            ScriptType::Unknown(_) => "unknown",
        }
    }

    /// Returns witness version for native segwit outputs
    pub fn witness_version(&self) -> Option<u8> {
        match self {
            ScriptType::P2wpkh(_) | ScriptType::P2wsh(_) => Some(0),
            ScriptType::P2tr(_) => Some(1),
            _ => None,
        }
    }

    /// Serializes all the templates with fixed-size payloads
    fn fixed_script_pubkey(&self) -> Vec<u8> {
        let mut script = Vec::with_capacity(35);
        match self {
            ScriptType::P2pk(pubkey) => {
                script.push(33);
                script.extend_from_slice(pubkey);
                script.push(Opcode::OP_CHECKSIG.0);
            }
            ScriptType::P2pkh(hash) => {
                script.extend([Opcode::OP_DUP.0, Opcode::OP_HASH160.0, 20]);
                script.extend_from_slice(hash);
                script.extend([Opcode::OP_EQUALVERIFY.0, Opcode::OP_CHECKSIG.0]);
            }
            ScriptType::P2sh(hash) => {
                script.extend([Opcode::OP_HASH160.0, 20]);
                script.extend_from_slice(hash);
                script.push(Opcode::OP_EQUAL.0);
            }
            ScriptType::P2wpkh(hash) => {
                script.extend([Opcode::OP_0.0, 20]);
                script.extend_from_slice(hash);
            }
            ScriptType::P2wsh(hash) => {
                script.extend([Opcode::OP_0.0, 32]);
                script.extend_from_slice(hash);
            }
            ScriptType::P2tr(key) => {
                script.extend([Opcode::OP_1.0, 32]);
                script.extend_from_slice(key);
            }
            ScriptType::OpReturn(_) | ScriptType::Unknown(_) => {}
        }
        script
    }

    /// Serializes the script into its `scriptPubkey` form.
    ///
    /// Fails only for `OP_RETURN` payloads which can't be pushed.
    pub fn to_script_pubkey(&self) -> Result<Vec<u8>, PushError> {
        Ok(match self {
            ScriptType::OpReturn(data) => {
                let mut script = vec![Opcode::OP_RETURN.0];
                script.extend(build_op_push(data)?);
                script
            }
            ScriptType::Unknown(script) => script.clone(),
            _ => self.fixed_script_pubkey(),
        })
    }

    /// Classifies `scriptPubkey` by its template. Scripts matching no
    /// template are returned as [`ScriptType::Unknown`].
    pub fn from_script_pubkey(script: &[u8]) -> Self {
        let script_type = match (script.len(), script) {
            (35, [33, key @ .., 0xAC]) if key[0] != 0x04 => ScriptType::P2pk(array(key)),
            (25, [0x76, 0xA9, 20, hash @ .., 0x88, 0xAC]) => ScriptType::P2pkh(array(hash)),
            (23, [0xA9, 20, hash @ .., 0x87]) => ScriptType::P2sh(array(hash)),
            (22, [0x00, 20, hash @ ..]) => ScriptType::P2wpkh(array(hash)),
            (34, [0x00, 32, hash @ ..]) => ScriptType::P2wsh(array(hash)),
            (34, [0x51, 32, key @ ..]) => ScriptType::P2tr(array(key)),
            (_, [0x6A, push @ ..]) => match extract_op_push(push) {
                Ok(data) => ScriptType::OpReturn(data.to_vec()),
                Err(_) => ScriptType::Unknown(script.to_vec()),
            },
            _ => ScriptType::Unknown(script.to_vec()),
        };
        if let ScriptType::Unknown(_) = script_type {
            debug!("script {} does not match any standard template", script.to_hex());
        }
        script_type
    }

    /// Encodes the script as an address for the given network.
    pub fn to_address(&self, network: &Network) -> Result<String, AddressError> {
        match self {
            ScriptType::P2pkh(hash) => {
                Ok(base58::check_encode_versioned(&address::p2pkh_prefix(network)?, hash))
            }
            ScriptType::P2sh(hash) => {
                Ok(base58::check_encode_versioned(&address::p2sh_prefix(network)?, hash))
            }
            ScriptType::P2wpkh(hash) => Ok(bech32::encode_segwit(address::hrp(network)?, 0, hash)?),
            ScriptType::P2wsh(hash) => Ok(bech32::encode_segwit(address::hrp(network)?, 0, hash)?),
            ScriptType::P2tr(key) => Ok(bech32::encode_segwit(address::hrp(network)?, 1, key)?),
            ScriptType::P2pk(_) | ScriptType::OpReturn(_) | ScriptType::Unknown(_) => {
                Err(AddressError::NoAddressForm(self.name()))
            }
        }
    }

    /// Parses an address of the given network into the script it pays to.
    ///
    /// Base58check addresses are matched against P2PKH and then P2SH version
    /// prefixes; all other addresses are decoded as segwit.
    pub fn from_address(address: &str, network: &Network) -> Result<Self, AddressError> {
        if let Ok(data) = base58::check_decode(address) {
            let prefixes = [
                (address::p2pkh_prefix(network), false),
                (address::p2sh_prefix(network), true),
            ];
            for (prefix, p2sh) in prefixes {
                let Ok(prefix) = prefix else { continue };
                match data.strip_prefix(prefix.as_slice()) {
                    Some(hash) if hash.len() == 20 && p2sh => {
                        return Ok(ScriptType::P2sh(array(hash)))
                    }
                    Some(hash) if hash.len() == 20 => return Ok(ScriptType::P2pkh(array(hash))),
                    _ => {}
                }
            }
            return Err(AddressError::Unrecognized);
        }

        let (version, program) = bech32::decode_segwit(address::hrp(network)?, address)?;
        match (version, program.len()) {
            (0, 20) => Ok(ScriptType::P2wpkh(array(&program))),
            (0, 32) => Ok(ScriptType::P2wsh(array(&program))),
            (1, 32) => Ok(ScriptType::P2tr(array(&program))),
            _ => Err(AddressError::Unrecognized),
        }
    }
}

impl Display for ScriptType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let payload: &[u8] = match self {
            ScriptType::P2pk(key) => key,
            ScriptType::P2pkh(hash) | ScriptType::P2sh(hash) | ScriptType::P2wpkh(hash) => hash,
            ScriptType::P2wsh(hash) | ScriptType::P2tr(hash) => hash,
            ScriptType::OpReturn(data) | ScriptType::Unknown(data) => data,
        };
        write!(f, "{}({})", self.name(), payload.to_hex())
    }
}

/// Copies slice of a length already checked by the caller into an array
fn array<const LEN: usize>(slice: &[u8]) -> [u8; LEN] {
    let mut array = [0u8; LEN];
    array.copy_from_slice(&slice[..LEN]);
    array
}

#[cfg(test)]
mod test {
    use bitcoin::hashes::hex::FromHex;

    use super::*;

    const PUBKEY: &str = "025476c2e83188368da1ff3e292e7acafcdb3566bb0ad253f62fc70f07aeee6357";

    fn script_types() -> Vec<ScriptType> {
        vec![
            ScriptType::P2pk(Vec::<u8>::from_hex(PUBKEY).map(|v: Vec<u8>| array(&v)).unwrap()),
            ScriptType::P2pkh([1u8; 20]),
            ScriptType::P2sh([2u8; 20]),
            ScriptType::P2wpkh([3u8; 20]),
            ScriptType::P2wsh([4u8; 32]),
            ScriptType::P2tr([5u8; 32]),
            ScriptType::OpReturn(b"hello world".to_vec()),
            ScriptType::OpReturn(vec![]),
            ScriptType::Unknown(vec![0x51]),
            ScriptType::Unknown(vec![]),
        ]
    }

    #[test]
    fn script_pubkey_roundtrip() {
        for script_type in script_types() {
            let script = script_type.to_script_pubkey().unwrap();
            assert_eq!(ScriptType::from_script_pubkey(&script), script_type);
        }
    }

    #[test]
    fn address_roundtrip() {
        for network in [Network::BITCOIN, Network::TESTNET, Network::REGTEST] {
            for script_type in script_types() {
                match script_type.to_address(&network) {
                    Ok(address) => assert_eq!(
                        ScriptType::from_address(&address, &network).unwrap(),
                        script_type
                    ),
                    Err(err) => assert_eq!(err, AddressError::NoAddressForm(script_type.name())),
                }
            }
        }
    }

    #[test]
    fn known_templates() {
        let spk = Vec::<u8>::from_hex("00141d0f172a0ecb48aee1be1f2687d2963ae33f71a1").unwrap();
        let pubkey = Vec::<u8>::from_hex(PUBKEY).unwrap();
        assert_eq!(ScriptType::from_script_pubkey(&spk), ScriptType::p2wpkh_from_pubkey(&pubkey).unwrap());

        // truncated P2PKH template
        let spk = Vec::<u8>::from_hex("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188").unwrap();
        assert_eq!(ScriptType::from_script_pubkey(&spk), ScriptType::Unknown(spk));

        // OP_RETURN with trailing opcode
        let spk = Vec::<u8>::from_hex("6a0201020304").unwrap();
        assert_eq!(ScriptType::from_script_pubkey(&spk), ScriptType::Unknown(spk));
    }

    #[test]
    fn nested_segwit() {
        let pubkey = Vec::<u8>::from_hex(PUBKEY).unwrap();
        let nested = ScriptType::p2sh_p2wpkh_from_pubkey(&pubkey).unwrap();
        let redeem = ScriptType::p2wpkh_from_pubkey(&pubkey).unwrap().to_script_pubkey().unwrap();
        assert_eq!(nested, ScriptType::p2sh_from_script(&redeem));
        assert_eq!(
            nested.to_address(&Network::BITCOIN).unwrap(),
            address::address_p2sh_p2wpkh(5, &pubkey).unwrap()
        );
    }

    #[test]
    fn rejects_uncompressed() {
        let mut pubkey = vec![0x04];
        pubkey.extend([7u8; 64]);
        assert_eq!(ScriptType::p2pk(&pubkey), Err(KeyError::Uncompressed));
        assert_eq!(ScriptType::p2wpkh_from_pubkey(&[2u8; 32]), Err(KeyError::InvalidLength(32)));
    }

    #[test]
    fn address_network_mismatch() {
        let address = ScriptType::P2wpkh([3u8; 20]).to_address(&Network::TESTNET).unwrap();
        assert!(ScriptType::from_address(&address, &Network::BITCOIN).is_err());
        let address = ScriptType::P2pkh([3u8; 20]).to_address(&Network::TESTNET).unwrap();
        assert_eq!(
            ScriptType::from_address(&address, &Network::BITCOIN),
            Err(AddressError::Unrecognized)
        );
        let no_segwit = Network {
            bech32_hrp: None,
            ..Network::BITCOIN
        };
        assert_eq!(
            ScriptType::P2tr([0u8; 32]).to_address(&no_segwit),
            Err(AddressError::UnsupportedByNetwork("bech32 human-readable part"))
        );
    }
}
