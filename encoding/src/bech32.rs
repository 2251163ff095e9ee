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

//! Bech32 (BIP-173) and bech32m (BIP-350) encodings and segwit address
//! payloads.

use bitcoin::bech32::{self, u5, FromBase32, ToBase32};
pub use bitcoin::bech32::Variant;

/// Maximal version of a witness program
pub const MAX_WITNESS_VERSION: u8 = 16;

/// Errors in bech32-encoded segwit addresses
#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum SegwitError {
    /// invalid bech32 string: {0}
    #[from]
    Bech32(bech32::Error),

    /// address human-readable part `{actual}` does not match expected `{expected}`
    HrpMismatch {
        /// Expected human-readable part
        expected: String,
        /// Human-readable part found in the address
        actual: String,
    },

    /// address contains no data
    EmptyData,

    /// witness version {0} is above 16
    InvalidWitnessVersion(u8),

    /// witness program has invalid length {0}
    InvalidProgramLength(usize),

    /// witness program of version 0 must be 20 or 32 bytes long, not {0}
    InvalidV0ProgramLength(usize),

    /// checksum variant does not match witness version {0}
    InvalidVariant(u8, Variant),
}

/// Returns checksum variant required for the given witness version.
#[inline]
pub fn variant_for(witness_version: u8) -> Variant {
    if witness_version == 0 {
        Variant::Bech32
    } else {
        Variant::Bech32m
    }
}

/// Decodes generic bech32 or bech32m string into its human-readable part,
/// 5-bit data (without checksum) and the checksum variant.
///
/// Human-readable part is returned lowercase.
#[inline]
pub fn decode_any(s: &str) -> Result<(String, Vec<u5>, Variant), bech32::Error> { bech32::decode(s) }

/// Encodes generic 5-bit data with the given human-readable part and
/// checksum variant.
#[inline]
pub fn encode_any(hrp: &str, data: &[u5], variant: Variant) -> Result<String, bech32::Error> {
    bech32::encode(hrp, data, variant)
}

/// Encodes segwit output witness program as a bech32 (for witness version 0)
/// or bech32m (for other witness versions) address.
pub fn encode_segwit(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String, SegwitError> {
    check_program(witness_version, program)?;
    let mut data = Vec::with_capacity(1 + (program.len() * 8 + 4) / 5);
    data.push(u5::try_from_u8(witness_version)?);
    data.extend(program.to_base32());
    Ok(bech32::encode(hrp, data, variant_for(witness_version))?)
}

/// Decodes segwit address, returning witness version and witness program.
///
/// Checks that the address has the expected human-readable part, that its
/// checksum variant matches witness version and that witness program
/// satisfies BIP-141 length rules.
pub fn decode_segwit(hrp: &str, address: &str) -> Result<(u8, Vec<u8>), SegwitError> {
    let (actual_hrp, data, variant) = bech32::decode(address)?;
    if !actual_hrp.eq_ignore_ascii_case(hrp) {
        return Err(SegwitError::HrpMismatch {
            expected: hrp.to_owned(),
            actual: actual_hrp,
        });
    }
    let (version, program) = data.split_first().ok_or(SegwitError::EmptyData)?;
    let version = version.to_u8();
    if version > MAX_WITNESS_VERSION {
        return Err(SegwitError::InvalidWitnessVersion(version));
    }
    let program = Vec::<u8>::from_base32(program)?;
    check_program(version, &program)?;
    let expected_variant = variant_for(version);
    if variant != expected_variant {
        return Err(SegwitError::InvalidVariant(version, expected_variant));
    }
    Ok((version, program))
}

fn check_program(version: u8, program: &[u8]) -> Result<(), SegwitError> {
    if version > MAX_WITNESS_VERSION {
        return Err(SegwitError::InvalidWitnessVersion(version));
    }
    if !(2..=40).contains(&program.len()) {
        return Err(SegwitError::InvalidProgramLength(program.len()));
    }
    if version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(SegwitError::InvalidV0ProgramLength(program.len()));
    }
    Ok(())
}
