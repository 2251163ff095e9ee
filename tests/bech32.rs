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


use bitcoin::hashes::hex::FromHex;
use bitcoinformats::encoding::bech32::{self, SegwitError, Variant};
use bitcoinformats::opcodes::{build_op_push, op_number};

const VALID: [(Variant, &str); 14] = [
    (Variant::Bech32, "A12UEL5L"),
    (Variant::Bech32, "a12uel5l"),
    (
        Variant::Bech32,
        "an83characterlonghumanreadablepartthatcontainsthenumber1andtheexcludedcharactersbio1tt5tgs",
    ),
    (Variant::Bech32, "abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw"),
    (
        Variant::Bech32,
        "11qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqc8247j",
    ),
    (Variant::Bech32, "split1checkupstagehandshakeupstreamerranterredcaperred2y9e3w"),
    (Variant::Bech32, "?1ezyfcl"),
    (Variant::Bech32m, "A1LQFN3A"),
    (Variant::Bech32m, "a1lqfn3a"),
    (
        Variant::Bech32m,
        "an83characterlonghumanreadablepartthatcontainsthetheexcludedcharactersbioandnumber11sg7hg6",
    ),
    (Variant::Bech32m, "abcdef1l7aum6echk45nj3s0wdvt2fg8x9yrzpqzd3ryx"),
    (
        Variant::Bech32m,
        "11llllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllllludsr8",
    ),
    (Variant::Bech32m, "split1checkupstagehandshakeupstreamerranterredcaperredlc445v"),
    (Variant::Bech32m, "?1v759aa"),
];

const INVALID: [&str; 9] = [
    // HRP characters out of range
    "\x201nwldj5",
    "\x7f1axkwrx",
    "\u{80}1eym55h",
    // no separator
    "pzry9x0s0muk",
    // empty HRP
    "1pzry9x0s0muk",
    // invalid data character
    "x1b4n0q5v",
    // too short checksum
    "li1dgmt3",
    // invalid character in checksum
    "de1lg7wt\u{ff}",
    // checksum computed over uppercase HRP
    "A1G7SGD8",
];

const VALID_ADDRESSES: [(&str, &str, &str); 8] = [
    ("bc", "BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4", "0014751e76e8199196d454941c45d1b3a323f1433bd6"),
    (
        "tb",
        "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7",
        "00201863143c14c5166804bd19203356da136c985678cd4d27a1b8c6329604903262",
    ),
    (
        "bc",
        "bc1pw508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7kt5nd6y",
        "5128751e76e8199196d454941c45d1b3a323f1433bd6751e76e8199196d454941c45d1b3a323f1433bd6",
    ),
    ("bc", "BC1SW50QGDZ25J", "6002751e"),
    ("bc", "bc1zw508d6qejxtdg4y5r3zarvaryvaxxpcs", "5210751e76e8199196d454941c45d1b3a323"),
    (
        "tb",
        "tb1qqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesrxh6hy",
        "0020000000c4a5cad46221b2a187905e5266362b99d5e91c6ce24d165dab93e86433",
    ),
    (
        "tb",
        "tb1pqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesf3hn0c",
        "5120000000c4a5cad46221b2a187905e5266362b99d5e91c6ce24d165dab93e86433",
    ),
    (
        "bc",
        "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0",
        "512079be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
    ),
];

const INVALID_ADDRESSES: [(&str, &str); 14] = [
    // HRP mismatch
    ("bc", "tb1qqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesrxh6hy"),
    // invalid human-readable part
    ("bc", "tc1qw508d6qejxtdg4y5r3zarvary0c5xw7kg3g4ty"),
    // invalid checksum
    ("bc", "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5"),
    // invalid witness version
    ("bc", "BC13W508D6QEJXTDG4Y5R3ZARVARY0C5XW7KN40WF2"),
    // invalid program lengths
    ("bc", "bc1rw5uspcuh"),
    ("bc", "bc10w508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7kw5rljs90"),
    ("bc", "BC1QR508D6QEJXTDG4Y5R3ZARVARYV98GJ9P"),
    // mixed case
    ("tb", "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sL5k7"),
    // zero padding of more than 4 bits
    ("bc", "bc1zw508d6qejxtdg4y5r3zarvaryvqyzf3du"),
    // non-zero padding in 8-to-5 conversion
    ("tb", "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3pjxtptv"),
    // empty data section
    ("bc", "bc1gmk9yu"),
    // bech32 checksum for witness version 1
    ("bc", "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqh2y7hd"),
    // bech32m checksum for witness version 0
    ("bc", "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kemeawh"),
    // invalid witness version
    ("bc", "BC130XLXVLHEMJA6C4DQV22UAPCTQUPFHLXM9H8Z3K2E72Q4K9HCZ7VQ7ZWS8R"),
];

#[test]
fn valid_strings() {
    for (variant, s) in VALID {
        let (_, _, detected) = bech32::decode_any(s).unwrap_or_else(|err| panic!("{}: {}", s, err));
        assert_eq!(detected, variant, "{}", s);
    }
}

#[test]
fn invalid_strings() {
    for s in INVALID {
        assert!(bech32::decode_any(s).is_err(), "{:?} must not decode", s);
    }
}

#[test]
fn valid_addresses() {
    for (hrp, address, script_pubkey) in VALID_ADDRESSES {
        let (version, program) = bech32::decode_segwit(hrp, address).unwrap();
        assert!(version <= 16);
        let mut script = vec![op_number(version as i64).unwrap().to_u8()];
        script.extend(build_op_push(&program).unwrap());
        assert_eq!(script, Vec::<u8>::from_hex(script_pubkey).unwrap(), "{}", address);
    }
}

#[test]
fn invalid_addresses() {
    for (hrp, address) in INVALID_ADDRESSES {
        assert!(bech32::decode_segwit(hrp, address).is_err(), "{} must be rejected", address);
    }
}

#[test]
fn address_errors() {
    assert!(matches!(
        bech32::decode_segwit("bc", "tb1qqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesrxh6hy"),
        Err(SegwitError::HrpMismatch { .. })
    ));
    assert_eq!(bech32::decode_segwit("bc", "bc1gmk9yu"), Err(SegwitError::EmptyData));
    assert_eq!(
        bech32::decode_segwit("bc", "BC1QR508D6QEJXTDG4Y5R3ZARVARYV98GJ9P"),
        Err(SegwitError::InvalidV0ProgramLength(16))
    );
    assert_eq!(
        bech32::decode_segwit(
            "bc",
            "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqh2y7hd"
        ),
        Err(SegwitError::InvalidVariant(1, Variant::Bech32m))
    );
}
