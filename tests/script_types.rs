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


use bitcoinformats::address::{AddressError, ScriptType};
use bitcoinformats::Network;

fn vectors() -> Vec<ScriptType> {
    vec![
        ScriptType::P2pk([0u8; 33]),
        ScriptType::P2pkh([0u8; 20]),
        ScriptType::P2sh([0u8; 20]),
        ScriptType::P2wpkh([0u8; 20]),
        ScriptType::P2wsh([0u8; 32]),
        ScriptType::P2tr([0u8; 32]),
        ScriptType::OpReturn(vec![0u8; 80]),
    ]
}

#[test]
fn script_pubkey_roundtrip() {
    for script_type in vectors() {
        let script = script_type.to_script_pubkey().unwrap();
        assert_eq!(ScriptType::from_script_pubkey(&script), script_type);
    }
}

#[test]
fn address_roundtrip() {
    for network in [Network::BITCOIN, Network::TESTNET, Network::REGTEST] {
        for script_type in vectors() {
            let address = match script_type.to_address(&network) {
                Ok(address) => address,
                Err(AddressError::NoAddressForm(name)) => {
                    assert!(name == "p2pk" || name == "op_return", "{}", name);
                    continue;
                }
                Err(err) => panic!("{}: {}", script_type, err),
            };
            assert_eq!(ScriptType::from_address(&address, &network), Ok(script_type));
        }
    }
}

#[test]
fn address_of_other_network() {
    let address = ScriptType::P2wpkh([0u8; 20])
        .to_address(&Network::TESTNET)
        .unwrap();
    assert!(ScriptType::from_address(&address, &Network::BITCOIN).is_err());

    let address = ScriptType::P2pkh([0u8; 20])
        .to_address(&Network::TESTNET)
        .unwrap();
    assert_eq!(
        ScriptType::from_address(&address, &Network::BITCOIN),
        Err(AddressError::Unrecognized)
    );
}

#[test]
fn well_known_addresses() {
    assert_eq!(
        ScriptType::P2pkh([0u8; 20]).to_address(&Network::BITCOIN).unwrap(),
        "1111111111111111111114oLvT2"
    );
    assert_eq!(
        ScriptType::P2sh([0u8; 20]).to_address(&Network::BITCOIN).unwrap(),
        "31h1vYVSYuKP6AhS86fbRdMw9XHieotbST"
    );
    assert_eq!(
        ScriptType::P2wpkh([0u8; 20]).to_address(&Network::BITCOIN).unwrap(),
        "bc1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq9e75rs"
    );
    assert_eq!(
        ScriptType::P2tr([0u8; 32]).to_address(&Network::BITCOIN).unwrap(),
        "bc1pqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqpqqenm"
    );
}

#[test]
fn op_return_payloads() {
    for data in [&b""[..], b"\x00", b"\x00\x00", b"\x00\x00\x00", &b"hello".repeat(10)] {
        let script_type = ScriptType::OpReturn(data.to_vec());
        let script = script_type.to_script_pubkey().unwrap();
        assert_eq!(script[0], 0x6A);
        assert_eq!(ScriptType::from_script_pubkey(&script), script_type);
    }
}

#[test]
fn unknown_scripts() {
    for script in [&[][..], &[0x51], &[0x6A, 0x05, 0x01], &[0x00, 0x14, 0x00]] {
        assert_eq!(
            ScriptType::from_script_pubkey(script),
            ScriptType::Unknown(script.to_vec())
        );
    }
}
