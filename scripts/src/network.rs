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


use std::str::FromStr;

/// Address and extended key parameters of a bitcoin network.
///
/// Each parameter is optional: a network lacking a parameter can't produce
/// addresses or keys of the corresponding kind.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Network {
    /// Version prefix of P2PKH base58check addresses
    pub p2pkh_version: Option<u32>,

    /// Version prefix of P2SH base58check addresses
    pub p2sh_version: Option<u32>,

    /// Human-readable part of segwit addresses
    pub bech32_hrp: Option<&'static str>,

    /// Version magic of serialized extended public keys
    pub xpub_version: Option<u32>,

    /// Version magic of serialized extended private keys
    pub xprv_version: Option<u32>,
}

impl Network {
    /// Bitcoin mainnet
    pub const BITCOIN: Network = Network {
        p2pkh_version: Some(0),
        p2sh_version: Some(5),
        bech32_hrp: Some("bc"),
        xpub_version: Some(0x0488_B21E),
        xprv_version: Some(0x0488_ADE4),
    };

    /// Bitcoin testnet (also used by signet)
    pub const TESTNET: Network = Network {
        p2pkh_version: Some(111),
        p2sh_version: Some(196),
        bech32_hrp: Some("tb"),
        xpub_version: Some(0x0435_87CF),
        xprv_version: Some(0x0435_8394),
    };

    /// Bitcoin regtest
    pub const REGTEST: Network = Network {
        bech32_hrp: Some("bcrt"),
        ..Network::TESTNET
    };
}

/// Named bitcoin networks
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
pub enum Chain {
    /// Bitcoin mainnet
    #[display("mainnet")]
    Mainnet,

    /// Bitcoin testnet3 and signet
    #[display("testnet")]
    Testnet,

    /// Local regression testing network
    #[display("regtest")]
    Regtest,
}

impl Default for Chain {
    fn default() -> Self { Chain::Mainnet }
}

impl Chain {
    /// Returns address and key parameters of the network
    pub fn network(self) -> Network {
        match self {
            Chain::Mainnet => Network::BITCOIN,
            Chain::Testnet => Network::TESTNET,
            Chain::Regtest => Network::REGTEST,
        }
    }

    /// Detects if the network is a test network
    pub fn is_testnet(self) -> bool { self != Chain::Mainnet }
}

impl From<Chain> for Network {
    fn from(chain: Chain) -> Self { chain.network() }
}

/// Unknown network name
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display("unknown network name `{0}`")]
pub struct UnknownChain(pub String);

impl FromStr for Chain {
    type Err = UnknownChain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "mainnet" | "bitcoin" | "main" => Chain::Mainnet,
            "testnet" | "testnet3" | "test" | "signet" => Chain::Testnet,
            "regtest" => Chain::Regtest,
            _ => return Err(UnknownChain(s.to_owned())),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(Chain::from_str("bitcoin"), Ok(Chain::Mainnet));
        assert_eq!(Chain::from_str("Testnet"), Ok(Chain::Testnet));
        assert_eq!(Chain::Regtest.to_string(), "regtest");
        assert!(Chain::from_str("litecoin").is_err());
    }

    #[test]
    fn regtest_differs_in_hrp_only() {
        let regtest = Chain::Regtest.network();
        assert_eq!(regtest.bech32_hrp, Some("bcrt"));
        assert_eq!(regtest.p2pkh_version, Network::TESTNET.p2pkh_version);
        assert_eq!(regtest.xpub_version, Network::TESTNET.xpub_version);
    }
}
