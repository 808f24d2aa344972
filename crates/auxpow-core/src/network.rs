//! Dogecoin network definitions and consensus parameters.

use arith_uint256::ArithU256;
use serde::{Deserialize, Serialize};

/// Chain ID Dogecoin merge-mined blocks carry in their version.
pub const AUXPOW_CHAIN_ID: i32 = 0x0062;

/// Dogecoin network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Dogecoin mainnet
    Mainnet,
    /// Dogecoin testnet
    Testnet,
    /// Local regression test network
    Regtest,
}

impl Network {
    /// Consensus parameters for this network.
    pub fn params(&self) -> ChainParams {
        let pow_limit = match self {
            Network::Mainnet | Network::Testnet => ArithU256::MAX >> 20,
            Network::Regtest => ArithU256::MAX >> 1,
        };
        ChainParams {
            pow_limit,
            strict_chain_id: true,
            auxpow_chain_id: AUXPOW_CHAIN_ID,
        }
    }

    /// Parse network from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "dogecoin" => Some(Network::Mainnet),
            "testnet" | "test" => Some(Network::Testnet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }

    /// Get network name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Dogecoin Mainnet",
            Network::Testnet => "Dogecoin Testnet",
            Network::Regtest => "Dogecoin Regtest",
        }
    }
}

impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

/// The consensus parameters header validation depends on.
///
/// Built from a [`Network`], or deserialized for a custom chain. The
/// proof-of-work limit serializes as big-endian hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Easiest target any header may claim.
    pub pow_limit: ArithU256,
    /// Require non-legacy headers to carry `auxpow_chain_id`.
    pub strict_chain_id: bool,
    /// This chain's merge-mining chain ID.
    pub auxpow_chain_id: i32,
}

impl Default for ChainParams {
    fn default() -> Self {
        Network::default().params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("mainnet"), Some(Network::Mainnet));
        assert_eq!(Network::from_str("MAINNET"), Some(Network::Mainnet));
        assert_eq!(Network::from_str("testnet"), Some(Network::Testnet));
        assert_eq!(Network::from_str("regtest"), Some(Network::Regtest));
        assert_eq!(Network::from_str("invalid"), None);
        assert_eq!(Network::default().to_string(), "mainnet");
    }

    #[test]
    fn test_pow_limits() {
        assert_eq!(
            Network::Mainnet.params().pow_limit.to_hex(),
            "00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
        assert_eq!(Network::Testnet.params().pow_limit, Network::Mainnet.params().pow_limit);
        assert_eq!(
            Network::Regtest.params().pow_limit.to_hex(),
            "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn test_chain_id_is_strict_everywhere() {
        for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
            let params = network.params();
            assert!(params.strict_chain_id);
            assert_eq!(params.auxpow_chain_id, 98);
        }
    }

    #[test]
    fn test_params_from_json() {
        let json = r#"{
            "pow_limit": "0x7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "strict_chain_id": false,
            "auxpow_chain_id": 1
        }"#;
        let params: ChainParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.pow_limit, Network::Regtest.params().pow_limit);
        assert!(!params.strict_chain_id);
        assert_eq!(params.auxpow_chain_id, 1);

        let encoded = serde_json::to_string(&Network::Mainnet.params()).unwrap();
        let decoded: ChainParams = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, ChainParams::default());
    }

    #[test]
    fn test_network_serde() {
        assert_eq!(serde_json::to_string(&Network::Regtest).unwrap(), "\"regtest\"");
        let network: Network = serde_json::from_str("\"testnet\"").unwrap();
        assert_eq!(network, Network::Testnet);
    }
}
