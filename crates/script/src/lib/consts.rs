use alloy_primitives::{aliases::U96, Address, B256, U256};
use hex_literal::hex;
use std::str::FromStr;
use thiserror::Error;

pub const LOCAL_CHAIN_ID: u64 = 31337;
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;
pub const MAINNET_CHAIN_ID: u64 = 1;

pub const SUPPORTED_PUBLIC_CHAIN_IDS: [u64; 2] = [MAINNET_CHAIN_ID, SEPOLIA_CHAIN_ID];

/// Token URIs used when asset upload is disabled. The deployed contract
/// indexes metadata by position, so the order is part of the data.
pub const FALLBACK_TOKEN_URIS: [&str; 3] = [
    "ipfs://QmaVkBn2tKmjbhphU7eyztbvSQU5EXDdqRyXZtRhSGgJGo",
    "ipfs://QmYQC5aGZu2PTH8XzbJrbDnvhj3gVs7ya33H9mqUNvST3d",
    "ipfs://QmZYmH5iDbD6v3U2ixoVAjioSzvWJszDzYdbeCLquGSpVm",
];

/// Chainlink VRF deploy-time parameters for one chain.
///
/// `coordinator` and `subscription_id` are absent for the local chain: the
/// mock coordinator flow supplies them at deploy time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrfConfig {
    pub coordinator: Option<Address>,
    pub subscription_id: Option<u64>,
    pub gas_lane: B256,
    pub callback_gas_limit: u32,
    pub mint_fee: U256,
}

pub trait NetworkInfo {
    fn as_str(&self) -> String;
    fn chain_id(&self) -> u64;
    fn is_dev(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Local,
    Sepolia,
    Mainnet,
}

#[derive(Debug, Error)]
#[error("Unknown network {0:?}; expected one of: local, sepolia, mainnet")]
pub struct NetworkParseError(String);

impl FromStr for Network {
    type Err = NetworkParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "local" | "localhost" | "anvil" | "hardhat" => Ok(Self::Local),
            "sepolia" => Ok(Self::Sepolia),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(NetworkParseError(other.to_owned())),
        }
    }
}

impl NetworkInfo for Network {
    fn as_str(&self) -> String {
        let val = match self {
            Self::Local => "local",
            Self::Sepolia => "sepolia",
            Self::Mainnet => "mainnet",
        };
        val.to_owned()
    }

    fn chain_id(&self) -> u64 {
        match self {
            Self::Local => LOCAL_CHAIN_ID,
            Self::Sepolia => SEPOLIA_CHAIN_ID,
            Self::Mainnet => MAINNET_CHAIN_ID,
        }
    }

    fn is_dev(&self) -> bool {
        matches!(self, Self::Local)
    }
}

#[derive(Debug, Error)]
#[error("No VRF configuration for chain id {0}")]
pub struct UnsupportedChainError(pub u64);

pub fn vrf_config(chain_id: u64) -> Result<VrfConfig, UnsupportedChainError> {
    match chain_id {
        LOCAL_CHAIN_ID => Ok(VrfConfig {
            coordinator: None,
            subscription_id: None,
            // The mock coordinator ignores the gas lane, any value works.
            gas_lane: B256::new(hex!(
                "474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c"
            )),
            callback_gas_limit: 500_000,
            mint_fee: mint_fee_wei(),
        }),
        SEPOLIA_CHAIN_ID => Ok(VrfConfig {
            coordinator: Some(Address::new(hex!("8103B0A8A00be2DDC778e6e7eaa21791Cd364625"))),
            subscription_id: Some(6926),
            // 150 gwei key hash
            gas_lane: B256::new(hex!(
                "474e34a077df58807dbe9c96d3c009b23b3c6d0cce433e59bbf5b34f823bc56c"
            )),
            callback_gas_limit: 500_000,
            mint_fee: mint_fee_wei(),
        }),
        MAINNET_CHAIN_ID => Ok(VrfConfig {
            coordinator: Some(Address::new(hex!("271682DEB8C4E0901D1a1550aD2e64D568E69909"))),
            subscription_id: Some(727),
            // 200 gwei key hash
            gas_lane: B256::new(hex!(
                "8af398995b04c28e9951adb9721ef74c74f93e6a478f39e7e0777be13527e7ef"
            )),
            callback_gas_limit: 500_000,
            mint_fee: mint_fee_wei(),
        }),
        other => Err(UnsupportedChainError(other)),
    }
}

/// 0.01 ETH per mint, as configured in every supported network.
fn mint_fee_wei() -> U256 {
    U256::from(10u64).pow(U256::from(16u64))
}

/// 1000 LINK in juels, funded into freshly created mock subscriptions.
pub fn subscription_fund_amount() -> U96 {
    U96::from(1_000u64) * U96::from(10u64).pow(U96::from(18u64))
}

/// Mock coordinator constructor defaults: 0.25 LINK base fee.
pub fn mock_base_fee() -> U96 {
    U96::from(250_000_000_000_000_000u64)
}

/// Mock coordinator constructor defaults: 1 gwei LINK per gas.
pub fn mock_gas_price_link() -> U96 {
    U96::from(1_000_000_000u64)
}
