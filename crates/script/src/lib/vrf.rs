use std::sync::Arc;

use alloy::network::Ethereum;
use alloy::primitives::Address;
use alloy_primitives::{B256, U256};
use thiserror::Error;

use crate::consts::{self, NetworkInfo, VrfConfig};
use crate::eth_client::{ContractError, VrfCoordinatorMockWrapper};

/// Fully resolved VRF constructor inputs for one deploy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VrfParameters {
    pub coordinator: Address,
    pub subscription_id: u64,
    pub gas_lane: B256,
    pub callback_gas_limit: u32,
    pub mint_fee: U256,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UnsupportedChain(#[from] consts::UnsupportedChainError),

    #[error("VRF configuration for chain id {chain_id} is missing {field}")]
    IncompleteConfig { chain_id: u64, field: &'static str },

    #[error("VRF coordinator mock flow failed: {0}")]
    Mock(#[from] ContractError),

    #[error("Failed to deploy VRF coordinator mock: {0:#}")]
    MockDeploy(eyre::Report),
}

/// Resolves the deploy-time VRF parameters for `network`.
///
/// On the local chain this creates on-chain state: a subscription is created
/// on the mock coordinator (reused from `coordinator_override` or freshly
/// deployed) and funded, so the deployed contract can request randomness
/// right away. Public chains are a pure lookup in the static table.
pub async fn resolve<P>(
    network: &impl NetworkInfo,
    provider: Arc<P>,
    coordinator_override: Option<Address>,
) -> Result<VrfParameters, Error>
where
    P: alloy::providers::Provider<Ethereum> + Clone,
{
    let chain_id = network.chain_id();
    let config = consts::vrf_config(chain_id)?;

    if network.is_dev() {
        resolve_with_mock(config, provider, coordinator_override).await
    } else {
        resolve_static(chain_id, config)
    }
}

fn resolve_static(chain_id: u64, config: VrfConfig) -> Result<VrfParameters, Error> {
    let coordinator = config.coordinator.ok_or(Error::IncompleteConfig {
        chain_id,
        field: "coordinator address",
    })?;
    let subscription_id = config.subscription_id.ok_or(Error::IncompleteConfig {
        chain_id,
        field: "subscription id",
    })?;

    Ok(VrfParameters {
        coordinator,
        subscription_id,
        gas_lane: config.gas_lane,
        callback_gas_limit: config.callback_gas_limit,
        mint_fee: config.mint_fee,
    })
}

async fn resolve_with_mock<P>(
    config: VrfConfig,
    provider: Arc<P>,
    coordinator_override: Option<Address>,
) -> Result<VrfParameters, Error>
where
    P: alloy::providers::Provider<Ethereum> + Clone,
{
    let mock = match coordinator_override {
        Some(address) => {
            tracing::info!("Using VRF coordinator mock at {address}");
            VrfCoordinatorMockWrapper::new(provider, address)
        }
        None => {
            tracing::info!("Deploying a fresh VRF coordinator mock");
            VrfCoordinatorMockWrapper::deploy(
                provider,
                consts::mock_base_fee(),
                consts::mock_gas_price_link(),
            )
            .await
            .map_err(Error::MockDeploy)?
        }
    };

    let subscription_id = mock.create_subscription().await?;
    mock.fund_subscription(subscription_id, consts::subscription_fund_amount())
        .await?;

    Ok(VrfParameters {
        coordinator: *mock.address(),
        subscription_id,
        gas_lane: config.gas_lane,
        callback_gas_limit: config.callback_gas_limit,
        mint_fee: config.mint_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_resolution_requires_complete_rows() {
        let incomplete = VrfConfig {
            coordinator: None,
            subscription_id: Some(1),
            gas_lane: B256::repeat_byte(1),
            callback_gas_limit: 500_000,
            mint_fee: U256::from(1u64),
        };
        let err = resolve_static(5, incomplete).unwrap_err();
        assert!(err.to_string().contains("chain id 5"));
        assert!(err.to_string().contains("coordinator address"));
    }

    #[test]
    fn static_resolution_copies_all_five_fields() {
        let config = consts::vrf_config(consts::SEPOLIA_CHAIN_ID).unwrap();
        let params = resolve_static(consts::SEPOLIA_CHAIN_ID, config.clone()).unwrap();

        assert_eq!(Some(params.coordinator), config.coordinator);
        assert_eq!(Some(params.subscription_id), config.subscription_id);
        assert_eq!(params.gas_lane, config.gas_lane);
        assert_eq!(params.callback_gas_limit, config.callback_gas_limit);
        assert_eq!(params.mint_fee, config.mint_fee);
    }
}
