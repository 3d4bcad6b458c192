use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::Address;
use alloy::providers::fillers::RecommendedFillers;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use alloy_primitives::{aliases::U96, B256, U256};
use serde::{Deserialize, Serialize};

use core::fmt;
use eyre::Result;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

use RandomIpfsNft::RandomIpfsNftInstance;
use VRFCoordinatorV2Mock::VRFCoordinatorV2MockInstance;

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    RandomIpfsNft,
    "../../contracts/out/RandomIpfsNft.sol/RandomIpfsNft.json",
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    VRFCoordinatorV2Mock,
    "../../contracts/out/VRFCoordinatorV2Mock.sol/VRFCoordinatorV2Mock.json",
);

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Subscription creation receipt contained no SubscriptionCreated event")]
    MissingSubscriptionEvent,

    #[error("Contract call reverted: {0}")]
    Rejection(String),

    #[error("Other alloy error {0:#?}")]
    OtherAlloyError(alloy::contract::Error),

    #[error("Transaction error {0:#?}")]
    TransactionError(#[from] alloy::providers::PendingTransactionError),
}

impl From<alloy::contract::Error> for ContractError {
    fn from(error: alloy::contract::Error) -> Self {
        if let alloy::contract::Error::TransportError(alloy::transports::RpcError::ErrorResp(
            ref error_payload,
        )) = error
        {
            if error_payload.message.contains("execution reverted") {
                return ContractError::Rejection(error_payload.message.to_string());
            }
        }
        ContractError::OtherAlloyError(error)
    }
}

/// Constructor arguments for `RandomIpfsNft`, in constructor order.
///
/// Serializable so a deploy run can be captured in (and replayed from) a JSON
/// manifest under `data/deploy/`.
#[derive(PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct DeployArguments {
    pub network: String,
    pub vrf_coordinator: Address,
    pub subscription_id: u64,
    pub gas_lane: B256,
    pub callback_gas_limit: u32,
    pub token_uris: Vec<String>,
    pub mint_fee: U256,
}

impl fmt::Display for DeployArguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployArguments")
            .field("network", &self.network)
            .field("vrf_coordinator", &self.vrf_coordinator)
            .field("subscription_id", &self.subscription_id)
            .field("gas_lane", &self.gas_lane)
            .field("callback_gas_limit", &self.callback_gas_limit)
            .field("token_uris", &self.token_uris)
            .field("mint_fee", &self.mint_fee)
            .finish()
    }
}

impl Debug for DeployArguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}") // just use display
    }
}

pub struct RandomIpfsNftWrapper<P>
where
    P: alloy::providers::Provider<Ethereum> + std::clone::Clone,
{
    contract: RandomIpfsNftInstance<Arc<P>>,
}

impl<P> RandomIpfsNftWrapper<P>
where
    P: alloy::providers::Provider<Ethereum> + std::clone::Clone,
{
    pub fn new(provider: Arc<P>, contract_address: Address) -> Self {
        let contract = RandomIpfsNft::new(contract_address, Arc::clone(&provider));
        RandomIpfsNftWrapper { contract }
    }

    pub async fn deploy(provider: Arc<P>, constructor_args: &DeployArguments) -> Result<Self> {
        let contract = RandomIpfsNft::deploy(
            provider.clone(),
            constructor_args.vrf_coordinator,
            constructor_args.subscription_id,
            constructor_args.gas_lane,
            constructor_args.callback_gas_limit,
            constructor_args.token_uris.clone(),
            constructor_args.mint_fee,
        )
        .await?;
        Ok(RandomIpfsNftWrapper { contract })
    }

    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    pub async fn get_mint_fee(&self) -> Result<U256, ContractError> {
        let fee = self
            .contract
            .getMintFee()
            .call()
            .await
            .inspect_err(|err| tracing::error!("Failed to read mint fee {err:?}"))?;
        Ok(fee)
    }

    pub async fn get_token_uri(&self, index: u64) -> Result<String, ContractError> {
        let uri = self
            .contract
            .getDogTokenUris(U256::from(index))
            .call()
            .await
            .inspect_err(|err| tracing::error!("Failed to read token URI {index} {err:?}"))?;
        Ok(uri)
    }
}

pub struct VrfCoordinatorMockWrapper<P>
where
    P: alloy::providers::Provider<Ethereum> + std::clone::Clone,
{
    contract: VRFCoordinatorV2MockInstance<Arc<P>>,
}

impl<P> VrfCoordinatorMockWrapper<P>
where
    P: alloy::providers::Provider<Ethereum> + std::clone::Clone,
{
    pub fn new(provider: Arc<P>, contract_address: Address) -> Self {
        let contract = VRFCoordinatorV2Mock::new(contract_address, Arc::clone(&provider));
        VrfCoordinatorMockWrapper { contract }
    }

    pub async fn deploy(provider: Arc<P>, base_fee: U96, gas_price_link: U96) -> Result<Self> {
        let contract = VRFCoordinatorV2Mock::deploy(provider.clone(), base_fee, gas_price_link).await?;
        Ok(VrfCoordinatorMockWrapper { contract })
    }

    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    /// Creates a new subscription and returns its id, read back from the
    /// `SubscriptionCreated` event in the transaction receipt.
    pub async fn create_subscription(&self) -> Result<u64, ContractError> {
        tracing::info!("Creating VRF subscription on mock coordinator");
        let tx = self
            .contract
            .createSubscription()
            .send()
            .await
            .inspect(|val| tracing::debug!("Submitted createSubscription transaction {}", val.tx_hash()))
            .inspect_err(|err| tracing::error!("Failed to submit createSubscription {err:?}"))?;

        let receipt = tx.get_receipt().await?;
        let subscription_id = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| {
                log.log_decode::<VRFCoordinatorV2Mock::SubscriptionCreated>()
                    .ok()
            })
            .map(|decoded| decoded.inner.data.subId)
            .ok_or(ContractError::MissingSubscriptionEvent)?;

        tracing::info!("Created VRF subscription {subscription_id}");
        Ok(subscription_id)
    }

    pub async fn fund_subscription(&self, subscription_id: u64, amount: U96) -> Result<(), ContractError> {
        tracing::info!("Funding VRF subscription {subscription_id} with {amount} juels");
        let tx = self
            .contract
            .fundSubscription(subscription_id, amount)
            .send()
            .await
            .inspect_err(|err| tracing::error!("Failed to submit fundSubscription {err:?}"))?;
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            return Err(ContractError::Rejection(format!(
                "fundSubscription reverted: {:#?}",
                receipt.transaction_hash
            )));
        }
        Ok(())
    }

    pub async fn add_consumer(&self, subscription_id: u64, consumer: Address) -> Result<(), ContractError> {
        tracing::info!("Adding {consumer} as a consumer of subscription {subscription_id}");
        let tx = self
            .contract
            .addConsumer(subscription_id, consumer)
            .send()
            .await
            .inspect_err(|err| tracing::error!("Failed to submit addConsumer {err:?}"))?;
        let receipt = tx.get_receipt().await?;
        if !receipt.status() {
            return Err(ContractError::Rejection(format!(
                "addConsumer reverted: {:#?}",
                receipt.transaction_hash
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to convert string to hex")]
    FromHexError,
    #[error("Failed to parse private key")]
    ParsePrivateKeyError,
    #[error("Failed to deserialize private key")]
    DeserializePrivateKeyError,
}

pub type DefaultProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::fillers::JoinFill<
            alloy::providers::Identity,
            <Ethereum as RecommendedFillers>::RecommendedFillers,
        >,
        alloy::providers::fillers::WalletFiller<EthereumWallet>,
    >,
    alloy::providers::RootProvider,
>;

pub type NftContract = RandomIpfsNftWrapper<DefaultProvider>;
pub type VrfCoordinatorMock = VrfCoordinatorMockWrapper<DefaultProvider>;

pub struct ProviderFactory {}
impl ProviderFactory {
    fn decode_key(private_key_raw: &str) -> Result<k256::SecretKey, ProviderError> {
        let key_str = private_key_raw
            .split("0x")
            .last()
            .ok_or(ProviderError::ParsePrivateKeyError)?
            .trim();
        let key_hex = hex::decode(key_str).map_err(|_e| ProviderError::FromHexError)?;
        let key = k256::SecretKey::from_bytes((&key_hex[..]).into())
            .map_err(|_e| ProviderError::DeserializePrivateKeyError)?;
        Ok(key)
    }

    pub fn create_provider(key: k256::SecretKey, endpoint: Url) -> DefaultProvider {
        let signer: PrivateKeySigner = PrivateKeySigner::from(key);
        let wallet: EthereumWallet = EthereumWallet::from(signer);
        ProviderBuilder::new().wallet(wallet).connect_http(endpoint)
    }

    pub fn create_provider_decode_key(
        key_str: String,
        endpoint: Url,
    ) -> Result<DefaultProvider, ProviderError> {
        let key = Self::decode_key(&key_str)?;
        Ok(Self::create_provider(key, endpoint))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::consts;
    use crate::utils;

    fn default_params() -> DeployArguments {
        let config = consts::vrf_config(consts::SEPOLIA_CHAIN_ID).unwrap();
        DeployArguments {
            network: "sepolia".to_owned(),
            vrf_coordinator: config.coordinator.unwrap(),
            subscription_id: config.subscription_id.unwrap(),
            gas_lane: config.gas_lane,
            callback_gas_limit: config.callback_gas_limit,
            token_uris: consts::FALLBACK_TOKEN_URIS
                .iter()
                .map(|uri| uri.to_string())
                .collect(),
            mint_fee: config.mint_fee,
        }
    }

    #[test]
    fn deployment_arguments_serde() {
        let params = default_params();

        let serialized = serde_json::to_string_pretty(&params).expect("Failed to serialize");
        let deserialized: DeployArguments =
            serde_json::from_str(&serialized).expect("Failed to deserialize");

        assert_eq!(params, deserialized);
    }

    #[test]
    fn deployment_arguments_from_manifest_file() {
        let deploy_args_file =
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/deploy/sepolia-deploy.json");
        let deploy_params: DeployArguments =
            utils::read_json(deploy_args_file).expect("Failed to read deployment args");

        assert_eq!(deploy_params, default_params());
    }

    #[test]
    fn display_does_not_panic_on_defaults() {
        let rendered = format!("{}", default_params());
        assert!(rendered.contains("sepolia"));
        assert!(rendered.contains("token_uris"));
    }
}
