use std::sync::Arc;

use alloy::node_bindings::Anvil;
use alloy_primitives::U256;

use random_ipfs_nft_scripts::consts;
use random_ipfs_nft_scripts::eth_client::{
    DeployArguments, ProviderFactory, RandomIpfsNftWrapper, VrfCoordinatorMockWrapper,
};
use random_ipfs_nft_scripts::token_uri::fallback_token_uris;

// Needs the anvil binary on PATH and forge-built artifacts under
// contracts/out, so it only runs when asked for explicitly.
#[tokio::test]
#[ignore]
async fn deploy_against_anvil() -> anyhow::Result<()> {
    let anvil = Anvil::new().block_time(1).try_spawn()?;
    let key = anvil.keys()[0].clone();
    let provider = Arc::new(ProviderFactory::create_provider(key, anvil.endpoint_url()));

    let mock = VrfCoordinatorMockWrapper::deploy(
        Arc::clone(&provider),
        consts::mock_base_fee(),
        consts::mock_gas_price_link(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to deploy mock: {e:#}"))?;

    let subscription_id = mock.create_subscription().await?;
    mock.fund_subscription(subscription_id, consts::subscription_fund_amount())
        .await?;

    let config = consts::vrf_config(consts::LOCAL_CHAIN_ID)?;
    let deploy_args = DeployArguments {
        network: "local".to_owned(),
        vrf_coordinator: *mock.address(),
        subscription_id,
        gas_lane: config.gas_lane,
        callback_gas_limit: config.callback_gas_limit,
        token_uris: fallback_token_uris(),
        mint_fee: config.mint_fee,
    };

    let contract = RandomIpfsNftWrapper::deploy(Arc::clone(&provider), &deploy_args)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deploy contract: {e:#}"))?;
    mock.add_consumer(subscription_id, *contract.address()).await?;

    let mint_fee = contract.get_mint_fee().await?;
    assert_eq!(mint_fee, U256::from(10u64).pow(U256::from(16u64)));

    let first_uri = contract.get_token_uri(0).await?;
    assert_eq!(first_uri, fallback_token_uris()[0]);

    Ok(())
}
