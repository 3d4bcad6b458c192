use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use alloy::primitives::Address;

use crate::consts::NetworkInfo;
use crate::eth_client::{DeployArguments, RandomIpfsNftWrapper, VrfCoordinatorMockWrapper};
use crate::scripts::prelude::ScriptRuntime;
use crate::token_uri::{self, pup_template};
use crate::utils;
use crate::vrf;

pub struct Flags {
    pub upload_to_pinata: bool,
    pub dry_run: bool,
    pub verify: bool,
}

fn verify(address: &Address, chain_id: u64, api_key: &str) -> anyhow::Result<()> {
    tracing::info!("Verifying contract at {address}");

    let mut command = Command::new("forge");
    command
        .arg("verify-contract")
        .arg(address.to_string())
        .arg("contracts/src/RandomIpfsNft.sol:RandomIpfsNft")
        .args(["--chain-id", &chain_id.to_string()])
        .args(["--etherscan-api-key", api_key])
        .arg("--watch");

    let status = command.status()?;
    if !status.success() {
        anyhow::bail!("forge verify-contract exited with {status}");
    }
    tracing::info!("Verified successfully");
    Ok(())
}

pub async fn run(
    runtime: &ScriptRuntime,
    image_dir: &Path,
    store_manifest: Option<String>,
    flags: &Flags,
) -> anyhow::Result<()> {
    let network = runtime.network();
    tracing::info!("Preparing RandomIpfsNft deploy for network {}", network.as_str());

    let template = pup_template();
    let token_uris = if flags.upload_to_pinata {
        let pinner = runtime.pinata.as_ref().ok_or_else(|| {
            anyhow::anyhow!("UPLOAD_TO_PINATA is enabled but PINATA_API_KEY/PINATA_API_SECRET are not set")
        })?;
        token_uri::build_token_uris(true, pinner, image_dir, &template).await?
    } else {
        tracing::info!("Asset upload disabled, using the hardcoded token URIs");
        token_uri::fallback_token_uris()
    };

    let coordinator_override = runtime.vrf_coordinator_override()?;
    let vrf_params = vrf::resolve(network, Arc::clone(&runtime.provider), coordinator_override).await?;

    let deploy_args = DeployArguments {
        network: network.as_str(),
        vrf_coordinator: vrf_params.coordinator,
        subscription_id: vrf_params.subscription_id,
        gas_lane: vrf_params.gas_lane,
        callback_gas_limit: vrf_params.callback_gas_limit,
        token_uris,
        mint_fee: vrf_params.mint_fee,
    };

    if let Some(manifest_path_str) = store_manifest {
        let manifest_path = PathBuf::from(manifest_path_str);
        utils::write_json(&manifest_path, &deploy_args)?;
        tracing::info!("Deploy manifest {:?} written to {:?}", deploy_args, manifest_path.as_os_str());
    }

    if flags.dry_run || runtime.is_dry_run() {
        tracing::info!("Dry run is set, not deploying");
        return Ok(());
    }

    tracing::info!("Deploying contract");
    let deployed = RandomIpfsNftWrapper::deploy(Arc::clone(&runtime.provider), &deploy_args)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deploy RandomIpfsNft: {e:#}"))?;
    tracing::info!("Deployed RandomIpfsNft to {}", deployed.address());

    if network.is_dev() {
        let mock = VrfCoordinatorMockWrapper::new(
            Arc::clone(&runtime.provider),
            deploy_args.vrf_coordinator,
        );
        mock.add_consumer(deploy_args.subscription_id, *deployed.address())
            .await?;
    } else if flags.verify {
        match runtime.etherscan_api_key() {
            Some(api_key) => {
                if let Err(err) = verify(deployed.address(), network.chain_id(), api_key) {
                    // The contract is already live; verification can be retried by hand.
                    tracing::error!("Verification failed: {err:?}");
                }
            }
            None => tracing::info!("ETHERSCAN_API_KEY is not set, skipping verification"),
        }
    }

    Ok(())
}
