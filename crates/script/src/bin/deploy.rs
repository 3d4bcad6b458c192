use std::path::PathBuf;

use clap::Parser;
use random_ipfs_nft_scripts::consts::NetworkInfo;
use random_ipfs_nft_scripts::scripts::deploy;
use random_ipfs_nft_scripts::scripts::prelude::{env_vars::EnvVars, ScriptRuntime};
use random_ipfs_nft_scripts::tracing::{setup_logger, LogFormat, LoggingConfig};
use random_ipfs_nft_scripts::utils;

/*
Run variants:
* Upload fresh assets and deploy to the network from EVM_CHAIN:
UPLOAD_TO_PINATA=true cargo run --bin deploy --release -- --images images/random-nft

* Reuse the hardcoded token URIs, write the constructor args, don't deploy:
cargo run --bin deploy --release -- --store "data/deploy/${EVM_CHAIN}-deploy.json" --dry-run

* Deploy and verify on Etherscan (needs ETHERSCAN_API_KEY):
cargo run --bin deploy --release -- --verify
*/

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct DeployArgs {
    #[clap(long, default_value = "images/random-nft")]
    images: PathBuf,
    #[clap(long, required = false)]
    store: Option<String>,
    #[clap(long, default_value = "false")]
    dry_run: bool,
    #[clap(long, default_value = "false")]
    verify: bool,
    /// Use the fallback token URI list even if UPLOAD_TO_PINATA is set.
    #[clap(long, default_value = "false")]
    skip_upload: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let format = utils::read_env("LOG_FORMAT", LogFormat::Plain);
    setup_logger(LoggingConfig::default().use_format(format));

    let args = DeployArgs::parse();

    let env_vars = EnvVars::init_from_env();
    let runtime = ScriptRuntime::init(env_vars).expect("Failed to initialize script runtime");

    let flags = deploy::Flags {
        upload_to_pinata: runtime.upload_to_pinata() && !args.skip_upload,
        dry_run: args.dry_run,
        verify: args.verify,
    };

    tracing::info!(
        "Running deploy for network {:?}, images: {:?}",
        runtime.network().as_str(),
        args.images
    );

    deploy::run(&runtime, &args.images, args.store, &flags)
        .await
        .expect("Failed to run deploy");
}
