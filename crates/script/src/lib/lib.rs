pub mod consts;
pub mod eth_client;
pub mod ipfs;
pub mod scripts;
pub mod token_uri;
pub mod tracing;
pub mod utils;
pub mod vrf;
