use std::sync::Arc;

use alloy::primitives::Address;
use alloy::transports::http::reqwest::Url;
use thiserror::Error;

use crate::consts::{Network, NetworkInfo, NetworkParseError};
use crate::eth_client::{DefaultProvider, ProviderError, ProviderFactory};
use crate::ipfs::PinataClient;

const DEFAULT_DRY_RUN: bool = false;
const DEFAULT_UPLOAD_TO_PINATA: bool = false;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to parse network from EVM_CHAIN: {0}")]
    FailedToParseNetwork(#[from] NetworkParseError),

    #[error("Failed to parse URL from env var {0}")]
    FailedToParseUrl(String),

    #[error("Failed to parse address {0}")]
    FailedToParseAddress(String),

    #[error("Failed to create provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("Pinata credentials are incomplete: {0} is set without {1}")]
    IncompletePinataCredentials(&'static str, &'static str),
}

pub mod env_vars {
    use std::env;
    use std::fmt::Debug;

    #[derive(Clone)]
    pub struct EnvVarValue<TVal> {
        pub name: &'static str,
        pub sensitive: bool,
        pub value: TVal,
    }

    impl<TVal: Debug> Debug for EnvVarValue<TVal> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let value_print = if self.sensitive {
                "***".to_string()
            } else {
                format!("{:?}", self.value)
            };
            f.debug_struct("EnvVarValue")
                .field("name", &self.name)
                .field("value", &value_print)
                .finish()
        }
    }

    #[derive(Debug, Clone)]
    pub struct EnvVars {
        pub evm_chain: EnvVarValue<String>,
        pub execution_layer_rpc: EnvVarValue<String>,
        pub upload_to_pinata: EnvVarValue<Option<String>>,
        pub pinata_api_key: EnvVarValue<Option<String>>,
        pub pinata_api_secret: EnvVarValue<Option<String>>,
        pub etherscan_api_key: EnvVarValue<Option<String>>,
        pub vrf_coordinator_address: EnvVarValue<Option<String>>,
        pub dry_run: EnvVarValue<Option<String>>,
        // sensitive
        pub private_key: EnvVarValue<String>,
    }

    impl EnvVars {
        fn optional(key: &'static str, sensitive: bool) -> EnvVarValue<Option<String>> {
            let value = match env::var(key) {
                Ok(value) => Some(value),
                Err(_) => None,
            };
            EnvVarValue {
                name: key,
                sensitive,
                value,
            }
        }

        fn required(key: &'static str, sensitive: bool) -> EnvVarValue<String> {
            let value = env::var(key).unwrap_or_else(|e| panic!("Failed to read env var {key}: {e:?}"));
            EnvVarValue {
                name: key,
                sensitive,
                value,
            }
        }

        pub fn init_from_env() -> Self {
            Self {
                evm_chain: Self::required("EVM_CHAIN", false),
                execution_layer_rpc: Self::required("EXECUTION_LAYER_RPC", true),
                upload_to_pinata: Self::optional("UPLOAD_TO_PINATA", false),
                pinata_api_key: Self::optional("PINATA_API_KEY", true),
                pinata_api_secret: Self::optional("PINATA_API_SECRET", true),
                etherscan_api_key: Self::optional("ETHERSCAN_API_KEY", true),
                vrf_coordinator_address: Self::optional("VRF_COORDINATOR_ADDRESS", false),
                dry_run: Self::optional("DRY_RUN", false),
                private_key: Self::required("PRIVATE_KEY", true),
            }
        }
    }
}

pub struct ScriptRuntime {
    pub network: Network,
    pub provider: Arc<DefaultProvider>,
    pub pinata: Option<PinataClient>,
    env_vars: env_vars::EnvVars,
}

impl ScriptRuntime {
    pub fn init(env_vars: env_vars::EnvVars) -> Result<Self, Error> {
        let network: Network = env_vars.evm_chain.value.parse()?;
        let endpoint: Url = env_vars
            .execution_layer_rpc
            .value
            .parse()
            .map_err(|_| Error::FailedToParseUrl(env_vars.execution_layer_rpc.name.to_string()))?;
        let provider = Arc::new(ProviderFactory::create_provider_decode_key(
            env_vars.private_key.value.clone(),
            endpoint,
        )?);

        let pinata = match (
            &env_vars.pinata_api_key.value,
            &env_vars.pinata_api_secret.value,
        ) {
            (Some(key), Some(secret)) => Some(PinataClient::new(key, secret)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::IncompletePinataCredentials(
                    "PINATA_API_KEY",
                    "PINATA_API_SECRET",
                ))
            }
            (None, Some(_)) => {
                return Err(Error::IncompletePinataCredentials(
                    "PINATA_API_SECRET",
                    "PINATA_API_KEY",
                ))
            }
        };

        Ok(Self {
            network,
            provider,
            pinata,
            env_vars,
        })
    }

    pub fn init_from_env() -> Result<Self, Error> {
        Self::init(env_vars::EnvVars::init_from_env())
    }

    pub fn network(&self) -> &impl NetworkInfo {
        &self.network
    }

    pub fn is_dry_run(&self) -> bool {
        parse_bool_var(&self.env_vars.dry_run, DEFAULT_DRY_RUN)
    }

    pub fn upload_to_pinata(&self) -> bool {
        parse_bool_var(&self.env_vars.upload_to_pinata, DEFAULT_UPLOAD_TO_PINATA)
    }

    pub fn etherscan_api_key(&self) -> Option<&str> {
        self.env_vars.etherscan_api_key.value.as_deref()
    }

    pub fn vrf_coordinator_override(&self) -> Result<Option<Address>, Error> {
        match &self.env_vars.vrf_coordinator_address.value {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| Error::FailedToParseAddress(raw.clone())),
            None => Ok(None),
        }
    }
}

fn parse_bool_var(var: &env_vars::EnvVarValue<Option<String>>, default: bool) -> bool {
    match &var.value {
        Some(v) => v
            .parse()
            .unwrap_or_else(|e| panic!("Couldn't parse {} value {v}: {e:?}", var.name)),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::env_vars::EnvVarValue;
    use super::*;

    #[test]
    fn sensitive_values_are_masked_in_debug_output() {
        let value = EnvVarValue {
            name: "PRIVATE_KEY",
            sensitive: true,
            value: "0xdeadbeef".to_string(),
        };
        let rendered = format!("{value:?}");
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("deadbeef"));
    }

    #[test]
    fn bool_vars_fall_back_to_defaults() {
        let unset = EnvVarValue {
            name: "DRY_RUN",
            sensitive: false,
            value: None,
        };
        assert!(!parse_bool_var(&unset, false));
        assert!(parse_bool_var(&unset, true));

        let set = EnvVarValue {
            name: "DRY_RUN",
            sensitive: false,
            value: Some("true".to_string()),
        };
        assert!(parse_bool_var(&set, false));
    }
}
