// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use sp_core::crypto::{AccountId32, Ss58Codec};
use sp_core::{sr25519, Pair as _};

use crate::API;

const DEFAULT_RPC_URL: &str = "ws://127.0.0.1:9944";
const DEFAULT_SURI: &str = "//Alice";
const DEFAULT_METADATA: &str = "contracts/dice_roller.contract";
const DEFAULT_ARTIFACT: &str = "artifacts/dice_roller.json";

/// Connection settings shared by the deploy binary and the live cases,
/// with defaults pointing at a local dev chain.
pub struct EnvConfig {
    pub rpc_url: String,
    pub signer_suri: String,
    pub metadata_path: PathBuf,
    pub artifact_path: PathBuf,
}

impl EnvConfig {
    /// Reads `RPC_URL`, `SIGNER_SURI`, `CONTRACT_METADATA` and
    /// `CONTRACT_ARTIFACT`.
    pub fn from_env() -> Self {
        Self {
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.into()),
            signer_suri: env::var("SIGNER_SURI").unwrap_or_else(|_| DEFAULT_SURI.into()),
            metadata_path: env::var("CONTRACT_METADATA")
                .unwrap_or_else(|_| DEFAULT_METADATA.into())
                .into(),
            artifact_path: env::var("CONTRACT_ARTIFACT")
                .unwrap_or_else(|_| DEFAULT_ARTIFACT.into())
                .into(),
        }
    }

    pub async fn connect(&self) -> anyhow::Result<API> {
        API::from_url(&self.rpc_url)
            .await
            .with_context(|| format!("unable to connect to {}", self.rpc_url))
    }

    /// The signing keypair derived from the SURI and its on-chain account.
    pub fn signer(&self) -> anyhow::Result<(sr25519::Pair, AccountId32)> {
        let pair = sr25519::Pair::from_string(&self.signer_suri, None)
            .map_err(|e| anyhow!("SIGNER_SURI is not a valid secret URI: {e:?}"))?;
        let account = AccountId32::from(pair.public());

        Ok((pair, account))
    }
}

/// Constructor arguments for the dice roller, the coordinates of the
/// randomness oracle it subscribes to. Resolved once at deploy time.
pub struct OracleParams {
    pub coordinator: AccountId32,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
}

impl OracleParams {
    /// Reads `COORDINATOR`, `KEY_HASH` and `SUBSCRIPTION_ID`. All three are
    /// required and validated here, so a bad environment fails before
    /// anything is signed.
    pub fn from_env() -> anyhow::Result<Self> {
        let coordinator = required("COORDINATOR")?;
        let coordinator = AccountId32::from_string(&coordinator)
            .map_err(|e| anyhow!("COORDINATOR is not a valid SS58 address: {e:?}"))?;

        let key_hash = required("KEY_HASH")?;
        let key_hash: [u8; 32] = hex::decode(key_hash.trim_start_matches("0x"))
            .context("KEY_HASH is not hex")?
            .try_into()
            .map_err(|v: Vec<u8>| anyhow!("KEY_HASH must be 32 bytes, got {}", v.len()))?;

        let subscription_id = required("SUBSCRIPTION_ID")?
            .parse()
            .context("SUBSCRIPTION_ID is not an integer")?;

        Ok(Self {
            coordinator,
            key_hash,
            subscription_id,
        })
    }

    pub(crate) fn key_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key_hash))
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow!("missing required environment variable {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_hash_renders_back_to_prefixed_hex() {
        let params = OracleParams {
            coordinator: AccountId32::new([0u8; 32]),
            key_hash: [0xab; 32],
            subscription_id: 1,
        };

        let hex = params.key_hash_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + 64);
    }
}
