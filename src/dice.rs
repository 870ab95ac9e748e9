// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{anyhow, Context as _};
use async_trait::async_trait;
use contract_metadata::ContractMetadata;
use contract_transcode::ContractMessageTranscoder;
use parity_scale_codec::Decode;
use sp_core::{crypto::AccountId32, hexdisplay::AsBytesRef, sr25519};

use crate::artifact::ContractArtifact;
use crate::config::OracleParams;
use crate::poller::{PollOutcome, StatusSource};
use crate::{output, DeployContract, Execution, ReadContract, WriteContract, API};

/// Client for the dice roller contract: the `.contract` bundle plus, once
/// deployed or loaded from an artifact, its on-chain address.
pub struct DiceRoller {
    transcoder: ContractMessageTranscoder,
    blob: Vec<u8>,
    address: Option<AccountId32>,
}

impl DiceRoller {
    pub fn load(metadata_path: &Path) -> anyhow::Result<Self> {
        let metadata = ContractMetadata::load(metadata_path)
            .with_context(|| format!("unable to load {}", metadata_path.display()))?;
        let blob = metadata
            .source
            .wasm
            .map(|v| v.0)
            .ok_or_else(|| anyhow!("no wasm blob in {}", metadata_path.display()))?;
        let transcoder = ContractMessageTranscoder::load(metadata_path)?;

        Ok(Self {
            transcoder,
            blob,
            address: None,
        })
    }

    /// Binds the client to the address a previous deploy published.
    pub fn from_artifact(artifact: &ContractArtifact) -> anyhow::Result<Self> {
        let mut out = Self::load(&artifact.metadata)?;

        out.address.replace(artifact.address()?);

        Ok(out)
    }

    pub fn address(&self) -> anyhow::Result<&AccountId32> {
        self.address
            .as_ref()
            .ok_or_else(|| anyhow!("contract has not been deployed"))
    }

    /// Instantiates the contract with the oracle coordinates as
    /// constructor arguments.
    pub async fn deploy(
        &mut self,
        api: &API,
        signer: &sr25519::Pair,
        oracle: &OracleParams,
    ) -> anyhow::Result<AccountId32> {
        let selector = self.transcoder.encode(
            "new",
            [
                oracle.coordinator.to_string(),
                oracle.key_hash_hex(),
                oracle.subscription_id.to_string(),
            ],
        )?;

        let deployed = DeployContract {
            signer: signer.clone(),
            selector,
            value: 0,
            code: self.blob.clone(),
        }
        .execute(api)
        .await?;

        self.address.replace(deployed.contract_address.clone());

        Ok(deployed.contract_address)
    }

    /// Submits a randomness request on behalf of `roller` and returns the
    /// handle the result will be keyed by.
    pub async fn roll_dice(
        &self,
        api: &API,
        signer: &sr25519::Pair,
        roller: &AccountId32,
    ) -> anyhow::Result<AccountId32> {
        let selector = self.transcoder.encode("roll_dice", [roller.to_string()])?;

        WriteContract {
            signer: signer.clone(),
            contract_address: self.address()?.clone(),
            selector,
            value: 0,
        }
        .execute(api)
        .await?;

        Ok(roller.clone())
    }

    /// One status read: the stored result for `roller` and whether the
    /// oracle callback has run.
    pub async fn get_result(
        &self,
        api: &API,
        roller: &AccountId32,
    ) -> anyhow::Result<PollOutcome> {
        let selector = self.transcoder.encode("get_result", [roller.to_string()])?;

        let output::ReadSuccess { return_value } = ReadContract {
            caller: roller.clone(),
            contract_address: self.address()?.clone(),
            selector,
            value: 0,
        }
        .execute(api)
        .await?;

        let (value, fulfilled) = <(u32, bool)>::decode(&mut return_value.as_bytes_ref())?;

        Ok(PollOutcome::new(value, fulfilled))
    }
}

/// Adapter handing the poller read access to one deployed dice roller.
pub struct DiceStatus<'a> {
    api: &'a API,
    contract: &'a DiceRoller,
}

impl<'a> DiceStatus<'a> {
    pub fn new(api: &'a API, contract: &'a DiceRoller) -> Self {
        Self { api, contract }
    }
}

#[async_trait]
impl StatusSource for DiceStatus<'_> {
    type Handle = AccountId32;

    async fn status(&self, roller: &AccountId32) -> anyhow::Result<PollOutcome> {
        self.contract.get_result(self.api, roller).await
    }
}
