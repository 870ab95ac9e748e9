// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _};
use serde::{Deserialize, Serialize};
use sp_core::crypto::{AccountId32, Ss58Codec};

/// Where a deployed contract lives. Written by the deploy binary and read
/// back by the live cases; `metadata` points at the `.contract` bundle the
/// address was instantiated from.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContractArtifact {
    pub contract: String,
    pub address: String,
    pub metadata: PathBuf,
}

impl ContractArtifact {
    pub fn new(contract: &str, address: &AccountId32, metadata: PathBuf) -> Self {
        Self {
            contract: contract.into(),
            address: address.to_string(),
            metadata,
        }
    }

    pub fn address(&self) -> anyhow::Result<AccountId32> {
        AccountId32::from_string(&self.address)
            .map_err(|e| anyhow!("artifact holds an invalid address: {e:?}"))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("unable to write {}", path.display()))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| {
            format!(
                "unable to read {}, run the deploy binary first",
                path.display()
            )
        })?;

        serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a valid artifact", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trips_through_ss58() {
        let address = AccountId32::new([7u8; 32]);
        let artifact = ContractArtifact::new(
            "DiceRoller",
            &address,
            "contracts/dice_roller.contract".into(),
        );

        assert_eq!(artifact.address().unwrap(), address);
    }
}
