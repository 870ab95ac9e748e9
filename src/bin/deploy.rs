// SPDX-License-Identifier: Apache-2.0

use vrf_dice_tests::artifact::ContractArtifact;
use vrf_dice_tests::config::{EnvConfig, OracleParams};
use vrf_dice_tests::dice::DiceRoller;
use vrf_dice_tests::free_balance_of;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = EnvConfig::from_env();
    let oracle = OracleParams::from_env()?;
    let (signer, deployer) = config.signer()?;

    log::info!("deploying {}", config.metadata_path.display());

    let api = config.connect().await?;

    let balance = free_balance_of(&api, &deployer).await?;
    if balance == 0 {
        log::warn!("deployer {deployer} has no funds, instantiation will fail");
    }

    let mut contract = DiceRoller::load(&config.metadata_path)?;
    let address = contract.deploy(&api, &signer, &oracle).await?;

    log::info!("contract deployed at: {address}");

    ContractArtifact::new("DiceRoller", &address, config.metadata_path.clone())
        .save(&config.artifact_path)?;

    log::info!("artifact written to {}", config.artifact_path.display());

    Ok(())
}
