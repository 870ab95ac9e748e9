// SPDX-License-Identifier: Apache-2.0

mod dice_roll;
mod reroll;

use std::time::Duration;

use once_cell::sync::Lazy;
use sp_core::{crypto::AccountId32, sr25519};

use crate::artifact::ContractArtifact;
use crate::config::EnvConfig;
use crate::dice::DiceRoller;
use crate::API;

/// Wall-clock bound on one request-and-poll session. The attempt budget
/// inside it is `PollConfig::default`.
const SESSION_TIMEOUT: Duration = Duration::from_secs(180);

static INIT: Lazy<()> = Lazy::new(|| {
    dotenv::dotenv().ok();
    let _ = env_logger::builder().is_test(true).try_init();
});

/// Connection, signer and artifact-bound contract client shared by the
/// cases. The signer account doubles as the roller whose result is polled.
struct Session {
    api: API,
    signer: sr25519::Pair,
    roller: AccountId32,
    contract: DiceRoller,
}

async fn session() -> anyhow::Result<Session> {
    Lazy::force(&INIT);

    let config = EnvConfig::from_env();
    let (signer, roller) = config.signer()?;
    let api = config.connect().await?;
    let artifact = ContractArtifact::load(&config.artifact_path)?;
    let contract = DiceRoller::from_artifact(&artifact)?;

    Ok(Session {
        api,
        signer,
        roller,
        contract,
    })
}
