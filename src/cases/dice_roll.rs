// SPDX-License-Identifier: Apache-2.0

use anyhow::Context as _;
use tokio::time::timeout;

use super::{session, SESSION_TIMEOUT};
use crate::dice::DiceStatus;
use crate::poller::{poll_until_fulfilled, PollConfig};

// Needs a live contracts node, a funded signer and a deployed dice roller
// (run the deploy binary first): cargo test -- --ignored
#[ignore]
#[tokio::test]
async fn case() -> anyhow::Result<()> {
    let s = session().await?;

    s.contract.roll_dice(&s.api, &s.signer, &s.roller).await?;
    log::info!("dice roll requested for {}", s.roller);

    let config = PollConfig::default();
    let status = DiceStatus::new(&s.api, &s.contract);

    let outcome = timeout(
        SESSION_TIMEOUT,
        poll_until_fulfilled(&status, &s.roller, &config),
    )
    .await
    .context("session timed out")?;

    anyhow::ensure!(
        outcome.fulfilled,
        "randomness was not fulfilled within {} attempts",
        config.max_attempts
    );

    let value = outcome.value.expect("fulfilled outcome carries a value");
    log::info!("dice roll fulfilled: {value}");

    assert!((1..=100).contains(&value), "result {value} out of range");

    Ok(())
}
