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

    let config = PollConfig::default();
    let status = DiceStatus::new(&s.api, &s.contract);

    let mut results = Vec::new();

    // a second request for the same roller supersedes the first result
    for round in 1..=2 {
        s.contract.roll_dice(&s.api, &s.signer, &s.roller).await?;
        log::info!("round {round}: dice roll requested");

        let outcome = timeout(
            SESSION_TIMEOUT,
            poll_until_fulfilled(&status, &s.roller, &config),
        )
        .await
        .context("session timed out")?;

        anyhow::ensure!(outcome.fulfilled, "round {round} was not fulfilled");

        let value = outcome.value.expect("fulfilled outcome carries a value");
        assert!(
            (1..=100).contains(&value),
            "round {round} result {value} out of range"
        );

        results.push(value);
    }

    log::info!("rolled {} then {}", results[0], results[1]);

    Ok(())
}
