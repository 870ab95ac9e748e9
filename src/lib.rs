// SPDX-License-Identifier: Apache-2.0

use anyhow::{anyhow, Context as _};
use pallet_contracts_primitives::{ContractExecResult, ContractResult, ExecReturnValue};
use parity_scale_codec::{Decode, Encode};
use sp_core::{crypto::AccountId32, hexdisplay::AsBytesRef, sr25519};
use sp_weights::Weight;
use subxt::{
    blocks::ExtrinsicEvents as TxEvents,
    dynamic::Value,
    ext::{scale_value::At, sp_runtime::DispatchError},
    tx::PairSigner,
    Config, OnlineClient, PolkadotConfig,
};
use tokio::time::timeout;

pub mod artifact;
pub mod config;
pub mod dice;
pub mod poller;

#[cfg(test)]
mod cases;

pub type API = OnlineClient<PolkadotConfig>;

const GAS_LIMIT: u64 = 2 * 10_u64.pow(11);
const PROOF_SIZE: u64 = 1024 * 1024;

const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Instantiate a contract from its wasm blob and constructor input.
pub struct DeployContract {
    pub signer: sr25519::Pair,
    pub selector: Vec<u8>,
    pub value: u128,
    pub code: Vec<u8>,
}

/// Submit a signed message call to a deployed contract.
pub struct WriteContract {
    pub signer: sr25519::Pair,
    pub contract_address: AccountId32,
    pub selector: Vec<u8>,
    pub value: u128,
}

/// Dry-run a message call through the runtime API. Nothing is signed,
/// `caller` only sets the execution origin.
pub struct ReadContract {
    pub caller: AccountId32,
    pub contract_address: AccountId32,
    pub selector: Vec<u8>,
    pub value: u128,
}

pub mod output {
    use super::*;

    pub struct Deployed {
        pub contract_address: AccountId32,
    }

    pub struct WriteSuccess {
        pub events: TxEvents<PolkadotConfig>,
    }

    pub struct ReadSuccess {
        pub return_value: Vec<u8>,
    }
}

#[async_trait::async_trait]
pub trait Execution {
    type Output;

    async fn execute(self, api: &API) -> Result<Self::Output, anyhow::Error>;
}

#[async_trait::async_trait]
impl Execution for DeployContract {
    type Output = output::Deployed;

    async fn execute(self, api: &API) -> Result<Self::Output, anyhow::Error> {
        let Self {
            signer,
            selector,
            value,
            code,
        } = self;

        let events = raw_instantiate_and_upload(
            api,
            signer,
            value,
            GAS_LIMIT,
            None,
            code,
            selector,
            random_salt(),
        )
        .await?;

        let contract_address = instantiated_address(&events)?;

        Ok(output::Deployed { contract_address })
    }
}

#[async_trait::async_trait]
impl Execution for WriteContract {
    type Output = output::WriteSuccess;

    async fn execute(self, api: &API) -> Result<Self::Output, anyhow::Error> {
        let Self {
            signer,
            contract_address,
            selector,
            value,
        } = self;

        let events =
            raw_call(api, contract_address, signer, value, GAS_LIMIT, None, selector).await?;

        Ok(output::WriteSuccess { events })
    }
}

#[async_trait::async_trait]
impl Execution for ReadContract {
    type Output = output::ReadSuccess;

    async fn execute(self, api: &API) -> Result<Self::Output, anyhow::Error> {
        let Self {
            caller,
            contract_address,
            selector,
            value,
        } = self;

        let rv = read_call(api, caller, contract_address, value, selector).await?;

        match rv.result {
            Ok(v) if v.did_revert() => Err(anyhow!(
                "contract reverted: {}",
                String::from_utf8_lossy(&rv.debug_message)
            )),
            Ok(v) => Ok(output::ReadSuccess {
                return_value: v.data.to_vec(),
            }),
            Err(e) => Err(anyhow!("unable to execute call: {e:?}")),
        }
    }
}

/// The runtime API request behind `ContractsApi_call`, a dry-run of a
/// contract message from `origin`.
#[derive(Encode)]
pub struct CallRequest {
    origin: <PolkadotConfig as Config>::AccountId,
    dest: <PolkadotConfig as Config>::AccountId,
    value: u128,
    gas_limit: Option<Weight>,
    storage_deposit_limit: Option<u128>,
    input_data: Vec<u8>,
}

fn random_salt() -> Vec<u8> {
    rand::random::<[u8; 32]>().to_vec()
}

fn weight_limit(ref_time: u64) -> Value {
    Value::named_composite(vec![
        ("ref_time", Value::u128(ref_time.into())),
        ("proof_size", Value::u128(PROOF_SIZE.into())),
    ])
}

fn storage_deposit_limit_value(limit: Option<u128>) -> Value {
    match limit {
        Some(v) => Value::unnamed_variant("Some", vec![Value::u128(v)]),
        None => Value::unnamed_variant("None", vec![]),
    }
}

async fn raw_instantiate_and_upload(
    api: &API,
    pair: sr25519::Pair,
    value: u128,
    gas_limit: u64,
    storage_deposit_limit: Option<u128>,
    code: Vec<u8>,
    data: Vec<u8>,
    salt: Vec<u8>,
) -> anyhow::Result<TxEvents<PolkadotConfig>> {
    let signer = PairSigner::new(pair);

    let instantiate = subxt::dynamic::tx(
        "Contracts",
        "instantiate_with_code",
        vec![
            Value::u128(value),
            weight_limit(gas_limit),
            storage_deposit_limit_value(storage_deposit_limit),
            Value::from_bytes(code),
            Value::from_bytes(data),
            Value::from_bytes(salt),
        ],
    );

    let events = api
        .tx()
        .sign_and_submit_then_watch_default(&instantiate, &signer)
        .await?
        .wait_for_in_block()
        .await?
        .wait_for_success()
        .await?;

    Ok(events)
}

async fn raw_call(
    api: &API,
    dest: AccountId32,
    pair: sr25519::Pair,
    value: u128,
    gas_limit: u64,
    storage_deposit_limit: Option<u128>,
    data: Vec<u8>,
) -> anyhow::Result<TxEvents<PolkadotConfig>> {
    let signer = PairSigner::new(pair);

    let call = subxt::dynamic::tx(
        "Contracts",
        "call",
        vec![
            Value::unnamed_variant("Id", vec![Value::from_bytes(&dest)]),
            Value::u128(value),
            weight_limit(gas_limit),
            storage_deposit_limit_value(storage_deposit_limit),
            Value::from_bytes(data),
        ],
    );

    let events = timeout(TIMEOUT, async {
        api.tx()
            .sign_and_submit_then_watch_default(&call, &signer)
            .await?
            .wait_for_in_block()
            .await?
            .wait_for_success()
            .await
    })
    .await
    .context("transaction timed out before inclusion")??;

    Ok(events)
}

async fn read_call(
    api: &API,
    caller: AccountId32,
    dest: AccountId32,
    value: u128,
    selector: Vec<u8>,
) -> anyhow::Result<ContractExecResult<u128>> {
    let req = CallRequest {
        origin: <_ as Decode>::decode(&mut caller.encode().as_bytes_ref())?,
        dest: <_ as Decode>::decode(&mut dest.encode().as_bytes_ref())?,
        value,
        gas_limit: Some(Weight::from_parts(GAS_LIMIT, PROOF_SIZE)),
        storage_deposit_limit: None,
        input_data: selector,
    }
    .encode();

    let rv = api
        .rpc()
        .state_call("ContractsApi_call", Some(req.as_bytes_ref()), None)
        .await?;

    let rv = ContractResult::<Result<ExecReturnValue, DispatchError>, u128>::decode(
        &mut rv.as_bytes_ref(),
    )?;

    Ok(rv)
}

/// Contract address from the Instantiated event of a deploy.
fn instantiated_address(events: &TxEvents<PolkadotConfig>) -> anyhow::Result<AccountId32> {
    for ev in events.iter() {
        let ev = ev?;

        if ev.pallet_name() == "Contracts" && ev.variant_name() == "Instantiated" {
            let mut fields = ev.field_bytes();
            let (_deployer, contract) = <(AccountId32, AccountId32)>::decode(&mut fields)?;
            return Ok(contract);
        }
    }

    Err(anyhow!("unable to find the Instantiated event"))
}

pub async fn free_balance_of(api: &API, addr: &AccountId32) -> anyhow::Result<u128> {
    let key = subxt::dynamic::storage("System", "Account", vec![Value::from_bytes(addr)]);

    let account = match api.storage().at_latest().await?.fetch(&key).await? {
        Some(raw) => raw.to_value()?,
        None => return Ok(0),
    };

    account
        .at("data")
        .and_then(|data| data.at("free"))
        .and_then(|free| free.as_u128())
        .ok_or_else(|| anyhow!("unexpected System.Account layout"))
}
