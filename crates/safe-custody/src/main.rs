//! safe-custody: plan Safe owner, whitelist and recovery changes from JSON snapshots

use std::path::Path;

use alloy::primitives::{Address, Bytes, B256};
use eyre::{bail, WrapErr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use safe_custody_adapters::{codec, seed_from_phrase, CustodyAdapterConfig};
use safe_custody_core::{
    all_changes, policy_update, sign_signables, target_guard_address, ContractTable,
    EvmDestination, HashingPort, Operation, OrgAdminRecoveryRequest, Policy, RecoveryBuilder,
    SafeTx, SafeTxRequest, SignableRecoveryData, WhitelistInstruction,
};

const USAGE: &str = "usage: safe-custody <plan|whitelist|recovery> <file.json>";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanInput {
    current: Policy,
    target: Policy,
    safe_address: Address,
    chain_id: u64,
    nonce: u64,
    #[serde(default)]
    contracts: ContractTable,
    #[serde(default)]
    config: CustodyAdapterConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanOutput {
    txs: Vec<SafeTx>,
    resulting_policy: Policy,
    #[serde(skip_serializing_if = "Option::is_none")]
    safe_call: Option<SafeCallOutput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafeCallOutput {
    to: Address,
    data: Bytes,
    operation: Operation,
    nonce: u64,
    safe_tx_hash: B256,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhitelistInput {
    current_whitelist: Vec<Address>,
    target_whitelist: Vec<EvmDestination>,
    #[serde(default)]
    current_guard: Option<Address>,
    #[serde(default)]
    whitelist_enabled: Option<bool>,
    #[serde(default)]
    dapps_enabled: Option<bool>,
    #[serde(default)]
    contracts: ContractTable,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WhitelistOutput {
    instructions: Vec<WhitelistInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_guard: Option<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecoveryInput {
    request: OrgAdminRecoveryRequest,
    #[serde(default)]
    contracts: ContractTable,
    #[serde(default)]
    config: CustodyAdapterConfig,
    #[serde(default)]
    mnemonic: Option<String>,
    #[serde(default)]
    passphrase: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecoveryOutput {
    signables: Vec<SignableRecoveryData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    signatures: Vec<String>,
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [command, file] = args.as_slice() else {
        bail!(USAGE);
    };

    let output = match command.as_str() {
        "plan" => serde_json::to_value(plan(read_json(file)?)?)?,
        "whitelist" => serde_json::to_value(whitelist(read_json(file)?))?,
        "recovery" => serde_json::to_value(recovery(read_json(file)?)?)?,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_json<T: DeserializeOwned>(file: &str) -> eyre::Result<T> {
    let path = Path::new(file);
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("invalid JSON in {}", path.display()))
}

fn plan(input: PlanInput) -> eyre::Result<PlanOutput> {
    let (txs, resulting_policy) = input
        .current
        .safe_transactions(&input.target)
        .wrap_err("failed to reconcile policies")?;
    tracing::info!(txs = txs.len(), safe = %input.safe_address, "policy plan computed");

    let safe_call = if txs.is_empty() {
        None
    } else {
        let call = policy_update(input.safe_address, &txs, &input.contracts)?;
        let request = SafeTxRequest::new(call.to, call.data.clone(), call.operation, input.nonce);
        let safe_tx_hash = input
            .config
            .hasher()
            .safe_tx_hash(input.chain_id, input.safe_address, &request)?;
        Some(SafeCallOutput {
            to: call.to,
            data: call.data,
            operation: call.operation,
            nonce: input.nonce,
            safe_tx_hash,
        })
    };

    Ok(PlanOutput {
        txs,
        resulting_policy,
        safe_call,
    })
}

fn whitelist(input: WhitelistInput) -> WhitelistOutput {
    let instructions = all_changes(&input.current_whitelist, &input.target_whitelist);
    let target_guard = input.current_guard.map(|current| {
        target_guard_address(
            current,
            &input.contracts.guards,
            input.whitelist_enabled,
            input.dapps_enabled,
        )
    });
    tracing::info!(instructions = instructions.len(), "whitelist diff computed");
    WhitelistOutput {
        instructions,
        target_guard,
    }
}

fn recovery(input: RecoveryInput) -> eyre::Result<RecoveryOutput> {
    let hasher = input.config.hasher();
    let signables = RecoveryBuilder::new(&hasher, &input.contracts)
        .signable_data(&input.request)
        .wrap_err("failed to build recovery signables")?;

    let Some(mnemonic) = input.mnemonic else {
        return Ok(RecoveryOutput {
            signables,
            public_key: None,
            signatures: Vec::new(),
        });
    };
    if mnemonic.trim().is_empty() {
        bail!("mnemonic is empty");
    }

    let seed = seed_from_phrase(&mnemonic, &input.passphrase);
    let key = input.config.derive_key(&seed[..])?;
    let signatures = sign_signables(&key, &signables)?
        .iter()
        .map(|signed| codec::to_base64(&signed.signature))
        .collect();

    Ok(RecoveryOutput {
        signables,
        public_key: Some(key.public_key_base58()),
        signatures,
    })
}
