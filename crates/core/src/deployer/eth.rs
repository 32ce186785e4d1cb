//! Ethereum JSON-RPC backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{
    DEFAULT_GAS_LIMIT, DeployRequest, Deployer, check_rpc_url, ensure_deployable, record,
    unix_now,
};
use crate::{
    Platform,
    contract::{Address, ContractsRepository, DeployedContract},
    rpc,
};

/// Maximum time to wait for a creation transaction to be mined.
const RECEIPT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    contract_address: Option<String>,
    status: Option<String>,
}

/// Deploys through an ethereum node, paying with its first unlocked account.
pub struct EthDeployer {
    client: reqwest::Client,
    url: Url,
    repo: Arc<ContractsRepository>,
}

impl EthDeployer {
    pub fn new(url: Url, repo: Arc<ContractsRepository>) -> Result<Self> {
        check_rpc_url(&url)?;

        Ok(Self {
            client: rpc::create_client()?,
            url,
            repo,
        })
    }

    async fn sender(&self) -> Result<String> {
        let accounts: Vec<String> =
            rpc::json_rpc_call(&self.client, &self.url, "eth_accounts", vec![]).await?;

        accounts
            .into_iter()
            .next()
            .context("Ethereum node has no unlocked account")
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt> {
        let client = &self.client;
        let url = &self.url;

        rpc::wait_until_ready("contract receipt", RECEIPT_TIMEOUT_SECS, move || async move {
            let receipt: Option<TransactionReceipt> = rpc::json_rpc_call(
                client,
                url,
                "eth_getTransactionReceipt",
                vec![json!(tx_hash)],
            )
            .await?;

            receipt.context("Transaction not mined yet")
        })
        .await
    }
}

#[async_trait]
impl Deployer for EthDeployer {
    fn platform(&self) -> Platform {
        Platform::Ethereum
    }

    async fn create_contract(&self, request: DeployRequest) -> Result<DeployedContract> {
        ensure_deployable(&self.repo, &request)?;

        let sender = self.sender().await?;

        let tx_hash: String = rpc::json_rpc_call(
            &self.client,
            &self.url,
            "eth_sendTransaction",
            vec![json!({
                "from": sender,
                "data": request.bytecode,
                "gas": format!("0x{:x}", DEFAULT_GAS_LIMIT),
            })],
        )
        .await
        .context("Failed to send contract creation transaction")?;

        tracing::info!(name = %request.name, tx_hash = %tx_hash, "Waiting for contract creation...");

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        if receipt.status.as_deref() == Some("0x0") {
            anyhow::bail!("Contract creation reverted: {}", tx_hash);
        }

        let address: Address = receipt
            .contract_address
            .context("Receipt has no contract address")?
            .parse()
            .context("Invalid contract address in receipt")?;

        let contract = DeployedContract {
            name: request.name,
            address,
            tx_hash,
            sender: Some(sender),
            deployed_at: unix_now(),
            confirmed: true,
        };

        record(&self.repo, Platform::Ethereum, &contract)?;
        Ok(contract)
    }
}
