use std::{collections::HashMap, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
};
use tracing::{debug, info};

use super::{
    data_item::{DataItem, Tag},
    Uploader,
};
use crate::{
    config::StorageConfig,
    core::{UploadFile, STORAGE_CURRENCY, STORAGE_PRICE_MARGIN_PERCENT},
    error::{SdkError, SdkResult},
    ledger::Ledger,
};

/// Receipt returned by the node for an accepted data item
#[derive(Debug, Deserialize)]
struct UploadReceipt {
    id: String,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    addresses: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: Value,
}

/// Uploads signed data items to a Bundlr node, paying in SOL
pub struct BundlrUploader {
    http: reqwest::Client,
    address: String,
    gateway: String,
    ledger: Arc<dyn Ledger>,
    auto_fund: bool,
}

impl BundlrUploader {
    pub fn new(config: &StorageConfig, ledger: Arc<dyn Ledger>) -> SdkResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            address: config.address.trim_end_matches('/').to_string(),
            gateway: config.gateway.trim_end_matches('/').to_string(),
            ledger,
            auto_fund: config.auto_fund,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.address, path)
    }

    /// Endpoint data items are posted to
    pub fn upload_url(&self) -> String {
        self.endpoint(&format!("tx/{}", STORAGE_CURRENCY))
    }

    /// URI under which the item with `id` is served
    pub fn content_uri(&self, id: &str) -> String {
        format!("{}/{}", self.gateway, id)
    }

    /// Lamports the node charges for storing `bytes`
    pub async fn price(&self, bytes: usize) -> SdkResult<u64> {
        let url = self.endpoint(&format!("price/{}/{}", STORAGE_CURRENCY, bytes));
        let response = checked(self.http.get(url).send().await?, "price quote").await?;
        parse_amount(&response.text().await?)
    }

    /// Lamports `owner` has on deposit with the node
    pub async fn balance(&self, owner: &Pubkey) -> SdkResult<u64> {
        let url = self.endpoint(&format!("account/balance/{}", STORAGE_CURRENCY));
        let response = self
            .http
            .get(url)
            .query(&[("address", owner.to_string())])
            .send()
            .await?;
        let body: BalanceResponse = checked(response, "balance query").await?.json().await?;

        match body.balance {
            Value::String(amount) => parse_amount(&amount),
            Value::Number(amount) => parse_amount(&amount.to_string()),
            other => Err(SdkError::Serialization(format!(
                "Unexpected balance value: {}",
                other
            ))),
        }
    }

    /// Wallet the node accepts deposits on
    pub async fn funding_address(&self) -> SdkResult<Pubkey> {
        let response = checked(self.http.get(self.endpoint("info")).send().await?, "info").await?;
        let info: NodeInfo = response.json().await?;

        let address = info.addresses.get(STORAGE_CURRENCY).ok_or_else(|| {
            SdkError::Upload(format!("Storage node has no {} address", STORAGE_CURRENCY))
        })?;
        Pubkey::from_str(address)
            .map_err(|e| SdkError::Upload(format!("Invalid node address {}: {}", address, e)))
    }

    /// Deposit `lamports` with the node and register the transfer
    pub async fn fund(&self, signer: &Keypair, lamports: u64) -> SdkResult<Signature> {
        let node = self.funding_address().await?;
        let ix = system_instruction::transfer(&signer.pubkey(), &node, lamports);
        let signature = self.ledger.send_and_confirm(&[ix], signer, &[]).await?;

        let url = self.endpoint(&format!("account/balance/{}", STORAGE_CURRENCY));
        let response = self
            .http
            .post(url)
            .json(&json!({ "tx_id": signature.to_string() }))
            .send()
            .await?;
        checked(response, "funding transaction").await?;

        info!("Funded storage node {} with {} lamports: {}", node, lamports, signature);
        Ok(signature)
    }

    async fn ensure_funded(&self, signer: &Keypair, bytes: usize) -> SdkResult<()> {
        let price = with_margin(self.price(bytes).await?)?;
        let balance = self.balance(&signer.pubkey()).await?;
        if balance >= price {
            debug!("Storage balance {} covers price {}", balance, price);
            return Ok(());
        }

        self.fund(signer, price - balance).await?;
        Ok(())
    }
}

#[async_trait]
impl Uploader for BundlrUploader {
    async fn upload(&self, file: &UploadFile, signer: &Keypair) -> SdkResult<String> {
        let anchor: [u8; 32] = rand::random();
        let item = DataItem::sign(
            signer,
            file.bytes.clone(),
            vec![Tag::new("Content-Type", file.content_type.as_str())],
            Some(anchor),
        )?;
        let bytes = item.to_bytes()?;
        debug!(
            "Uploading {} as data item {} ({} bytes, {})",
            file.name,
            item.id(),
            bytes.len(),
            file.content_type
        );

        if self.auto_fund {
            self.ensure_funded(signer, bytes.len()).await?;
        }

        let response = self
            .http
            .post(self.upload_url())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        let receipt: UploadReceipt = checked(response, &file.name).await?.json().await?;

        Ok(self.content_uri(&receipt.id))
    }
}

async fn checked(response: Response, action: &str) -> SdkResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SdkError::Upload(format!(
        "Storage node rejected {} with {}: {}",
        action, status, body
    )))
}

fn parse_amount(value: &str) -> SdkResult<u64> {
    let value = value.trim().trim_matches('"');
    value
        .parse::<u64>()
        .map_err(|_| SdkError::Serialization(format!("Invalid lamport amount: {}", value)))
}

fn with_margin(price: u64) -> SdkResult<u64> {
    price
        .checked_mul(100 + STORAGE_PRICE_MARGIN_PERCENT)
        .map(|scaled| scaled.div_ceil(100))
        .ok_or(SdkError::MathOverflow)
}
