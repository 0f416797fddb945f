use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use tracing::debug;

use super::{collect_signers, Ledger};
use crate::error::{SdkError, SdkResult};

/// Ledger backed by a JSON-RPC endpoint
pub struct RpcLedger {
    rpc: Arc<RpcClient>,
}

impl RpcLedger {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_commitment(
                rpc_url.to_string(),
                commitment,
            )),
        }
    }

    pub fn with_client(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Get the RPC client
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Get the RPC endpoint URL
    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        Ok(self.rpc.get_balance(address).await?)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        Ok(self
            .rpc
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        let signature = self.rpc.request_airdrop(to, lamports).await?;
        debug!("Airdrop requested: {}", signature);
        self.rpc.poll_for_signature(&signature).await?;
        Ok(signature)
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> SdkResult<Signature> {
        let recent_blockhash = self.rpc.get_latest_blockhash().await?;

        let mut tx = Transaction::new_with_payer(instructions, Some(&payer.pubkey()));
        tx.try_sign(&collect_signers(payer, signers), recent_blockhash)
            .map_err(|e| SdkError::Ledger(format!("Failed to sign transaction: {}", e)))?;

        Ok(self.rpc.send_and_confirm_transaction(&tx).await?)
    }
}
