//! Token client and metadata attacher

pub mod account;
pub mod metadata;
pub mod mint;
pub mod supply;

use std::sync::Arc;

use solana_sdk::{
    account::Account,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
};

use crate::{error::SdkResult, ledger::Ledger, utils::Explorer};

pub use metadata::MetadataAttacher;

/// Client for mint creation, account provisioning and supply operations
#[derive(Clone)]
pub struct TokenClient {
    ledger: Arc<dyn Ledger>,
    explorer: Explorer,
}

impl TokenClient {
    pub fn new(ledger: Arc<dyn Ledger>, explorer: impl Into<Explorer>) -> Self {
        Self {
            ledger,
            explorer: explorer.into(),
        }
    }

    /// Get the ledger handle
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Explorer used for logged links
    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// Fetch an account
    pub async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        self.ledger.get_account(address).await
    }

    /// Send a transaction
    pub async fn send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> SdkResult<Signature> {
        self.ledger.send_and_confirm(instructions, payer, signers).await
    }
}
