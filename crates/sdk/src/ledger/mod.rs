//! Ledger access abstraction
//!
//! Everything the SDK needs from a cluster goes through [`Ledger`]: account
//! reads, balances, airdrops and single-shot transaction submission. The
//! RPC implementation talks to a real cluster; the in-memory one executes the
//! instruction subset this SDK emits so flows can be tested offline.

pub mod memory;
pub mod rpc;

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};

use crate::error::SdkResult;

pub use memory::MemoryLedger;
pub use rpc::RpcLedger;

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Fetch an account, `None` when it does not exist
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>>;

    /// Lamport balance of an address
    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64>;

    /// Lamports required for a rent-exempt account of `data_len` bytes
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64>;

    /// Request an airdrop and wait until it lands
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> SdkResult<Signature>;

    /// Sign, submit and confirm one transaction paid for by `payer`
    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> SdkResult<Signature>;
}

/// Payer first, then every extra signer not already present
pub(crate) fn collect_signers<'a>(payer: &'a Keypair, signers: &[&'a Keypair]) -> Vec<&'a Keypair> {
    let mut all_signers = vec![payer];
    for signer in signers {
        if !all_signers.iter().any(|s| s.pubkey() == signer.pubkey()) {
            all_signers.push(*signer);
        }
    }
    all_signers
}
