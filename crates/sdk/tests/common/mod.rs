//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod banks;

use std::{io::Write, sync::Arc};

use async_trait::async_trait;
use mintkit_sdk::{Cluster, Ledger, MemoryLedger, TokenClient, LAMPORTS_PER_SOL};
use solana_sdk::{signature::Keypair, signer::Signer};
use tempfile::NamedTempFile;

use self::banks::BanksLedger;

/// Smallest valid PNG: 1x1 RGBA pixel
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xf8,
    0xcf, 0xc0, 0xf0, 0x1f, 0x00, 0x05, 0x00, 0x01, 0xff, 0x89, 0x99, 0x3d, 0x1d, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Ledger that reports how many transactions it committed
#[async_trait]
pub trait CountingLedger: Ledger + 'static {
    async fn transaction_count(&self) -> usize;
}

#[async_trait]
impl CountingLedger for MemoryLedger {
    async fn transaction_count(&self) -> usize {
        MemoryLedger::transaction_count(self).await
    }
}

#[async_trait]
impl CountingLedger for BanksLedger {
    async fn transaction_count(&self) -> usize {
        BanksLedger::transaction_count(self).await
    }
}

pub struct Fixture<L = MemoryLedger> {
    pub ledger: Arc<L>,
    pub client: TokenClient,
    pub payer: Keypair,
}

impl<L: CountingLedger> Fixture<L> {
    fn new(ledger: Arc<L>, payer: Keypair) -> Self {
        let client = TokenClient::new(ledger.clone(), Cluster::Localnet);
        Self {
            ledger,
            client,
            payer,
        }
    }
}

/// In-memory ledger with a payer holding 10 SOL
pub async fn funded_fixture() -> Fixture {
    let ledger = Arc::new(MemoryLedger::new());
    let payer = Keypair::new();
    ledger.fund(&payer.pubkey(), 10 * LAMPORTS_PER_SOL).await;
    Fixture::new(ledger, payer)
}

/// Program-test bank with a payer holding 10 SOL
pub async fn program_fixture() -> Fixture<BanksLedger> {
    let ledger = Arc::new(BanksLedger::start().await);
    let payer = Keypair::new();
    ledger
        .request_airdrop(&payer.pubkey(), 10 * LAMPORTS_PER_SOL)
        .await
        .unwrap();
    Fixture::new(ledger, payer)
}

/// Temporary PNG file holding [`PNG_BYTES`]
pub fn image_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("coinimg")
        .suffix(".png")
        .tempfile()
        .unwrap();
    file.write_all(PNG_BYTES).unwrap();
    file.flush().unwrap();
    file
}
