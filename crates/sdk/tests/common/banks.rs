//! Ledger running the bundled SPL Token and Associated Token Account
//! programs inside a program-test bank

use async_trait::async_trait;
use mintkit_sdk::{Ledger, SdkError, SdkResult};
use solana_program_test::{BanksClient, ProgramTest};
use solana_sdk::{
    account::Account,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};
use tokio::sync::Mutex;

pub struct BanksLedger {
    banks: Mutex<BanksClient>,
    faucet: Keypair,
    sent: Mutex<Vec<Signature>>,
}

impl BanksLedger {
    /// Start a bank with the default program set
    pub async fn start() -> Self {
        let (banks, faucet, _) = ProgramTest::default().start().await;
        Self {
            banks: Mutex::new(banks),
            faucet,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Number of transactions processed through this ledger
    pub async fn transaction_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    async fn process(&self, instructions: &[Instruction], signers: &[&Keypair]) -> SdkResult<Signature> {
        let mut banks = self.banks.lock().await;
        let blockhash = banks.get_latest_blockhash().await.map_err(ledger_error)?;

        let mut tx = Transaction::new_with_payer(instructions, Some(&signers[0].pubkey()));
        tx.try_sign(&signers.to_vec(), blockhash).map_err(ledger_error)?;
        let signature = tx.signatures[0];

        banks.process_transaction(tx).await.map_err(ledger_error)?;
        self.sent.lock().await.push(signature);
        Ok(signature)
    }
}

fn ledger_error(err: impl std::fmt::Display) -> SdkError {
    SdkError::Ledger(err.to_string())
}

#[async_trait]
impl Ledger for BanksLedger {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        self.banks
            .lock()
            .await
            .get_account(*address)
            .await
            .map_err(ledger_error)
    }

    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        self.banks
            .lock()
            .await
            .get_balance(*address)
            .await
            .map_err(ledger_error)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        let rent = self.banks.lock().await.get_rent().await.map_err(ledger_error)?;
        Ok(rent.minimum_balance(data_len))
    }

    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        let ix = system_instruction::transfer(&self.faucet.pubkey(), to, lamports);
        self.process(&[ix], &[&self.faucet]).await
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> SdkResult<Signature> {
        let mut all_signers = vec![payer];
        for signer in signers {
            if !all_signers.iter().any(|s| s.pubkey() == signer.pubkey()) {
                all_signers.push(*signer);
            }
        }
        self.process(instructions, &all_signers).await
    }
}
