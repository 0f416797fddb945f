//! In-memory ledger for offline flows and tests
//!
//! Executes system account creation, SPL token mint/account/supply
//! instructions, associated token account creation and token metadata
//! create/update. Transactions are atomic: state is only committed when
//! every instruction succeeds.

use std::collections::HashMap;

use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};
use mpl_token_metadata::{
    accounts::Metadata,
    instructions::{
        CreateMetadataAccountV3InstructionArgs, UpdateMetadataAccountV2InstructionArgs,
    },
    types::{Key, TokenStandard},
};
use solana_program::{
    program_option::COption, program_pack::Pack, system_instruction::SystemInstruction,
    system_program,
};
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    rent::Rent,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};
use spl_token::{
    instruction::TokenInstruction,
    state::{Account as TokenAccount, AccountState, Mint},
};
use tokio::sync::Mutex;
use tracing::debug;

use super::{collect_signers, Ledger};
use crate::{
    error::{SdkError, SdkResult},
    instructions::metadata::{CREATE_METADATA_V3_DISCRIMINATOR, UPDATE_METADATA_V2_DISCRIMINATOR},
    protocol::pda,
};

/// Fee charged to the payer per required signature
pub const FEE_LAMPORTS_PER_SIGNATURE: u64 = 5_000;

type Accounts = HashMap<Pubkey, Account>;
type ExecResult = Result<(), String>;

#[derive(Default)]
struct LedgerState {
    accounts: Accounts,
    transactions: Vec<Signature>,
}

/// Ledger held entirely in process memory
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit lamports to an address, creating a system account if needed
    pub async fn fund(&self, address: &Pubkey, lamports: u64) {
        let mut state = self.state.lock().await;
        credit(&mut state.accounts, address, lamports);
    }

    /// Insert or replace an account
    pub async fn set_account(&self, address: Pubkey, account: Account) {
        self.state.lock().await.accounts.insert(address, account);
    }

    /// Number of transactions committed so far
    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.transactions.len()
    }

    /// Signatures of committed transactions, oldest first
    pub async fn transactions(&self) -> Vec<Signature> {
        self.state.lock().await.transactions.clone()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(address).cloned())
    }

    async fn get_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        Ok(self
            .state
            .lock()
            .await
            .accounts
            .get(address)
            .map(|account| account.lamports)
            .unwrap_or(0))
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        Ok(Rent::default().minimum_balance(data_len))
    }

    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> SdkResult<Signature> {
        let signature = Signature::new_unique();
        let mut state = self.state.lock().await;
        credit(&mut state.accounts, to, lamports);
        state.transactions.push(signature);
        Ok(signature)
    }

    async fn send_and_confirm(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> SdkResult<Signature> {
        let mut tx = Transaction::new_with_payer(instructions, Some(&payer.pubkey()));
        tx.try_sign(&collect_signers(payer, signers), Hash::new_unique())
            .map_err(|e| SdkError::Ledger(format!("Transaction signature verification failed: {}", e)))?;
        let signature = tx.signatures[0];

        let mut state = self.state.lock().await;
        let mut working = state.accounts.clone();

        let fee = FEE_LAMPORTS_PER_SIGNATURE * tx.signatures.len() as u64;
        debit(&mut working, &payer.pubkey(), fee)
            .map_err(|_| SdkError::Ledger("Attempt to debit an account but found no record of a prior credit: insufficient funds for fee".to_string()))?;

        for (index, ix) in instructions.iter().enumerate() {
            execute(&mut working, ix).map_err(|msg| {
                SdkError::Ledger(format!(
                    "Transaction simulation failed: Error processing Instruction {}: {}",
                    index, msg
                ))
            })?;
        }

        state.accounts = working;
        state.transactions.push(signature);
        debug!("Committed transaction {} ({} instructions)", signature, instructions.len());

        Ok(signature)
    }
}

fn credit(accounts: &mut Accounts, address: &Pubkey, lamports: u64) {
    let account = accounts
        .entry(*address)
        .or_insert_with(|| Account::new(0, 0, &system_program::id()));
    account.lamports = account.lamports.saturating_add(lamports);
}

fn debit(accounts: &mut Accounts, address: &Pubkey, lamports: u64) -> ExecResult {
    let account = accounts
        .get_mut(address)
        .ok_or_else(|| format!("account {} not found", address))?;
    account.lamports = account
        .lamports
        .checked_sub(lamports)
        .ok_or_else(|| format!("insufficient lamports in {}", address))?;
    Ok(())
}

fn account_key(ix: &Instruction, index: usize) -> Result<Pubkey, String> {
    ix.accounts
        .get(index)
        .map(|meta| meta.pubkey)
        .ok_or_else(|| "not enough account keys given to the instruction".to_string())
}

fn exists(accounts: &Accounts, address: &Pubkey) -> bool {
    accounts
        .get(address)
        .map(|account| account.lamports > 0 || !account.data.is_empty())
        .unwrap_or(false)
}

/// Create a rent-exempt account funded by `payer`
fn create_funded(
    accounts: &mut Accounts,
    payer: &Pubkey,
    address: &Pubkey,
    owner: &Pubkey,
    data: Vec<u8>,
) -> ExecResult {
    if exists(accounts, address) {
        return Err(format!("account {} already in use", address));
    }
    let lamports = Rent::default().minimum_balance(data.len());
    debit(accounts, payer, lamports)?;
    accounts.insert(
        *address,
        Account {
            lamports,
            data,
            owner: *owner,
            executable: false,
            rent_epoch: 0,
        },
    );
    Ok(())
}

fn execute(accounts: &mut Accounts, ix: &Instruction) -> ExecResult {
    if ix.program_id == system_program::id() {
        execute_system(accounts, ix)
    } else if ix.program_id == spl_token::id() {
        execute_token(accounts, ix)
    } else if ix.program_id == spl_associated_token_account::id() {
        execute_associated_account(accounts, ix)
    } else if ix.program_id == mpl_token_metadata::ID {
        execute_metadata(accounts, ix)
    } else {
        Err(format!("unsupported program {}", ix.program_id))
    }
}

fn execute_system(accounts: &mut Accounts, ix: &Instruction) -> ExecResult {
    let instruction: SystemInstruction =
        bincode::deserialize(&ix.data).map_err(|e| format!("invalid instruction data: {}", e))?;

    match instruction {
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            let from = account_key(ix, 0)?;
            let to = account_key(ix, 1)?;
            if exists(accounts, &to) {
                return Err(format!("Create Account: account {} already in use", to));
            }
            debit(accounts, &from, lamports)?;
            accounts.insert(
                to,
                Account {
                    lamports,
                    data: vec![0; space as usize],
                    owner,
                    executable: false,
                    rent_epoch: 0,
                },
            );
            Ok(())
        }
        SystemInstruction::Transfer { lamports } => {
            let from = account_key(ix, 0)?;
            let to = account_key(ix, 1)?;
            debit(accounts, &from, lamports)?;
            credit(accounts, &to, lamports);
            Ok(())
        }
        other => Err(format!("unsupported system instruction {:?}", other)),
    }
}

fn load_mint(accounts: &Accounts, address: &Pubkey) -> Result<Mint, String> {
    let account = accounts
        .get(address)
        .ok_or_else(|| format!("mint {} not found", address))?;
    if account.owner != spl_token::id() {
        return Err(format!("mint {} is not owned by the token program", address));
    }
    Mint::unpack(&account.data).map_err(|e| format!("invalid mint {}: {}", address, e))
}

fn load_token_account(accounts: &Accounts, address: &Pubkey) -> Result<TokenAccount, String> {
    let account = accounts
        .get(address)
        .ok_or_else(|| format!("token account {} not found", address))?;
    if account.owner != spl_token::id() {
        return Err(format!(
            "token account {} is not owned by the token program",
            address
        ));
    }
    TokenAccount::unpack(&account.data).map_err(|e| format!("invalid token account {}: {}", address, e))
}

fn store_packed<T: Pack>(accounts: &mut Accounts, address: &Pubkey, state: T) -> ExecResult {
    let account = accounts
        .get_mut(address)
        .ok_or_else(|| format!("account {} not found", address))?;
    if account.data.len() != T::LEN {
        account.data = vec![0; T::LEN];
    }
    T::pack(state, &mut account.data).map_err(|e| e.to_string())
}

fn check_decimals(mint: &Mint, expected: Option<u8>) -> ExecResult {
    match expected {
        Some(decimals) if decimals != mint.decimals => Err(format!(
            "mint decimals mismatch: expected {}, got {}",
            mint.decimals, decimals
        )),
        _ => Ok(()),
    }
}

fn execute_token(accounts: &mut Accounts, ix: &Instruction) -> ExecResult {
    let instruction =
        TokenInstruction::unpack(&ix.data).map_err(|e| format!("invalid instruction data: {}", e))?;

    match instruction {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
        }
        | TokenInstruction::InitializeMint2 {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            let address = account_key(ix, 0)?;
            let account = accounts
                .get(&address)
                .ok_or_else(|| format!("mint {} not found", address))?;
            if account.owner != spl_token::id() || account.data.len() != Mint::LEN {
                return Err(format!("mint {} has the wrong owner or size", address));
            }
            if Mint::unpack_unchecked(&account.data)
                .map(|mint| mint.is_initialized)
                .unwrap_or(false)
            {
                return Err(format!("mint {} already initialized", address));
            }
            let mint = Mint {
                mint_authority: COption::Some(mint_authority),
                supply: 0,
                decimals,
                is_initialized: true,
                freeze_authority,
            };
            store_packed(accounts, &address, mint)
        }
        TokenInstruction::MintTo { amount } => mint_to(accounts, ix, amount, None),
        TokenInstruction::MintToChecked { amount, decimals } => {
            mint_to(accounts, ix, amount, Some(decimals))
        }
        TokenInstruction::Transfer { amount } => {
            let source = account_key(ix, 0)?;
            let destination = account_key(ix, 1)?;
            let authority = account_key(ix, 2)?;
            transfer(accounts, &source, None, &destination, &authority, amount, None)
        }
        TokenInstruction::TransferChecked { amount, decimals } => {
            let source = account_key(ix, 0)?;
            let mint = account_key(ix, 1)?;
            let destination = account_key(ix, 2)?;
            let authority = account_key(ix, 3)?;
            transfer(
                accounts,
                &source,
                Some(&mint),
                &destination,
                &authority,
                amount,
                Some(decimals),
            )
        }
        TokenInstruction::Burn { amount } => burn(accounts, ix, amount, None),
        TokenInstruction::BurnChecked { amount, decimals } => {
            burn(accounts, ix, amount, Some(decimals))
        }
        _ => Err("unsupported token instruction".to_string()),
    }
}

fn mint_to(accounts: &mut Accounts, ix: &Instruction, amount: u64, decimals: Option<u8>) -> ExecResult {
    let mint_address = account_key(ix, 0)?;
    let destination = account_key(ix, 1)?;
    let authority = account_key(ix, 2)?;

    let mut mint = load_mint(accounts, &mint_address)?;
    check_decimals(&mint, decimals)?;
    if mint.mint_authority != COption::Some(authority) {
        return Err("owner does not match mint authority".to_string());
    }

    let mut target = load_token_account(accounts, &destination)?;
    if target.mint != mint_address {
        return Err("account not associated with this mint".to_string());
    }

    mint.supply = mint.supply.checked_add(amount).ok_or("supply overflow")?;
    target.amount = target.amount.checked_add(amount).ok_or("balance overflow")?;

    store_packed(accounts, &mint_address, mint)?;
    store_packed(accounts, &destination, target)
}

fn transfer(
    accounts: &mut Accounts,
    source: &Pubkey,
    mint: Option<&Pubkey>,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: Option<u8>,
) -> ExecResult {
    let mut from = load_token_account(accounts, source)?;
    let mut to = load_token_account(accounts, destination)?;

    if from.mint != to.mint {
        return Err("account not associated with this mint".to_string());
    }
    if let Some(mint) = mint {
        if *mint != from.mint {
            return Err("account not associated with this mint".to_string());
        }
        check_decimals(&load_mint(accounts, mint)?, decimals)?;
    }
    if from.owner != *authority {
        return Err("owner does not match".to_string());
    }
    if from.amount < amount {
        return Err("insufficient funds".to_string());
    }

    if source == destination {
        return Ok(());
    }

    from.amount -= amount;
    to.amount = to.amount.checked_add(amount).ok_or("balance overflow")?;

    store_packed(accounts, source, from)?;
    store_packed(accounts, destination, to)
}

fn burn(accounts: &mut Accounts, ix: &Instruction, amount: u64, decimals: Option<u8>) -> ExecResult {
    let address = account_key(ix, 0)?;
    let mint_address = account_key(ix, 1)?;
    let authority = account_key(ix, 2)?;

    let mut holder = load_token_account(accounts, &address)?;
    let mut mint = load_mint(accounts, &mint_address)?;
    check_decimals(&mint, decimals)?;

    if holder.mint != mint_address {
        return Err("account not associated with this mint".to_string());
    }
    if holder.owner != authority {
        return Err("owner does not match".to_string());
    }
    if holder.amount < amount {
        return Err("insufficient funds".to_string());
    }

    holder.amount -= amount;
    mint.supply = mint.supply.saturating_sub(amount);

    store_packed(accounts, &address, holder)?;
    store_packed(accounts, &mint_address, mint)
}

fn execute_associated_account(accounts: &mut Accounts, ix: &Instruction) -> ExecResult {
    let idempotent = match ix.data.first() {
        None | Some(0) => false,
        Some(1) => true,
        Some(other) => return Err(format!("unsupported associated token instruction {}", other)),
    };

    let funding = account_key(ix, 0)?;
    let address = account_key(ix, 1)?;
    let wallet = account_key(ix, 2)?;
    let mint = account_key(ix, 3)?;

    if address != pda::associated_token_address(&wallet, &mint) {
        return Err("associated address does not match seed derivation".to_string());
    }
    load_mint(accounts, &mint)?;

    if exists(accounts, &address) {
        let existing = load_token_account(accounts, &address)?;
        if idempotent && existing.owner == wallet && existing.mint == mint {
            return Ok(());
        }
        return Err(format!("account {} already in use", address));
    }

    let state = TokenAccount {
        mint,
        owner: wallet,
        amount: 0,
        delegate: COption::None,
        state: AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };
    let mut data = vec![0; TokenAccount::LEN];
    TokenAccount::pack(state, &mut data).map_err(|e| e.to_string())?;

    create_funded(accounts, &funding, &address, &spl_token::id(), data)
}

fn execute_metadata(accounts: &mut Accounts, ix: &Instruction) -> ExecResult {
    match ix.data.first() {
        Some(&CREATE_METADATA_V3_DISCRIMINATOR) => create_metadata(accounts, ix),
        Some(&UPDATE_METADATA_V2_DISCRIMINATOR) => update_metadata(accounts, ix),
        _ => Err("unsupported token metadata instruction".to_string()),
    }
}

fn create_metadata(accounts: &mut Accounts, ix: &Instruction) -> ExecResult {
    let args = CreateMetadataAccountV3InstructionArgs::try_from_slice(&ix.data[1..])
        .map_err(|e| format!("invalid instruction data: {}", e))?;

    let metadata = account_key(ix, 0)?;
    let mint_address = account_key(ix, 1)?;
    let mint_authority = account_key(ix, 2)?;
    let payer = account_key(ix, 3)?;
    let update_authority = account_key(ix, 4)?;

    if metadata != pda::metadata_address(&mint_address).0 {
        return Err("metadata address does not match seed derivation".to_string());
    }
    let mint = load_mint(accounts, &mint_address)?;
    if mint.mint_authority != COption::Some(mint_authority) {
        return Err("mint authority provided does not match the authority on the mint".to_string());
    }

    let state = Metadata {
        key: Key::MetadataV1,
        update_authority,
        mint: mint_address,
        name: args.data.name,
        symbol: args.data.symbol,
        uri: args.data.uri,
        seller_fee_basis_points: args.data.seller_fee_basis_points,
        creators: args.data.creators,
        primary_sale_happened: false,
        is_mutable: args.is_mutable,
        edition_nonce: None,
        token_standard: Some(TokenStandard::Fungible),
        collection: args.data.collection,
        uses: args.data.uses,
        collection_details: None,
        programmable_config: None,
    };
    let data = state.try_to_vec().map_err(|e| e.to_string())?;

    create_funded(accounts, &payer, &metadata, &mpl_token_metadata::ID, data)
}

fn update_metadata(accounts: &mut Accounts, ix: &Instruction) -> ExecResult {
    let args = UpdateMetadataAccountV2InstructionArgs::try_from_slice(&ix.data[1..])
        .map_err(|e| format!("invalid instruction data: {}", e))?;

    let address = account_key(ix, 0)?;
    let authority = account_key(ix, 1)?;

    let account = accounts
        .get_mut(&address)
        .filter(|account| account.owner == mpl_token_metadata::ID)
        .ok_or_else(|| format!("metadata account {} not found", address))?;
    let mut state = Metadata::from_bytes(&account.data).map_err(|e| e.to_string())?;

    if state.update_authority != authority {
        return Err("update authority is invalid".to_string());
    }
    if !state.is_mutable {
        return Err("data is immutable".to_string());
    }

    if let Some(data) = args.data {
        state.name = data.name;
        state.symbol = data.symbol;
        state.uri = data.uri;
        state.seller_fee_basis_points = data.seller_fee_basis_points;
        state.creators = data.creators;
        state.collection = data.collection;
        state.uses = data.uses;
    }
    if let Some(new_authority) = args.new_update_authority {
        state.update_authority = new_authority;
    }
    if let Some(true) = args.primary_sale_happened {
        state.primary_sale_happened = true;
    }
    if let Some(is_mutable) = args.is_mutable {
        if is_mutable && !state.is_mutable {
            return Err("is_mutable can only be flipped to false".to_string());
        }
        state.is_mutable = is_mutable;
    }

    account.data = state.try_to_vec().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_instruction;

    #[tokio::test]
    async fn test_fee_requires_funded_payer() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::new();
        let recipient = Pubkey::new_unique();

        let ix = system_instruction::transfer(&payer.pubkey(), &recipient, 1);
        let err = ledger.send_and_confirm(&[ix], &payer, &[]).await.unwrap_err();
        assert!(matches!(err, SdkError::Ledger(_)));
        assert_eq!(ledger.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_transfer_commits_atomically() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::new();
        let recipient = Pubkey::new_unique();
        ledger.fund(&payer.pubkey(), 1_000_000).await;

        // Second instruction overdraws, so neither may apply
        let ok = system_instruction::transfer(&payer.pubkey(), &recipient, 100);
        let overdraw = system_instruction::transfer(&payer.pubkey(), &recipient, 10_000_000);
        assert!(ledger
            .send_and_confirm(&[ok.clone(), overdraw], &payer, &[])
            .await
            .is_err());
        assert_eq!(ledger.get_balance(&recipient).await.unwrap(), 0);
        assert_eq!(ledger.get_balance(&payer.pubkey()).await.unwrap(), 1_000_000);

        ledger.send_and_confirm(&[ok], &payer, &[]).await.unwrap();
        assert_eq!(ledger.get_balance(&recipient).await.unwrap(), 100);
        assert_eq!(
            ledger.get_balance(&payer.pubkey()).await.unwrap(),
            1_000_000 - 100 - FEE_LAMPORTS_PER_SIGNATURE
        );
        assert_eq!(ledger.transaction_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_signer_is_rejected() {
        let ledger = MemoryLedger::new();
        let payer = Keypair::new();
        let other = Keypair::new();
        ledger.fund(&payer.pubkey(), 1_000_000).await;
        ledger.fund(&other.pubkey(), 1_000_000).await;

        // `other` must sign to move its own lamports
        let ix = system_instruction::transfer(&other.pubkey(), &payer.pubkey(), 10);
        let err = ledger.send_and_confirm(&[ix], &payer, &[]).await.unwrap_err();
        assert!(err.to_string().contains("signature"));
    }

    #[tokio::test]
    async fn test_airdrop_credits_balance() {
        let ledger = MemoryLedger::new();
        let address = Pubkey::new_unique();
        ledger.request_airdrop(&address, 42).await.unwrap();
        ledger.request_airdrop(&address, 8).await.unwrap();
        assert_eq!(ledger.get_balance(&address).await.unwrap(), 50);
    }
}
