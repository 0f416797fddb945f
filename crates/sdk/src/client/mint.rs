use solana_program::{program_option::COption, program_pack::Pack};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use spl_token::state::Mint;
use tracing::info;

use super::TokenClient;
use crate::{
    core::MintInfo,
    error::{SdkError, SdkResult},
    instructions,
};

impl TokenClient {
    /// Create a new mint and return its address
    pub async fn create_mint(
        &self,
        payer: &Keypair,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> SdkResult<Pubkey> {
        let mint = Keypair::new();
        let rent = self
            .ledger
            .minimum_balance_for_rent_exemption(Mint::LEN)
            .await?;

        let ixs = instructions::create_mint(
            &payer.pubkey(),
            &mint.pubkey(),
            mint_authority,
            freeze_authority,
            decimals,
            rent,
        )?;
        self.send_transaction(&ixs, payer, &[&mint]).await?;

        let address = mint.pubkey();
        info!("The token mint account address is {}", address);
        info!("Token Mint: {}", self.explorer.address_url(&address));

        Ok(address)
    }

    /// Fetch and decode a mint
    pub async fn get_mint(&self, mint: &Pubkey) -> SdkResult<MintInfo> {
        let account = self
            .get_account(mint)
            .await?
            .ok_or_else(|| SdkError::AccountNotFound(format!("Mint {}", mint)))?;

        if account.owner != spl_token::id() {
            return Err(SdkError::InvalidParameters(format!(
                "{} is not owned by the token program",
                mint
            )));
        }

        let state = Mint::unpack(&account.data)
            .map_err(|e| SdkError::Serialization(format!("Mint {}: {}", mint, e)))?;

        Ok(MintInfo {
            address: *mint,
            decimals: state.decimals,
            supply: state.supply,
            mint_authority: into_option(state.mint_authority),
            freeze_authority: into_option(state.freeze_authority),
        })
    }
}

fn into_option(value: COption<Pubkey>) -> Option<Pubkey> {
    match value {
        COption::Some(key) => Some(key),
        COption::None => None,
    }
}
