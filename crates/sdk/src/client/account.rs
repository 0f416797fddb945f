use solana_program::program_pack::Pack;
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use spl_token::state::Account as TokenAccount;
use tracing::{debug, info};

use super::TokenClient;
use crate::{
    core::TokenAccountInfo,
    error::{SdkError, SdkResult},
    instructions,
    protocol::associated_token_address,
};

impl TokenClient {
    /// Return `owner`'s associated token account for `mint`, creating it if missing
    pub async fn get_or_create_token_account(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> SdkResult<Pubkey> {
        let address = associated_token_address(owner, mint);

        if self.get_account(&address).await?.is_some() {
            debug!("Token account {} already exists", address);
        } else {
            let ix = instructions::create_associated_account(&payer.pubkey(), owner, mint);
            self.send_transaction(&[ix], payer, &[]).await?;
        }

        info!("Token Account: {}", self.explorer.address_url(&address));
        Ok(address)
    }

    /// Fetch and decode a token account
    pub async fn get_token_account(&self, address: &Pubkey) -> SdkResult<TokenAccountInfo> {
        let account = self
            .get_account(address)
            .await?
            .ok_or_else(|| SdkError::AccountNotFound(format!("Token account {}", address)))?;

        if account.owner != spl_token::id() {
            return Err(SdkError::InvalidParameters(format!(
                "{} is not owned by the token program",
                address
            )));
        }

        let state = TokenAccount::unpack(&account.data)
            .map_err(|e| SdkError::Serialization(format!("Token account {}: {}", address, e)))?;

        Ok(TokenAccountInfo {
            address: *address,
            mint: state.mint,
            owner: state.owner,
            amount: state.amount,
        })
    }

    /// Balance of a token account in base units
    pub async fn token_balance(&self, address: &Pubkey) -> SdkResult<u64> {
        Ok(self.get_token_account(address).await?.amount)
    }
}
