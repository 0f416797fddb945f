use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tracing::info;

use super::TokenClient;
use crate::{error::SdkResult, instructions, utils::to_base_units};

impl TokenClient {
    /// Mint `amount` whole units to `destination`
    pub async fn mint_tokens(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
    ) -> SdkResult<Signature> {
        let decimals = self.get_mint(mint).await?.decimals;
        let base_units = to_base_units(amount, decimals)?;

        let ix = instructions::mint_to(mint, destination, &authority.pubkey(), base_units, decimals)?;
        let signature = self.send_transaction(&[ix], payer, &[authority]).await?;

        info!("Mint Token Transaction: {}", self.explorer.tx_url(&signature));
        Ok(signature)
    }

    /// Move `amount` whole units from `source` to `destination`
    pub async fn transfer_tokens(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        source: &Pubkey,
        destination: &Pubkey,
        owner: &Keypair,
        amount: u64,
    ) -> SdkResult<Signature> {
        let decimals = self.get_mint(mint).await?.decimals;
        let base_units = to_base_units(amount, decimals)?;

        let ix = instructions::transfer(
            source,
            mint,
            destination,
            &owner.pubkey(),
            base_units,
            decimals,
        )?;
        let signature = self.send_transaction(&[ix], payer, &[owner]).await?;

        info!("Transfer Transaction: {}", self.explorer.tx_url(&signature));
        Ok(signature)
    }

    /// Destroy `amount` whole units held in `account`
    pub async fn burn_tokens(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        account: &Pubkey,
        owner: &Keypair,
        amount: u64,
    ) -> SdkResult<Signature> {
        let decimals = self.get_mint(mint).await?.decimals;
        let base_units = to_base_units(amount, decimals)?;

        let ix = instructions::burn(account, mint, &owner.pubkey(), base_units, decimals)?;
        let signature = self.send_transaction(&[ix], payer, &[owner]).await?;

        info!("Burn Transaction: {}", self.explorer.tx_url(&signature));
        Ok(signature)
    }
}
