//! Sequential launch: identity, mint, metadata, account, supply
//!
//! Each stage awaits its external calls before the next begins. Errors are
//! tagged with the [`Stage`] that produced them; nothing is retried or rolled
//! back.

use std::sync::Arc;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tracing::info;

use crate::{
    client::{MetadataAttacher, TokenClient},
    config::LaunchConfig,
    error::{LaunchError, SdkError, Stage},
    identity::IdentityProvider,
    ledger::Ledger,
    storage::Uploader,
};

/// Addresses and signatures produced by a launch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LaunchReport {
    pub payer: Pubkey,
    pub mint: Pubkey,
    pub metadata_signature: Option<Signature>,
    pub token_account: Option<Pubkey>,
    pub mint_signature: Option<Signature>,
    pub transfer_signature: Option<Signature>,
    pub burn_signature: Option<Signature>,
}

/// Run every configured stage in order
pub async fn run(
    config: &LaunchConfig,
    ledger: Arc<dyn Ledger>,
    uploader: Arc<dyn Uploader>,
    identity: &dyn IdentityProvider,
) -> Result<LaunchReport, LaunchError> {
    let client = TokenClient::new(ledger.clone(), config.explorer());

    let payer = identity
        .acquire(ledger.as_ref())
        .await
        .map_err(|e| e.at(Stage::Identity))?;
    info!("Payer: {}", payer.pubkey());

    let mut report = LaunchReport {
        payer: payer.pubkey(),
        ..LaunchReport::default()
    };

    report.mint = match config.token.mint {
        Some(mint) => {
            info!("Using existing mint {}", mint);
            mint
        }
        None => client
            .create_mint(
                &payer,
                &payer.pubkey(),
                Some(&payer.pubkey()),
                config.token.decimals,
            )
            .await
            .map_err(|e| e.at(Stage::Mint))?,
    };

    if config.token.attach_metadata {
        let attacher = MetadataAttacher::new(
            ledger.clone(),
            uploader,
            config.explorer(),
            config.token.image_path.clone(),
        )
        .with_policy(config.token.existing_metadata);

        report.metadata_signature = attacher
            .attach(&report.mint, &payer, &config.token_metadata())
            .await
            .map_err(|e| e.at(Stage::Metadata))?;
    }

    let supply = &config.supply;
    let needs_account = supply.provision_account
        || supply.mint_amount.is_some()
        || supply.transfer.is_some()
        || supply.burn_amount.is_some();
    if !needs_account {
        return Ok(report);
    }

    let owner = supply.owner.unwrap_or_else(|| payer.pubkey());
    let account = client
        .get_or_create_token_account(&payer, &report.mint, &owner)
        .await
        .map_err(|e| e.at(Stage::Account))?;
    report.token_account = Some(account);

    if let Some(amount) = supply.mint_amount {
        report.mint_signature = Some(
            client
                .mint_tokens(&payer, &report.mint, &account, &payer, amount)
                .await
                .map_err(|e| e.at(Stage::Supply))?,
        );
    }

    if let Some(transfer) = &supply.transfer {
        let source_owner = signing_owner(&payer, &owner).map_err(|e| e.at(Stage::Supply))?;
        let destination = client
            .get_or_create_token_account(&payer, &report.mint, &transfer.recipient)
            .await
            .map_err(|e| e.at(Stage::Account))?;

        report.transfer_signature = Some(
            client
                .transfer_tokens(
                    &payer,
                    &report.mint,
                    &account,
                    &destination,
                    source_owner,
                    transfer.amount,
                )
                .await
                .map_err(|e| e.at(Stage::Supply))?,
        );
    }

    if let Some(amount) = supply.burn_amount {
        let account_owner = signing_owner(&payer, &owner).map_err(|e| e.at(Stage::Supply))?;
        report.burn_signature = Some(
            client
                .burn_tokens(&payer, &report.mint, &account, account_owner, amount)
                .await
                .map_err(|e| e.at(Stage::Supply))?,
        );
    }

    Ok(report)
}

// Transfers and burns need the account owner's signature, and the only key
// held in memory is the payer.
fn signing_owner<'a>(payer: &'a Keypair, owner: &Pubkey) -> Result<&'a Keypair, SdkError> {
    if payer.pubkey() == *owner {
        Ok(payer)
    } else {
        Err(SdkError::InvalidParameters(format!(
            "account owner {} is not the payer; cannot sign transfers or burns",
            owner
        )))
    }
}
