use std::{path::PathBuf, sync::Arc};

use mpl_token_metadata::accounts::Metadata;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use tracing::{info, warn};

use crate::{
    config::ExistingMetadata,
    core::{
        OffChainMetadata, OnChainMetadata, TokenMetadata, UploadFile, MAX_NAME_LENGTH,
        MAX_SYMBOL_LENGTH, MAX_URI_LENGTH,
    },
    error::{SdkError, SdkResult},
    instructions::{create_metadata_account, data_v2, update_metadata_account},
    ledger::Ledger,
    protocol::metadata_address,
    storage::Uploader,
    utils::Explorer,
};

/// Uploads token presentation data and links it to a mint
pub struct MetadataAttacher {
    ledger: Arc<dyn Ledger>,
    uploader: Arc<dyn Uploader>,
    explorer: Explorer,
    image_path: PathBuf,
    policy: ExistingMetadata,
}

impl MetadataAttacher {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        uploader: Arc<dyn Uploader>,
        explorer: impl Into<Explorer>,
        image_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ledger,
            uploader,
            explorer: explorer.into(),
            image_path: image_path.into(),
            policy: ExistingMetadata::Fail,
        }
    }

    /// Set the behaviour for mints that already carry metadata
    pub fn with_policy(mut self, policy: ExistingMetadata) -> Self {
        self.policy = policy;
        self
    }

    /// Upload image and JSON, then create the metadata account for `mint`
    ///
    /// `authority` must be the mint authority; it also pays and becomes the
    /// update authority. Returns `None` when existing metadata was skipped.
    pub async fn attach(
        &self,
        mint: &Pubkey,
        authority: &Keypair,
        metadata: &TokenMetadata,
    ) -> SdkResult<Option<Signature>> {
        validate_metadata(metadata)?;

        let (metadata_pda, _) = metadata_address(mint);
        if self.ledger.get_account(&metadata_pda).await?.is_some() {
            return match self.policy {
                ExistingMetadata::Fail => Err(SdkError::MetadataAlreadyExists {
                    mint: *mint,
                    metadata: metadata_pda,
                }),
                ExistingMetadata::Skip => {
                    warn!(
                        "Metadata {} already exists for mint {}, skipping",
                        metadata_pda, mint
                    );
                    Ok(None)
                }
                ExistingMetadata::Update => self.update(mint, authority, metadata).await.map(Some),
            };
        }

        let uri = self.upload_assets(metadata, authority).await?;

        let ix = create_metadata_account(
            mint,
            &authority.pubkey(),
            data_v2(&metadata.name, &metadata.symbol, &uri),
        );
        let signature = self.ledger.send_and_confirm(&[ix], authority, &[]).await?;

        info!("Create Metadata Account: {}", self.explorer.tx_url(&signature));
        Ok(Some(signature))
    }

    /// Re-upload image and JSON and replace the on-chain data of `mint`
    pub async fn update(
        &self,
        mint: &Pubkey,
        update_authority: &Keypair,
        metadata: &TokenMetadata,
    ) -> SdkResult<Signature> {
        validate_metadata(metadata)?;

        let uri = self.upload_assets(metadata, update_authority).await?;

        let ix = update_metadata_account(
            mint,
            &update_authority.pubkey(),
            data_v2(&metadata.name, &metadata.symbol, &uri),
        );
        let signature = self
            .ledger
            .send_and_confirm(&[ix], update_authority, &[])
            .await?;

        info!("Update Metadata Account: {}", self.explorer.tx_url(&signature));
        Ok(signature)
    }

    /// Read back the on-chain metadata of `mint`
    pub async fn fetch(&self, mint: &Pubkey) -> SdkResult<Option<OnChainMetadata>> {
        let (address, _) = metadata_address(mint);
        let Some(account) = self.ledger.get_account(&address).await? else {
            return Ok(None);
        };

        let state = Metadata::from_bytes(&account.data)
            .map_err(|e| SdkError::Serialization(format!("Metadata {}: {}", address, e)))?;

        Ok(Some(OnChainMetadata {
            address,
            mint: state.mint,
            update_authority: state.update_authority,
            name: trim_padding(&state.name),
            symbol: trim_padding(&state.symbol),
            uri: trim_padding(&state.uri),
            is_mutable: state.is_mutable,
        }))
    }

    /// Upload the image, then the JSON document pointing at it
    async fn upload_assets(&self, metadata: &TokenMetadata, payer: &Keypair) -> SdkResult<String> {
        let bytes = tokio::fs::read(&self.image_path)
            .await
            .map_err(|source| SdkError::FileRead {
                path: self.image_path.clone(),
                source,
            })?;
        let file_name = self
            .image_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image");

        let image_uri = self
            .uploader
            .upload(&UploadFile::new(file_name, bytes), payer)
            .await?;
        info!("image uri: {}", image_uri);

        let document = OffChainMetadata {
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            image: image_uri,
        };
        let uri = self
            .uploader
            .upload(&UploadFile::json("metadata.json", &document)?, payer)
            .await?;
        info!("metadata uri: {}", uri);

        if uri.len() > MAX_URI_LENGTH {
            return Err(SdkError::InvalidParameters(format!(
                "metadata uri exceeds {} bytes: {}",
                MAX_URI_LENGTH, uri
            )));
        }

        Ok(uri)
    }
}

fn validate_metadata(metadata: &TokenMetadata) -> SdkResult<()> {
    if metadata.name.len() > MAX_NAME_LENGTH {
        return Err(SdkError::InvalidParameters(format!(
            "name exceeds {} bytes",
            MAX_NAME_LENGTH
        )));
    }
    if metadata.symbol.len() > MAX_SYMBOL_LENGTH {
        return Err(SdkError::InvalidParameters(format!(
            "symbol exceeds {} bytes",
            MAX_SYMBOL_LENGTH
        )));
    }
    Ok(())
}

// On-chain strings are zero padded to their maximum length
fn trim_padding(value: &str) -> String {
    value.trim_end_matches('\0').to_string()
}
