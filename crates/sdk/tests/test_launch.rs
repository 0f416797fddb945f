//! End-to-end launch sequence with stage attribution

mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::common::{funded_fixture, image_file};
    use mintkit_sdk::{
        launch, protocol::associated_token_address, Cluster, LaunchConfig, MemoryLedger,
        MemoryUploader, MetadataAttacher, SdkError, Stage, StaticIdentity, TransferConfig,
    };
    use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
    use tempfile::NamedTempFile;

    fn local_config(image: &NamedTempFile) -> LaunchConfig {
        let mut config = LaunchConfig::default();
        config.cluster = Cluster::Localnet;
        config.token.mint = None;
        config.token.image_path = image.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_full_launch_mints_transfers_and_burns() {
        let fx = funded_fixture().await;
        let image = image_file();
        let uploader = Arc::new(MemoryUploader::new());
        let recipient = Pubkey::new_unique();

        let mut config = local_config(&image);
        config.supply.mint_amount = Some(5);
        config.supply.transfer = Some(TransferConfig {
            recipient,
            amount: 2,
        });
        config.supply.burn_amount = Some(1);

        let identity = StaticIdentity::new(fx.payer.insecure_clone());
        let report = launch::run(&config, fx.ledger.clone(), uploader.clone(), &identity)
            .await
            .unwrap();

        assert_eq!(report.payer, fx.payer.pubkey());
        assert!(report.metadata_signature.is_some());
        assert!(report.mint_signature.is_some());
        assert!(report.transfer_signature.is_some());
        assert!(report.burn_signature.is_some());

        let owner_account = report.token_account.unwrap();
        assert_eq!(
            owner_account,
            associated_token_address(&fx.payer.pubkey(), &report.mint)
        );
        let recipient_account = associated_token_address(&recipient, &report.mint);

        let mint = fx.client.get_mint(&report.mint).await.unwrap();
        assert_eq!(mint.decimals, 2);
        assert_eq!(mint.supply, 400);
        assert_eq!(fx.client.token_balance(&owner_account).await.unwrap(), 200);
        assert_eq!(fx.client.token_balance(&recipient_account).await.unwrap(), 200);

        let metadata = MetadataAttacher::new(fx.ledger.clone(), uploader, config.cluster, image.path())
            .fetch(&report.mint)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(metadata.name, config.token.name);
        assert_eq!(metadata.symbol, config.token.symbol);
    }

    #[tokio::test]
    async fn test_metadata_only_launch_skips_accounts() {
        let fx = funded_fixture().await;
        let image = image_file();
        let config = local_config(&image);

        let identity = StaticIdentity::new(fx.payer.insecure_clone());
        let report = launch::run(
            &config,
            fx.ledger.clone(),
            Arc::new(MemoryUploader::new()),
            &identity,
        )
        .await
        .unwrap();

        assert!(report.metadata_signature.is_some());
        assert!(report.token_account.is_none());
        // Mint creation and metadata creation
        assert_eq!(fx.ledger.transaction_count().await, 2);
    }

    #[tokio::test]
    async fn test_unfunded_payer_fails_in_mint_stage() {
        let image = image_file();
        let config = local_config(&image);
        let identity = StaticIdentity::new(Keypair::new());

        let err = launch::run(
            &config,
            Arc::new(MemoryLedger::new()),
            Arc::new(MemoryUploader::new()),
            &identity,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Mint);
        assert!(matches!(err.source, SdkError::Ledger(_)));
    }

    #[tokio::test]
    async fn test_unknown_mint_fails_in_metadata_stage() {
        let fx = funded_fixture().await;
        let image = image_file();
        let mut config = local_config(&image);
        config.token.mint = Some(Pubkey::new_unique());

        let identity = StaticIdentity::new(fx.payer.insecure_clone());
        let err = launch::run(
            &config,
            fx.ledger.clone(),
            Arc::new(MemoryUploader::new()),
            &identity,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Metadata);
        assert_eq!(fx.ledger.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_upload_failure_fails_in_metadata_stage() {
        let fx = funded_fixture().await;
        let image = image_file();
        let config = local_config(&image);

        let identity = StaticIdentity::new(fx.payer.insecure_clone());
        let err = launch::run(
            &config,
            fx.ledger.clone(),
            Arc::new(MemoryUploader::failing()),
            &identity,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Metadata);
        assert!(matches!(err.source, SdkError::Upload(_)));
        assert!(err.to_string().starts_with("metadata stage failed"));
    }

    #[tokio::test]
    async fn test_overdrawn_burn_fails_in_supply_stage() {
        let fx = funded_fixture().await;
        let image = image_file();
        let mut config = local_config(&image);
        config.token.attach_metadata = false;
        config.supply.mint_amount = Some(1);
        config.supply.burn_amount = Some(5);

        let identity = StaticIdentity::new(fx.payer.insecure_clone());
        let err = launch::run(
            &config,
            fx.ledger.clone(),
            Arc::new(MemoryUploader::new()),
            &identity,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Supply);
        assert!(matches!(err.source, SdkError::Ledger(ref msg) if msg.contains("insufficient funds")));
    }

    #[tokio::test]
    async fn test_transfer_from_foreign_owner_is_rejected() {
        let fx = funded_fixture().await;
        let image = image_file();
        let mut config = local_config(&image);
        config.token.attach_metadata = false;
        config.supply.owner = Some(Pubkey::new_unique());
        config.supply.transfer = Some(TransferConfig {
            recipient: Pubkey::new_unique(),
            amount: 1,
        });

        let identity = StaticIdentity::new(fx.payer.insecure_clone());
        let err = launch::run(
            &config,
            fx.ledger.clone(),
            Arc::new(MemoryUploader::new()),
            &identity,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Supply);
        assert!(matches!(err.source, SdkError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_corrupt_identity_fails_in_identity_stage() {
        let image = image_file();
        let config = local_config(&image);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let identity = mintkit_sdk::FileIdentity::new(&path).without_env();
        let err = launch::run(
            &config,
            Arc::new(MemoryLedger::new()),
            Arc::new(MemoryUploader::new()),
            &identity,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Identity);
    }
}
