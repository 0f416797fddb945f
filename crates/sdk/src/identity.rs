//! Signing identity acquisition

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use solana_sdk::{
    signature::{read_keypair, read_keypair_file, write_keypair_file, Keypair},
    signer::Signer,
};
use tracing::{info, warn};

use crate::{
    config::IdentityConfig,
    core::PRIVATE_KEY_ENV,
    error::{SdkError, SdkResult},
    ledger::Ledger,
    utils::expand_tilde,
};

/// Provides the keypair that signs and pays for every transaction
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn acquire(&self, ledger: &dyn Ledger) -> SdkResult<Keypair>;
}

/// Identity loaded from the environment or a keypair file, created on first use
pub struct FileIdentity {
    path: PathBuf,
    env_var: Option<String>,
    airdrop: bool,
    min_balance_lamports: u64,
    airdrop_lamports: u64,
}

impl FileIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let defaults = IdentityConfig::default();
        Self {
            path: path.into(),
            env_var: Some(PRIVATE_KEY_ENV.to_string()),
            airdrop: false,
            min_balance_lamports: defaults.min_balance_lamports,
            airdrop_lamports: defaults.airdrop_lamports,
        }
    }

    pub fn from_config(config: &IdentityConfig) -> SdkResult<Self> {
        Ok(Self {
            path: PathBuf::from(expand_tilde(&config.keypair_path)?),
            env_var: Some(PRIVATE_KEY_ENV.to_string()),
            airdrop: config.airdrop,
            min_balance_lamports: config.min_balance_lamports,
            airdrop_lamports: config.airdrop_lamports,
        })
    }

    /// Top the balance up to `min_balance_lamports` with airdrops of `airdrop_lamports`
    pub fn with_airdrop(mut self, min_balance_lamports: u64, airdrop_lamports: u64) -> Self {
        self.airdrop = true;
        self.min_balance_lamports = min_balance_lamports;
        self.airdrop_lamports = airdrop_lamports;
        self
    }

    /// Ignore any private key in the environment
    pub fn without_env(mut self) -> Self {
        self.env_var = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_or_create(&self) -> SdkResult<Keypair> {
        if let Some(secret) = self
            .env_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
        {
            return read_keypair(&mut secret.as_bytes()).map_err(|e| {
                SdkError::Identity(format!("Invalid private key in environment: {}", e))
            });
        }

        if self.path.exists() {
            return read_keypair_file(&self.path).map_err(|e| {
                SdkError::Identity(format!(
                    "Failed to load keypair from {}: {}",
                    self.path.display(),
                    e
                ))
            });
        }

        let keypair = Keypair::new();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SdkError::Identity(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        write_keypair_file(&keypair, &self.path).map_err(|e| {
            SdkError::Identity(format!(
                "Failed to write keypair to {}: {}",
                self.path.display(),
                e
            ))
        })?;
        info!("Generated new keypair at {}", self.path.display());

        Ok(keypair)
    }
}

#[async_trait]
impl IdentityProvider for FileIdentity {
    async fn acquire(&self, ledger: &dyn Ledger) -> SdkResult<Keypair> {
        let keypair = self.load_or_create()?;

        if !self.airdrop {
            return Ok(keypair);
        }

        let balance = ledger
            .get_balance(&keypair.pubkey())
            .await
            .map_err(|e| SdkError::Identity(format!("Failed to read balance: {}", e)))?;

        if balance < self.min_balance_lamports {
            warn!(
                "Balance {} below {} lamports, requesting airdrop of {}",
                balance, self.min_balance_lamports, self.airdrop_lamports
            );
            ledger
                .request_airdrop(&keypair.pubkey(), self.airdrop_lamports)
                .await
                .map_err(|e| SdkError::Identity(format!("Airdrop failed: {}", e)))?;
            let balance = ledger
                .get_balance(&keypair.pubkey())
                .await
                .map_err(|e| SdkError::Identity(format!("Failed to read balance: {}", e)))?;
            info!("New balance: {} lamports", balance);
        }

        Ok(keypair)
    }
}

/// Identity fixed at construction
pub struct StaticIdentity(Keypair);

impl StaticIdentity {
    pub fn new(keypair: Keypair) -> Self {
        Self(keypair)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn acquire(&self, _ledger: &dyn Ledger) -> SdkResult<Keypair> {
        Ok(self.0.insecure_clone())
    }
}
