//! SDK error types

use std::path::PathBuf;

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Signing identity could not be loaded, created or funded
    #[error("Identity error: {0}")]
    Identity(String),

    /// RPC failure or ledger rejection of a submitted transaction
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Storage network upload failure
    #[error("Upload error: {0}")]
    Upload(String),

    /// Local file could not be read
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Metadata account already exists for the mint
    #[error("Metadata account {metadata} already exists for mint {mint}")]
    MetadataAlreadyExists { mint: Pubkey, metadata: Pubkey },

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Math overflow
    #[error("Math overflow")]
    MathOverflow,
}

impl From<solana_client::client_error::ClientError> for SdkError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        SdkError::Ledger(err.to_string())
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Upload(err.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<solana_program::program_error::ProgramError> for SdkError {
    fn from(err: solana_program::program_error::ProgramError) -> Self {
        SdkError::InvalidParameters(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

/// Stage of the launch sequence an error originated from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Identity,
    Mint,
    Metadata,
    Account,
    Supply,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Identity => "identity",
            Stage::Mint => "mint",
            Stage::Metadata => "metadata",
            Stage::Account => "account",
            Stage::Supply => "supply",
        };
        f.write_str(name)
    }
}

/// Error raised by the launch sequence, tagged with the failing stage
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct LaunchError {
    pub stage: Stage,
    #[source]
    pub source: SdkError,
}

impl SdkError {
    /// Attribute this error to a launch stage
    pub fn at(self, stage: Stage) -> LaunchError {
        LaunchError {
            stage,
            source: self,
        }
    }
}
