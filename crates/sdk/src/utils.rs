//! SDK utility functions

use std::path::Path;

use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::{
    config::Cluster,
    core::EXPLORER_URL,
    error::{SdkError, SdkResult},
};

/// Convert a whole-unit amount to base units (`amount * 10^decimals`)
///
/// Fails with `MathOverflow` only when the scaled value does not fit a u64.
pub fn to_base_units(amount: u64, decimals: u8) -> SdkResult<u64> {
    let scale = 10u64
        .checked_pow(decimals as u32)
        .ok_or(SdkError::MathOverflow)?;
    amount.checked_mul(scale).ok_or(SdkError::MathOverflow)
}

/// Explorer links for the cluster a ledger endpoint belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Explorer {
    cluster: Cluster,
    rpc_url: String,
}

impl Explorer {
    pub fn new(cluster: Cluster, rpc_url: impl Into<String>) -> Self {
        Self {
            cluster,
            rpc_url: rpc_url.into(),
        }
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    /// Link for a transaction signature
    pub fn tx_url(&self, signature: &Signature) -> String {
        format!("{}/tx/{}{}", EXPLORER_URL, signature, self.query())
    }

    /// Link for an account address
    pub fn address_url(&self, address: &Pubkey) -> String {
        format!("{}/address/{}{}", EXPLORER_URL, address, self.query())
    }

    fn query(&self) -> String {
        match self.cluster {
            Cluster::MainnetBeta => String::new(),
            Cluster::Devnet => "?cluster=devnet".to_string(),
            Cluster::Testnet => "?cluster=testnet".to_string(),
            Cluster::Localnet => format!("?cluster=custom&customUrl={}", self.rpc_url),
        }
    }
}

impl From<Cluster> for Explorer {
    fn from(cluster: Cluster) -> Self {
        Self::new(cluster, cluster.rpc_url())
    }
}

/// Guess a MIME type from a file name
pub fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> SdkResult<String> {
    if let Some(rest) = path.strip_prefix('~') {
        let home = std::env::var("HOME")
            .map_err(|_| SdkError::Config("HOME environment variable not set".to_string()))?;
        Ok(format!("{}{}", home, rest))
    } else {
        Ok(path.to_string())
    }
}
