//! Off-chain storage uploads

pub mod bundlr;
pub mod data_item;
pub mod memory;

use async_trait::async_trait;
use solana_sdk::signature::Keypair;

use crate::{core::UploadFile, error::SdkResult};

pub use bundlr::BundlrUploader;
pub use memory::MemoryUploader;

/// Uploads bytes to a storage network and returns a retrievable URI
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Store `file`, signing and paying with `signer`
    async fn upload(&self, file: &UploadFile, signer: &Keypair) -> SdkResult<String>;
}
