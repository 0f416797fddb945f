use std::collections::HashMap;

use async_trait::async_trait;
use solana_sdk::{hash::hash, signature::Keypair};
use tokio::sync::Mutex;

use super::Uploader;
use crate::{
    core::UploadFile,
    error::{SdkError, SdkResult},
};

/// Content-addressed uploader that keeps everything in memory
#[derive(Default)]
pub struct MemoryUploader {
    files: Mutex<HashMap<String, UploadFile>>,
    uploads: Mutex<usize>,
    fail_after: Option<usize>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploader rejecting every upload
    pub fn failing() -> Self {
        Self::fail_after(0)
    }

    /// Uploader accepting `successes` uploads and rejecting the rest
    pub fn fail_after(successes: usize) -> Self {
        Self {
            fail_after: Some(successes),
            ..Self::default()
        }
    }

    /// Bytes stored under `uri`
    pub async fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(uri).map(|file| file.bytes.clone())
    }

    /// Stored file under `uri`
    pub async fn file(&self, uri: &str) -> Option<UploadFile> {
        self.files.lock().await.get(uri).cloned()
    }

    /// Number of accepted uploads
    pub async fn upload_count(&self) -> usize {
        *self.uploads.lock().await
    }
}

#[async_trait]
impl Uploader for MemoryUploader {
    async fn upload(&self, file: &UploadFile, _signer: &Keypair) -> SdkResult<String> {
        let mut uploads = self.uploads.lock().await;
        if self.fail_after.map_or(false, |limit| *uploads >= limit) {
            return Err(SdkError::Upload(format!(
                "storage node unavailable while uploading {}",
                file.name
            )));
        }

        let uri = format!("memory://{}", hash(&file.bytes));
        self.files.lock().await.insert(uri.clone(), file.clone());
        *uploads += 1;

        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identical_content_shares_uri() {
        let uploader = MemoryUploader::new();
        let signer = Keypair::new();
        let a = uploader
            .upload(&UploadFile::new("a.png", vec![1, 2, 3]), &signer)
            .await
            .unwrap();
        let b = uploader
            .upload(&UploadFile::new("b.png", vec![1, 2, 3]), &signer)
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(uploader.get(&a).await, Some(vec![1, 2, 3]));
        assert_eq!(uploader.upload_count().await, 2);
    }

    #[tokio::test]
    async fn test_fail_after_limit() {
        let uploader = MemoryUploader::fail_after(1);
        let signer = Keypair::new();
        assert!(uploader
            .upload(&UploadFile::new("a.png", vec![1]), &signer)
            .await
            .is_ok());
        let err = uploader
            .upload(&UploadFile::new("b.png", vec![2]), &signer)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Upload(_)));
        assert_eq!(uploader.upload_count().await, 1);
    }
}
