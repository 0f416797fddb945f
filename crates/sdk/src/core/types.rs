use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Decoded state of a token mint
#[derive(Clone, Debug, PartialEq)]
pub struct MintInfo {
    pub address: Pubkey,
    pub decimals: u8,
    pub supply: u64,
    pub mint_authority: Option<Pubkey>,
    pub freeze_authority: Option<Pubkey>,
}

/// Decoded state of a token account
#[derive(Clone, Debug, PartialEq)]
pub struct TokenAccountInfo {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

/// Presentation data attached to a mint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
}

/// Off-chain JSON document the on-chain metadata URI points to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffChainMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// On-chain metadata as read back from the metadata account
#[derive(Clone, Debug, PartialEq)]
pub struct OnChainMetadata {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub is_mutable: bool,
}

/// Bytes to upload along with their file name and MIME type
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = crate::utils::content_type_for(&name).to_string();
        Self {
            name,
            content_type,
            bytes,
        }
    }

    /// Serialize a value as a JSON upload
    pub fn json<T: Serialize>(name: impl Into<String>, value: &T) -> crate::SdkResult<Self> {
        Ok(Self {
            name: name.into(),
            content_type: "application/json".to_string(),
            bytes: serde_json::to_vec(value)?,
        })
    }
}
