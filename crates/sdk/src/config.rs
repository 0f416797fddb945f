//! Launch configuration loaded from TOML

use std::{fs, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::{
    core::*,
    error::{SdkError, SdkResult},
    utils::Explorer,
};

/// Solana cluster the launch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Devnet,
    Testnet,
    Localnet,
}

impl Cluster {
    /// Public RPC endpoint for the cluster
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Localnet => "http://localhost:8899",
        }
    }

    /// Whether the cluster hands out airdrops
    pub fn supports_airdrop(&self) -> bool {
        !matches!(self, Cluster::MainnetBeta)
    }
}

/// What to do when the target mint already carries metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingMetadata {
    /// Stop with `SdkError::MetadataAlreadyExists`
    Fail,
    /// Leave the existing metadata untouched
    Skip,
    /// Re-upload and replace the on-chain data
    Update,
}

/// Top-level launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Cluster used for RPC defaults and explorer links
    pub cluster: Cluster,

    /// RPC endpoint override
    pub rpc_url: Option<String>,

    /// Commitment level for queries and confirmations
    pub commitment: String,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub token: TokenConfig,
    pub supply: SupplyConfig,
}

/// Signing identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Keypair file, created when missing
    pub keypair_path: String,

    /// Request an airdrop when the balance is low
    pub airdrop: bool,

    /// Balance below which an airdrop is requested (lamports)
    pub min_balance_lamports: u64,

    /// Airdrop size (lamports)
    pub airdrop_lamports: u64,
}

/// Storage node settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Upload node address
    pub address: String,

    /// Gateway serving uploaded content
    pub gateway: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Deposit the quoted storage price from the payer before uploading
    pub auto_fund: bool,
}

/// Mint and metadata settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Existing mint to operate on; an empty string creates a new mint
    #[serde(with = "option_pubkey_serde")]
    pub mint: Option<Pubkey>,

    /// Decimals for a newly created mint
    pub decimals: u8,

    pub name: String,
    pub symbol: String,
    pub description: String,

    /// Image uploaded as the token logo
    pub image_path: PathBuf,

    /// Run the metadata stage
    pub attach_metadata: bool,

    /// Behaviour when metadata already exists
    pub existing_metadata: ExistingMetadata,
}

/// Supply operations run after account provisioning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyConfig {
    /// Token account owner; defaults to the signing identity
    #[serde(with = "option_pubkey_serde", skip_serializing_if = "Option::is_none")]
    pub owner: Option<Pubkey>,

    /// Provision the owner's token account even without supply operations
    pub provision_account: bool,

    /// Whole units minted to the owner's account
    pub mint_amount: Option<u64>,

    /// Whole units moved from the owner's account to a recipient
    pub transfer: Option<TransferConfig>,

    /// Whole units burned from the owner's account
    pub burn_amount: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(with = "pubkey_serde")]
    pub recipient: Pubkey,
    pub amount: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            rpc_url: None,
            commitment: "confirmed".to_string(),
            log_level: "info".to_string(),
            identity: IdentityConfig::default(),
            storage: StorageConfig::default(),
            token: TokenConfig::default(),
            supply: SupplyConfig::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            keypair_path: DEFAULT_KEYPAIR_PATH.to_string(),
            airdrop: true,
            min_balance_lamports: LAMPORTS_PER_SOL,
            airdrop_lamports: LAMPORTS_PER_SOL,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_STORAGE_ADDRESS.to_string(),
            gateway: DEFAULT_STORAGE_GATEWAY.to_string(),
            timeout_ms: DEFAULT_STORAGE_TIMEOUT_MS,
            auto_fund: true,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            mint: Pubkey::from_str(DEFAULT_MINT).ok(),
            decimals: DEFAULT_DECIMALS,
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            description: DEFAULT_TOKEN_DESCRIPTION.to_string(),
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            attach_metadata: true,
            existing_metadata: ExistingMetadata::Fail,
        }
    }
}

impl LaunchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> SdkResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| SdkError::FileRead {
            path: PathBuf::from(path),
            source,
        })?;

        let config: LaunchConfig = toml::from_str(&content)
            .map_err(|e| SdkError::Config(format!("Failed to parse config file {}: {}", path, e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> SdkResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SdkError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Effective RPC endpoint
    pub fn rpc_endpoint(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.cluster.rpc_url().to_string())
    }

    /// Explorer links for the effective endpoint
    pub fn explorer(&self) -> Explorer {
        Explorer::new(self.cluster, self.rpc_endpoint())
    }

    /// Parsed commitment level
    pub fn commitment_config(&self) -> SdkResult<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| SdkError::Config(format!("Unknown commitment level: {}", self.commitment)))
    }

    /// Metadata presentation for the configured token
    pub fn token_metadata(&self) -> TokenMetadata {
        TokenMetadata {
            name: self.token.name.clone(),
            symbol: self.token.symbol.clone(),
            description: self.token.description.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SdkResult<()> {
        if self.rpc_endpoint().is_empty() {
            return Err(SdkError::Config("RPC endpoint cannot be empty".to_string()));
        }

        self.commitment_config()?;

        if self.identity.keypair_path.is_empty() {
            return Err(SdkError::Config("Keypair path cannot be empty".to_string()));
        }

        if self.token.attach_metadata {
            if self.storage.address.is_empty() {
                return Err(SdkError::Config("Storage address cannot be empty".to_string()));
            }
            if self.storage.gateway.is_empty() {
                return Err(SdkError::Config("Storage gateway cannot be empty".to_string()));
            }
            if self.storage.timeout_ms == 0 {
                return Err(SdkError::Config("Storage timeout must be greater than 0".to_string()));
            }
        }

        if self.token.name.is_empty() || self.token.name.len() > MAX_NAME_LENGTH {
            return Err(SdkError::Config(format!(
                "token name must be 1..={} bytes",
                MAX_NAME_LENGTH
            )));
        }

        if self.token.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(SdkError::Config(format!(
                "token symbol must be at most {} bytes",
                MAX_SYMBOL_LENGTH
            )));
        }

        Ok(())
    }
}

mod pubkey_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

mod option_pubkey_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S>(pubkey: &Option<Pubkey>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match pubkey {
            Some(pubkey) => serializer.serialize_str(&pubkey.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Pubkey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.filter(|s| !s.is_empty())
            .map(|s| Pubkey::from_str(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LaunchConfig::default();
        config.validate().unwrap();
        assert_eq!(config.rpc_endpoint(), "https://api.devnet.solana.com");
        assert_eq!(config.token.mint, Some(Pubkey::from_str(DEFAULT_MINT).unwrap()));
        assert_eq!(config.token.existing_metadata, ExistingMetadata::Fail);
    }

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let recipient = Pubkey::new_unique();
        let toml = format!(
            r#"
cluster = "localnet"

[token]
decimals = 6
name = "Local Coin"
existing_metadata = "update"

[supply]
mint_amount = 5

[supply.transfer]
recipient = "{}"
amount = 2
"#,
            recipient
        );

        let config: LaunchConfig = toml::from_str(&toml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.cluster, Cluster::Localnet);
        assert_eq!(config.rpc_endpoint(), "http://localhost:8899");
        assert_eq!(config.token.decimals, 6);
        assert_eq!(config.token.name, "Local Coin");
        assert_eq!(config.token.symbol, DEFAULT_TOKEN_SYMBOL);
        assert_eq!(config.token.existing_metadata, ExistingMetadata::Update);
        assert_eq!(config.supply.mint_amount, Some(5));
        let transfer = config.supply.transfer.unwrap();
        assert_eq!(transfer.recipient, recipient);
        assert_eq!(transfer.amount, 2);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = LaunchConfig::default();
        config.supply.owner = Some(Pubkey::new_unique());
        let rendered = config.to_toml().unwrap();
        let parsed: LaunchConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.supply.owner, config.supply.owner);
        assert_eq!(parsed.token.mint, config.token.mint);
    }

    #[test]
    fn test_empty_mint_requests_new_mint() {
        let config: LaunchConfig = toml::from_str("[token]\nmint = \"\"\n").unwrap();
        assert_eq!(config.token.mint, None);

        let rendered = config.to_toml().unwrap();
        let parsed: LaunchConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.token.mint, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LaunchConfig::default();
        config.token.symbol = "TOOLONGSYMBOL".to_string();
        assert!(matches!(config.validate(), Err(SdkError::Config(_))));

        let mut config = LaunchConfig::default();
        config.commitment = "eventually".to_string();
        assert!(config.validate().is_err());

        let mut config = LaunchConfig::default();
        config.storage.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explorer_uses_effective_endpoint() {
        let mut config = LaunchConfig {
            cluster: Cluster::Localnet,
            ..LaunchConfig::default()
        };
        assert_eq!(config.explorer(), Explorer::from(Cluster::Localnet));

        config.rpc_url = Some("http://validator.internal:8899".to_string());
        let url = config.explorer().address_url(&Pubkey::default());
        assert!(url.ends_with("?cluster=custom&customUrl=http://validator.internal:8899"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LaunchConfig::load("/nonexistent/mintkit.toml").unwrap_err();
        assert!(matches!(err, SdkError::FileRead { .. }));
    }
}
