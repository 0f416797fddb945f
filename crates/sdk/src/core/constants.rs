/// Mint targeted by the default launch configuration
pub const DEFAULT_MINT: &str = "83hSK3Fq36VBkprW8arcv64Ce3TooHLb8x4vL4UUQMCz";

/// Default token presentation
pub const DEFAULT_TOKEN_NAME: &str = "Fatih Yokus Coin";
pub const DEFAULT_TOKEN_SYMBOL: &str = "FYC";
pub const DEFAULT_TOKEN_DESCRIPTION: &str = "Whoever holds this token is my friend!";
pub const DEFAULT_IMAGE_PATH: &str = "assets/coinimg.png";
pub const DEFAULT_DECIMALS: u8 = 2;

/// Storage node defaults
pub const DEFAULT_STORAGE_ADDRESS: &str = "https://devnet.bundlr.network";
pub const DEFAULT_STORAGE_GATEWAY: &str = "https://arweave.net";
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 60_000;

/// Currency the storage node is paid in
pub const STORAGE_CURRENCY: &str = "solana";

/// Extra percentage funded on top of the quoted storage price
pub const STORAGE_PRICE_MARGIN_PERCENT: u64 = 10;

/// Explorer used for human-facing links
pub const EXPLORER_URL: &str = "https://explorer.solana.com";

/// Keypair file and environment override
pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";
pub const PRIVATE_KEY_ENV: &str = "MINTKIT_PRIVATE_KEY";

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Token metadata program field limits
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// Seeds for program-derived addresses
pub mod seeds {
    pub const METADATA: &[u8] = b"metadata";
}
