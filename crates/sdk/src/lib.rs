//! Mintkit SDK
//!
//! Library for launching a fungible SPL token.
//! Provides:
//! - Identity loading and funding
//! - Mint creation
//! - Metadata upload and attachment
//! - Associated token account provisioning
//! - Mint, transfer and burn operations
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod identity;
pub mod instructions;
pub mod launch;
pub mod ledger;
pub mod protocol;
pub mod storage;
pub mod utils;

pub use client::{MetadataAttacher, TokenClient};
pub use config::*;
pub use crate::core::*;
pub use error::*;
pub use identity::{FileIdentity, IdentityProvider, StaticIdentity};
pub use launch::{run, LaunchReport};
pub use ledger::{Ledger, MemoryLedger, RpcLedger};
pub use storage::{BundlrUploader, MemoryUploader, Uploader};
pub use utils::*;
