/// Instruction builders for mint, account, supply and metadata operations
pub mod metadata;
pub mod token;

pub use metadata::{create_metadata_account, data_v2, update_metadata_account};
pub use token::{burn, create_associated_account, create_mint, mint_to, transfer};
