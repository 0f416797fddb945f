use mpl_token_metadata::{
    instructions::{
        CreateMetadataAccountV3, CreateMetadataAccountV3InstructionArgs, UpdateMetadataAccountV2,
        UpdateMetadataAccountV2InstructionArgs,
    },
    types::DataV2,
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::protocol::metadata_address;

/// Leading instruction byte of `CreateMetadataAccountV3`
pub const CREATE_METADATA_V3_DISCRIMINATOR: u8 = 33;

/// Leading instruction byte of `UpdateMetadataAccountV2`
pub const UPDATE_METADATA_V2_DISCRIMINATOR: u8 = 15;

/// Fungible token data: no royalties, creators, collection or uses
pub fn data_v2(name: &str, symbol: &str, uri: &str) -> DataV2 {
    DataV2 {
        name: name.to_string(),
        symbol: symbol.to_string(),
        uri: uri.to_string(),
        seller_fee_basis_points: 0,
        creators: None,
        collection: None,
        uses: None,
    }
}

/// Build instruction creating the metadata account of `mint`
///
/// `authority` acts as mint authority, payer and update authority.
pub fn create_metadata_account(mint: &Pubkey, authority: &Pubkey, data: DataV2) -> Instruction {
    let (metadata, _) = metadata_address(mint);

    CreateMetadataAccountV3 {
        metadata,
        mint: *mint,
        mint_authority: *authority,
        payer: *authority,
        update_authority: (*authority, true),
        system_program: solana_program::system_program::id(),
        rent: None,
    }
    .instruction(CreateMetadataAccountV3InstructionArgs {
        data,
        is_mutable: true,
        collection_details: None,
    })
}

/// Build instruction replacing the data of an existing metadata account
pub fn update_metadata_account(mint: &Pubkey, update_authority: &Pubkey, data: DataV2) -> Instruction {
    let (metadata, _) = metadata_address(mint);

    UpdateMetadataAccountV2 {
        metadata,
        update_authority: *update_authority,
    }
    .instruction(UpdateMetadataAccountV2InstructionArgs {
        data: Some(data),
        new_update_authority: None,
        primary_sale_happened: None,
        is_mutable: None,
    })
}
