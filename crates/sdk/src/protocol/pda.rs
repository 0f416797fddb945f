use solana_sdk::pubkey::Pubkey;

use crate::core::seeds;

/// Derive the token metadata PDA for a mint
pub fn metadata_address(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            seeds::METADATA,
            mpl_token_metadata::ID.as_ref(),
            mint.as_ref(),
        ],
        &mpl_token_metadata::ID,
    )
}

/// Associated token account of `owner` for `mint`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpl_token_metadata::accounts::Metadata;

    #[test]
    fn test_metadata_address_matches_program_helper() {
        let mint = Pubkey::new_unique();
        assert_eq!(metadata_address(&mint), Metadata::find_pda(&mint));
    }

    #[test]
    fn test_associated_address_is_deterministic() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(
            associated_token_address(&owner, &mint),
            associated_token_address(&owner, &mint)
        );
        assert_ne!(
            associated_token_address(&owner, &mint),
            associated_token_address(&mint, &owner)
        );
    }
}
