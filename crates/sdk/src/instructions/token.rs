use solana_program::{program_pack::Pack, system_instruction};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use spl_token::state::Mint;

use crate::error::SdkResult;

/// Build instructions allocating and initializing a new mint account
pub fn create_mint(
    payer: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    rent_lamports: u64,
) -> SdkResult<Vec<Instruction>> {
    let create_account_ix = system_instruction::create_account(
        payer,
        mint,
        rent_lamports,
        Mint::LEN as u64,
        &spl_token::id(),
    );

    let initialize_mint_ix = spl_token::instruction::initialize_mint2(
        &spl_token::id(),
        mint,
        mint_authority,
        freeze_authority,
        decimals,
    )?;

    Ok(vec![create_account_ix, initialize_mint_ix])
}

/// Build instruction creating `owner`'s associated token account for `mint`
pub fn create_associated_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account_idempotent(payer, owner, mint, &spl_token::id())
}

/// Build instruction minting `amount` base units to `destination`
pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> SdkResult<Instruction> {
    Ok(spl_token::instruction::mint_to_checked(
        &spl_token::id(),
        mint,
        destination,
        authority,
        &[],
        amount,
        decimals,
    )?)
}

/// Build instruction moving `amount` base units between token accounts
pub fn transfer(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> SdkResult<Instruction> {
    Ok(spl_token::instruction::transfer_checked(
        &spl_token::id(),
        source,
        mint,
        destination,
        authority,
        &[],
        amount,
        decimals,
    )?)
}

/// Build instruction destroying `amount` base units held in `account`
pub fn burn(
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> SdkResult<Instruction> {
    Ok(spl_token::instruction::burn_checked(
        &spl_token::id(),
        account,
        mint,
        authority,
        &[],
        amount,
        decimals,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::associated_token_address;

    #[test]
    fn test_create_mint_instructions() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let ixs = create_mint(&payer, &mint, &payer, Some(&payer), 2, 1_461_600).unwrap();

        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0].program_id, solana_program::system_program::id());
        assert!(ixs[0].accounts[1].is_signer, "New mint must sign its allocation");
        assert_eq!(ixs[1].program_id, spl_token::id());
        assert_eq!(ixs[1].accounts[0].pubkey, mint);
    }

    #[test]
    fn test_associated_account_targets_derived_address() {
        let payer = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let ix = create_associated_account(&payer, &owner, &mint);

        assert_eq!(ix.program_id, spl_associated_token_account::id());
        assert_eq!(ix.accounts[1].pubkey, associated_token_address(&owner, &mint));
        assert_eq!(ix.data, vec![1], "Idempotent create variant expected");
    }

    #[test]
    fn test_supply_instructions_require_authority_signature() {
        let mint = Pubkey::new_unique();
        let account = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        let mint_ix = mint_to(&mint, &account, &authority, 500, 2).unwrap();
        let transfer_ix = transfer(&account, &mint, &other, &authority, 200, 2).unwrap();
        let burn_ix = burn(&account, &mint, &authority, 100, 2).unwrap();

        for ix in [&mint_ix, &transfer_ix, &burn_ix] {
            let signer = ix.accounts.iter().find(|meta| meta.is_signer).unwrap();
            assert_eq!(signer.pubkey, authority);
        }
    }
}
