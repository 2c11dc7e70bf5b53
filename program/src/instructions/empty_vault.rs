use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    program_error::ProgramError,
    pubkey::Pubkey,
    ProgramResult,
};
use pinocchio_log::log;
use pinocchio_token::state::{Mint, TokenAccount};

use crate::{
    instructions::SlotlockInstruction,
    loaders::{
        expect_signer, expect_system_program, expect_token_program, load_ix_data, load_state, Blob,
    },
    state::Vault,
    vault_seeds,
};

/// Empty instruction payload: the opcode byte alone.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmptyVaultIxData {
    pub opcode: u8,
}

impl Default for EmptyVaultIxData {
    fn default() -> Self {
        Self::new()
    }
}

impl EmptyVaultIxData {
    pub const OPCODE: u8 = SlotlockInstruction::EmptyVault as u8;

    pub fn new() -> Self {
        Self {
            opcode: Self::OPCODE,
        }
    }

    /// # Safety
    /// The struct is a fully initialized 1-byte-aligned image.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        unsafe { crate::loaders::as_bytes::<Self>(self) }
    }
}

impl Blob for EmptyVaultIxData {
    const LEN: usize = core::mem::size_of::<EmptyVaultIxData>();
}

/// Drains an unlockable vault back to its admin and closes it.
///
/// Transfers the full vault token balance to the admin's token account,
/// closes the vault token account, then moves every lamport out of the
/// vault record and zeroes its data so the runtime reclaims it.
///
/// Expected accounts, positional (same order as lock):
/// `[vault (w), admin (ws), mint, admin_token (w), vault_token (w),
///   token_program, system_program]`
pub fn process_empty_vault(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [vault, admin, mint, admin_token, vault_token, token_program, system_program] = accounts
    else {
        log!("need 7 accounts, got {}", accounts.len());
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    let _ = unsafe { load_ix_data::<EmptyVaultIxData>(data)? };

    // ----------------------- CHECKS -----------------------
    expect_token_program(token_program)?;
    expect_system_program(system_program)?;
    expect_signer(admin, true)?;

    {
        let _ = Mint::from_account_info(mint)?;
    }

    {
        let admin_token_account = TokenAccount::from_account_info(admin_token)?;
        if admin_token_account.mint().ne(mint.key()) {
            log!(
                "admin token account mint mismatch {} != {}",
                admin_token_account.mint(),
                mint.key()
            );
            return Err(ProgramError::InvalidAccountData);
        }
        if admin_token_account.owner().ne(admin.key()) {
            log!(
                "admin token account is not owned by the admin {} != {}",
                admin_token_account.owner(),
                admin.key()
            );
            return Err(ProgramError::InvalidAccountData);
        }
    }

    let tokens_to_empty = {
        let vault_token_account = TokenAccount::from_account_info(vault_token)?;
        if vault_token_account.owner().ne(vault.key()) {
            log!(
                "vault token account is not owned by the vault {} != {}",
                vault_token_account.owner(),
                vault.key()
            );
            return Err(ProgramError::InvalidAccountData);
        }
        if vault_token_account.mint().ne(mint.key()) {
            log!(
                "vault token account mint mismatch {} != {}",
                vault_token_account.mint(),
                mint.key()
            );
            return Err(ProgramError::InvalidAccountData);
        }
        vault_token_account.amount()
    };

    Vault::check(
        program_id,
        vault,
        true,
        Some(admin),
        Some(mint),
        Some(vault_token),
    )?;
    unsafe {
        Vault::check_unlock_okay(vault)?;
    }

    let vault_account = unsafe {
        let data = vault.borrow_data_unchecked();
        load_state::<Vault>(data)?
    };

    // ----------------------- SIGNER SEEDS -----------------------
    let bump_bytes = [vault_account.bump()];
    let seeds = vault_seeds!(admin.key(), mint.key(), &bump_bytes);
    let signing_seeds = [
        Seed::from(seeds[0]),
        Seed::from(seeds[1]),
        Seed::from(seeds[2]),
        Seed::from(seeds[3]),
    ];
    Vault::check_seeds(admin.key(), mint.key(), vault_account.bump(), &signing_seeds)?;
    let signer = Signer::from(&signing_seeds);

    // ----------------------- TRANSFER TOKENS -----------------------

    pinocchio_token::instructions::Transfer {
        from: vault_token,
        to: admin_token,
        authority: vault,
        amount: tokens_to_empty,
    }
    .invoke_signed(std::slice::from_ref(&signer))?;

    // ----------------------- CLOSE VAULT TOKEN ACCOUNT -----------------------

    pinocchio_token::instructions::CloseAccount {
        account: vault_token,
        destination: admin_token,
        authority: vault,
    }
    .invoke_signed(std::slice::from_ref(&signer))?;

    // ----------------------- CLOSE VAULT -----------------------
    unsafe {
        // Hand the rent lamports back to the admin and zero the data so the
        // account is dead for good; a zeroed first byte also reads as
        // "uninitialized" if anything touches it later in this transaction.
        *admin.borrow_mut_lamports_unchecked() = admin.lamports().saturating_add(vault.lamports());
        *vault.borrow_mut_lamports_unchecked() = 0;

        vault.borrow_mut_data_unchecked().fill(0);
    }

    log!(
        "emptied {} tokens ( {} ) to {}",
        tokens_to_empty,
        mint.key(),
        admin.key()
    );

    Ok(())
}
