use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvars::{rent::Rent, Sysvar},
    ProgramResult,
};
use pinocchio_log::log;
use pinocchio_system::instructions::CreateAccount;
use pinocchio_token::state::{Mint, TokenAccount};

use crate::{
    loaders::{
        expect_signer, expect_system_program, expect_token_program, expect_unallocated,
        load_ix_data, Blob,
    },
    pod::{PodOption, PodU64},
    state::Vault,
    vault_seeds,
};

use super::SlotlockInstruction;

/// Lock instruction payload.
///
/// Layout (19 bytes, no padding anywhere):
/// - byte 0:      opcode (1)
/// - byte 1:      vault PDA bump
/// - bytes 2-9:   slots to lock, little-endian
/// - byte 10:     amount presence tag
/// - bytes 11-18: amount, little-endian; zero-filled when the tag is 0
///
/// `repr(C, packed)` plus 1-byte-aligned pod fields keeps the in-memory
/// image identical to the wire image, so the payload can be cast directly.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LockVaultIxData {
    pub opcode: u8,
    pub vault_bump: u8,
    /// Lock duration in slots.
    pub slots_to_lock: PodU64,
    /// Amount of tokens to lock. `None` sweeps the admin's entire balance.
    pub tokens_to_lock: PodOption<PodU64>,
}

impl LockVaultIxData {
    pub const OPCODE: u8 = SlotlockInstruction::LockVault as u8;

    pub fn new(vault_bump: u8, slots_to_lock: u64, tokens_to_lock: Option<u64>) -> Self {
        let tokens_to_lock = match tokens_to_lock {
            Some(amount) => PodOption::some(PodU64::from(amount)),
            None => PodOption::none(),
        };

        Self {
            opcode: Self::OPCODE,
            vault_bump,
            slots_to_lock: PodU64::from(slots_to_lock),
            tokens_to_lock,
        }
    }

    /// # Safety
    /// The struct is a fully initialized 1-byte-aligned image.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        unsafe { crate::loaders::as_bytes::<Self>(self) }
    }
}

impl Blob for LockVaultIxData {
    const LEN: usize = core::mem::size_of::<LockVaultIxData>();
}

/// Creates the vault PDA account, records the lock terms and pulls the
/// requested amount (or everything) from the admin's token account.
///
/// Expected accounts, positional:
/// `[vault (w), admin (ws), mint, admin_token (w), vault_token (w),
///   token_program, system_program]`
pub fn process_lock_vault(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
) -> ProgramResult {
    let [vault, admin, mint, admin_token, vault_token, token_program, system_program] = accounts
    else {
        log!("need 7 accounts, got {}", accounts.len());
        return Err(ProgramError::NotEnoughAccountKeys);
    };
    let ix_data = unsafe { load_ix_data::<LockVaultIxData>(data)? };

    // ----------------------- CHECKS -----------------------
    expect_token_program(token_program)?;
    expect_system_program(system_program)?;
    // The vault must not exist yet: still system-owned, zero data.
    expect_unallocated(vault, true)?;
    expect_signer(admin, true)?;

    let pda =
        Vault::create_program_address(program_id, admin.key(), mint.key(), ix_data.vault_bump)?;
    if vault.key().ne(&pda) {
        log!("vault key does not match PDA {} != {}", vault.key(), &pda);
        return Err(ProgramError::InvalidAccountData);
    };

    // Drop each borrow as soon as the needed values are extracted; the
    // token CPIs below re-borrow these accounts.
    let mint_decimals = {
        let mint = Mint::from_account_info(mint)?;
        mint.decimals()
    };

    {
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
    }

    let available_tokens = {
        let admin_token_account = TokenAccount::from_account_info(admin_token)?;
        if admin_token_account.owner().ne(admin.key()) {
            log!(
                "admin token account is not owned by the admin {} != {}",
                admin_token_account.owner(),
                admin.key()
            );
            return Err(ProgramError::InvalidAccountData);
        }

        if admin_token_account.mint().ne(mint.key()) {
            log!(
                "admin token account mint mismatch {} != {}",
                admin_token_account.mint(),
                mint.key()
            );
            return Err(ProgramError::InvalidAccountData);
        }

        admin_token_account.amount()
    };

    // No explicit amount means sweep the whole balance.
    let tokens_to_lock = match ix_data.tokens_to_lock.as_ref() {
        Some(amount) => amount.get(),
        None => available_tokens,
    };

    // The transfer CPI would reject this anyway; checking up front gives a
    // readable log instead of a token-program error.
    if tokens_to_lock > available_tokens {
        log!(
            "tokens to lock exceed balance {} > {}",
            tokens_to_lock,
            available_tokens
        );
        return Err(ProgramError::InvalidArgument);
    }

    // ----------------------- CREATE VAULT -----------------------

    let rent = Rent::get()?;

    let bump_bytes = [ix_data.vault_bump];
    let seeds = vault_seeds!(admin.key(), mint.key(), &bump_bytes);
    let signing_seeds = [
        Seed::from(seeds[0]),
        Seed::from(seeds[1]),
        Seed::from(seeds[2]),
        Seed::from(seeds[3]),
    ];

    Vault::check_seeds(admin.key(), mint.key(), ix_data.vault_bump, &signing_seeds)?;

    let signer = Signer::from(&signing_seeds);

    CreateAccount {
        from: admin,
        to: vault,
        space: Vault::LEN as u64,
        owner: program_id,
        lamports: rent.minimum_balance(Vault::LEN),
    }
    .invoke_signed(std::slice::from_ref(&signer))?;

    unsafe {
        Vault::initialize(
            vault,
            admin.key(),
            mint.key(),
            ix_data,
            vault_token.key(),
            mint_decimals,
        )?;
    }

    // ----------------------- TRANSFER TOKENS -----------------------
    // The vault token account is not created here; the client bundles an
    // idempotent create-associated-token-account instruction ahead of this
    // one in the same transaction.
    pinocchio_token::instructions::Transfer {
        from: admin_token,
        to: vault_token,
        authority: admin,
        amount: tokens_to_lock,
    }
    .invoke()?;

    log!(
        "locked {} tokens ( {} ) for {} slots",
        tokens_to_lock,
        mint.key(),
        ix_data.slots_to_lock.get()
    );

    Ok(())
}
