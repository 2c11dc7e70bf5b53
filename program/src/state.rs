use pinocchio::{
    account_info::AccountInfo,
    instruction::Seed,
    program_error::ProgramError,
    pubkey::{self, Pubkey},
    sysvars::{clock::Clock, Sysvar},
};
use pinocchio_log::log;

use crate::{
    error::SlotlockError,
    instructions::lock_vault::LockVaultIxData,
    loaders::{load_state, load_state_mut_unchecked, AccountState, Blob},
    pod::{PodOption, PodU64},
};

/// Discriminator values for every account type this program owns. There is
/// only one today; the tag byte exists so the layout can grow without
/// ambiguity.
#[repr(u8)]
pub enum AccountKind {
    Vault = 1,
}

// A discriminator of 0 would be indistinguishable from freshly allocated
// (zeroed) account data.
const _: () = assert!(AccountKind::Vault as u8 != 0);

/// On-chain vault record.
///
/// Layout (148 bytes, every field 1-byte aligned, integers little-endian):
/// - bytes 0-1:    presence tag + type tag (`PodOption<u8>`)
/// - byte 2:       PDA bump
/// - bytes 3-34:   admin key
/// - bytes 35-66:  mint key
/// - byte 67:      mint decimals, cached at lock time
/// - bytes 68-99:  vault token account key
/// - bytes 100-107: start slot
/// - bytes 108-115: slots locked
/// - bytes 116-147: reserved, never interpreted
#[derive(Debug, Default, Clone, Copy)]
#[repr(C)]
pub struct Vault {
    /// Present and equal to `AccountKind::Vault` only for a live vault.
    discriminator: PodOption<u8>,
    /// Bump found off-chain via `find_program_address`; stored so the PDA
    /// can be re-derived on-chain with a single `create_program_address`.
    bump: u8,
    /// Sole authority permitted to empty the vault.
    admin: Pubkey,
    /// Mint of the locked token.
    mint: Pubkey,
    mint_decimals: u8,
    /// Token account owned by the vault PDA that holds the locked balance.
    vault_token: Pubkey,
    /// Clock slot recorded when the vault was created.
    start_slot: PodU64,
    /// Minimum number of slots the vault stays locked.
    slots_locked: PodU64,
    reserved: [u8; 32],
}

impl Blob for Vault {
    const LEN: usize = core::mem::size_of::<Vault>();
}

impl AccountState for Vault {
    const KIND: u8 = AccountKind::Vault as u8;

    // Freshly allocated account data is zeroed, so an unset presence tag
    // reads as "not initialized" without a separate flag.
    fn is_initialized(&self) -> bool {
        self.discriminator.copied() == Some(Self::KIND)
    }
}

/// Orders the vault seed list: `SEED || admin || mint || bump`.
#[macro_export]
macro_rules! vault_seeds {
    ($admin:expr, $mint:expr, $bump_slice:expr) => {
        [
            $crate::state::Vault::SEED,
            $admin.as_ref(),
            $mint.as_ref(),
            $bump_slice,
        ]
    };
}

impl Vault {
    /// Seed tag. Together with the admin and mint keys this pins exactly one
    /// vault per (admin, mint) pair, the same way an associated token
    /// account pins one token account per (owner, mint).
    pub const SEED: &[u8] = b"VAULT";

    /// Re-derives the vault PDA from its stored inputs. Off-chain callers
    /// search for the bump with `find_program_address`; on-chain we only
    /// ever re-check with the recorded bump.
    pub fn create_program_address(
        program_id: &Pubkey,
        admin: &Pubkey,
        mint: &Pubkey,
        bump: u8,
    ) -> Result<Pubkey, ProgramError> {
        let bump_bytes = [bump];
        let seeds = vault_seeds!(admin, mint, &bump_bytes);
        let pda = pubkey::create_program_address(&seeds, program_id)?;

        Ok(pda)
    }

    /// Sanity check that a signing seed list matches the canonical order.
    pub fn check_seeds(
        admin: &Pubkey,
        mint: &Pubkey,
        bump: u8,
        seeds: &[Seed],
    ) -> Result<(), ProgramError> {
        let bump_bytes = [bump];
        let expected = vault_seeds!(admin, mint, &bump_bytes);

        if seeds.len() != expected.len() {
            return Err(ProgramError::InvalidAccountData);
        }

        for (seed, expected) in seeds.iter().zip(expected.iter()) {
            if seed.as_ref().ne(*expected) {
                return Err(ProgramError::InvalidAccountData);
            }
        }

        Ok(())
    }

    /// Full validation of a vault account: program ownership, writability,
    /// PDA re-derivation from the stored bump, and agreement with the
    /// admin / mint / token accounts passed alongside it.
    pub fn check(
        program_id: &Pubkey,
        account_info: &AccountInfo,
        expect_writable: bool,
        check_admin: Option<&AccountInfo>,
        check_mint: Option<&AccountInfo>,
        check_token: Option<&AccountInfo>,
    ) -> Result<(), ProgramError> {
        let account_owner = unsafe { account_info.owner() };
        if account_owner.ne(program_id) {
            log!(
                "vault has an invalid program owner {} != {}",
                program_id,
                account_owner
            );
            return Err(ProgramError::InvalidAccountOwner);
        }

        if expect_writable && !account_info.is_writable() {
            log!("vault account is not writable");
            return Err(ProgramError::InvalidAccountData);
        }

        let account = unsafe {
            let data = account_info.borrow_data_unchecked();
            match load_state::<Vault>(data) {
                Ok(account) => account,
                Err(error) => {
                    log!("vault account could not be deserialized");
                    return Err(error);
                }
            }
        };

        let expected_key =
            Self::create_program_address(program_id, &account.admin, &account.mint, account.bump)?;
        if account_info.key().ne(&expected_key) {
            log!(
                "vault PDA does not match {} != {}",
                &expected_key,
                account_info.key()
            );
            return Err(ProgramError::InvalidAccountData);
        }

        if let Some(admin) = check_admin {
            crate::loaders::expect_signer(admin, true)?;
            if account.admin().ne(admin.key()) {
                log!(
                    "vault admin does not match {} != {}",
                    account.admin(),
                    admin.key()
                );
                return Err(ProgramError::InvalidAccountData);
            }
        }

        if let Some(mint) = check_mint {
            if account.mint().ne(mint.key()) {
                log!(
                    "vault mint does not match {} != {}",
                    account.mint(),
                    mint.key()
                );
                return Err(ProgramError::InvalidAccountData);
            }
        }

        if let Some(token) = check_token {
            if account.vault_token().ne(token.key()) {
                log!(
                    "vault token account does not match {} != {}",
                    account.vault_token(),
                    token.key()
                );
                return Err(ProgramError::InvalidAccountData);
            }
        }

        Ok(())
    }

    /// Unlock eligibility: `current_slot - start_slot >= slots_locked`,
    /// with saturating arithmetic so a clock anomaly can never underflow.
    ///
    /// # Safety
    /// Maps the raw account data, see [`load_state`].
    pub unsafe fn check_unlock_okay(account_info: &AccountInfo) -> Result<(), ProgramError> {
        let data = account_info.borrow_mut_data_unchecked();
        let account = load_state_mut_unchecked::<Vault>(data)?;
        let clock = Clock::get()?;

        let slots_elapsed = clock.slot.saturating_sub(account.start_slot());
        if slots_elapsed < account.slots_locked() {
            let remaining_slots = account.slots_locked().saturating_sub(slots_elapsed);
            log!("vault unlocks in {} slots", remaining_slots);
            return Err(SlotlockError::VaultLocked.into());
        }

        Ok(())
    }

    /// Populates a freshly allocated vault account. `start_slot` and
    /// `slots_locked` are written exactly once here and never touched again
    /// while the vault is live.
    ///
    /// # Safety
    /// Maps the raw account data, see [`load_state`].
    pub unsafe fn initialize(
        account_info: &AccountInfo,
        admin: &Pubkey,
        mint: &Pubkey,
        ix_data: &LockVaultIxData,
        vault_token: &Pubkey,
        mint_decimals: u8,
    ) -> Result<(), ProgramError> {
        let data = account_info.borrow_mut_data_unchecked();
        let account = load_state_mut_unchecked::<Vault>(data)?;

        if account.is_initialized() {
            log!("vault account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let clock = Clock::get()?;

        account.discriminator = PodOption::some(Self::KIND);
        account.bump = ix_data.vault_bump;
        account.admin = *admin;
        account.mint = *mint;
        account.mint_decimals = mint_decimals;
        account.vault_token = *vault_token;
        account.start_slot = PodU64::from(clock.slot);
        account.slots_locked = PodU64::from(ix_data.slots_to_lock.get());

        Ok(())
    }

    // ----------------------- GETTERS ---------------------------

    pub fn discriminator(&self) -> Option<u8> {
        self.discriminator.copied()
    }

    pub fn bump(&self) -> u8 {
        self.bump
    }

    pub fn admin(&self) -> &Pubkey {
        &self.admin
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    pub fn mint_decimals(&self) -> u8 {
        self.mint_decimals
    }

    pub fn vault_token(&self) -> &Pubkey {
        &self.vault_token
    }

    pub fn start_slot(&self) -> u64 {
        self.start_slot.into()
    }

    pub fn slots_locked(&self) -> u64 {
        self.slots_locked.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::load_state_unchecked;
    use core::mem::{align_of, size_of};

    #[test]
    fn vault_image_is_packed() {
        assert_eq!(align_of::<Vault>(), 1);
        assert_eq!(size_of::<Vault>(), 2 + 1 + 32 + 32 + 1 + 32 + 8 + 8 + 32);
        assert_eq!(Vault::LEN, 148);
    }

    #[test]
    fn zeroed_image_is_uninitialized() {
        let bytes = [0u8; Vault::LEN];
        let vault = unsafe { load_state_unchecked::<Vault>(&bytes).unwrap() };
        assert!(!vault.is_initialized());
        assert!(unsafe { load_state::<Vault>(&bytes) }.is_err());
    }

    #[test]
    fn field_offsets_match_wire_layout() {
        let mut vault = Vault::default();
        vault.discriminator = PodOption::some(Vault::KIND);
        vault.bump = 0xFE;
        vault.admin = [0xAA; 32];
        vault.mint = [0xBB; 32];
        vault.mint_decimals = 9;
        vault.vault_token = [0xCC; 32];
        vault.start_slot = PodU64::from(0x0102_0304_0506_0708);
        vault.slots_locked = PodU64::from(10);
        vault.reserved = [0xDD; 32];

        let bytes = unsafe { crate::loaders::as_bytes(&vault) };
        assert_eq!(bytes.len(), 148);
        assert_eq!(bytes[0], 1); // presence tag
        assert_eq!(bytes[1], AccountKind::Vault as u8);
        assert_eq!(bytes[2], 0xFE);
        assert_eq!(&bytes[3..35], &[0xAA; 32]);
        assert_eq!(&bytes[35..67], &[0xBB; 32]);
        assert_eq!(bytes[67], 9);
        assert_eq!(&bytes[68..100], &[0xCC; 32]);
        assert_eq!(&bytes[100..108], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(&bytes[108..116], &[10, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[116..148], &[0xDD; 32]);
    }
}
