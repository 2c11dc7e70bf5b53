//! Client-side mirror of the vault lifecycle.
//!
//! The execution environment is the authority on every transition; this
//! module only re-states its rules so a doomed request can fail locally,
//! with a specific error, before a network round trip is spent on it. A
//! passing plan here is a necessary condition, never a sufficient one; the
//! chain may still reject a transaction built from a stale read.

use solana_program::pubkey::Pubkey;

use crate::{error::VaultClientError, vault::Vault};

/// Lifecycle: `Uninitialized → Locked → Unlockable → Closed`.
///
/// `Unlockable` is not a stored state; it is `Locked` with the lock
/// duration elapsed, derived from the clock. `Closed` is observationally
/// identical to `Uninitialized` on chain (the account is gone) and is
/// reported only for a vault known to have just been emptied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Uninitialized,
    Locked,
    Unlockable,
    Closed,
}

/// Classifies observed chain state: the decoded vault (or its absence) plus
/// the current slot.
pub fn assess(vault: Option<&Vault>, current_slot: u64) -> LockState {
    match vault {
        None => LockState::Uninitialized,
        Some(vault) if vault.is_unlockable(current_slot) => LockState::Unlockable,
        Some(_) => LockState::Locked,
    }
}

/// Pre-validates a lock and resolves the effective amount.
///
/// Legal only from `Uninitialized`, and only if the admin holds the
/// requested amount; `None` sweeps the entire balance. Returns the amount
/// that would be locked.
pub fn plan_lock(
    existing: Option<&Vault>,
    admin_balance: u64,
    tokens_to_lock: Option<u64>,
) -> Result<u64, VaultClientError> {
    if existing.is_some() {
        return Err(VaultClientError::AlreadyLocked);
    }

    match tokens_to_lock {
        Some(requested) if requested > admin_balance => {
            Err(VaultClientError::InsufficientBalance {
                requested,
                available: admin_balance,
            })
        }
        Some(requested) => Ok(requested),
        None => Ok(admin_balance),
    }
}

/// Pre-validates an empty: the caller must be the recorded admin and the
/// lock duration must have elapsed.
pub fn plan_empty(
    vault: &Vault,
    caller: &Pubkey,
    current_slot: u64,
) -> Result<(), VaultClientError> {
    if vault.admin != *caller {
        return Err(VaultClientError::NotAdmin);
    }

    if !vault.is_unlockable(current_slot) {
        return Err(VaultClientError::StillLocked {
            remaining_slots: vault.remaining_slots(current_slot),
        });
    }

    Ok(())
}
