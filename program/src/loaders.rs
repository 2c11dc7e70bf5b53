//! Zero-copy account and instruction loading.
//!
//! Everything that crosses the wire implements [`Blob`]: a fixed-size,
//! 1-byte-aligned image that can be mapped onto raw bytes without copying.
//! State accounts additionally implement [`AccountState`], which ties the
//! image to a leading discriminator tag.

use pinocchio::{account_info::AccountInfo, program_error::ProgramError};
use pinocchio_log::log;

use crate::error::SlotlockError;

/// Fixed-size byte image. Implementors must be `repr(C)` with alignment 1.
pub trait Blob {
    const LEN: usize;
}

/// A program-owned account image with a presence-tagged type byte.
pub trait AccountState: Blob {
    const KIND: u8;

    fn is_initialized(&self) -> bool;
}

/// # Safety
/// `T` must be 1-byte aligned with no padding; the mapping is a plain
/// pointer cast and every bit pattern of the source must be a valid `T`.
#[inline(always)]
pub unsafe fn load_state<T: AccountState>(bytes: &[u8]) -> Result<&T, ProgramError> {
    load_state_unchecked::<T>(bytes).and_then(|state| {
        if state.is_initialized() {
            Ok(state)
        } else {
            Err(ProgramError::UninitializedAccount)
        }
    })
}

/// # Safety
/// Same contract as [`load_state`], without the initialization check.
#[inline(always)]
pub unsafe fn load_state_unchecked<T: Blob>(bytes: &[u8]) -> Result<&T, ProgramError> {
    if bytes.len() != T::LEN {
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(&*(bytes.as_ptr() as *const T))
}

/// # Safety
/// Same contract as [`load_state`], for mutable access.
#[inline(always)]
pub unsafe fn load_state_mut_unchecked<T: Blob>(bytes: &mut [u8]) -> Result<&mut T, ProgramError> {
    if bytes.len() != T::LEN {
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(&mut *(bytes.as_mut_ptr() as *mut T))
}

/// # Safety
/// Same contract as [`load_state`]. Instruction payloads must match the
/// opcode's layout length exactly.
#[inline(always)]
pub unsafe fn load_ix_data<T: Blob>(bytes: &[u8]) -> Result<&T, ProgramError> {
    if bytes.len() != T::LEN {
        return Err(SlotlockError::InvalidInstructionData.into());
    }
    Ok(&*(bytes.as_ptr() as *const T))
}

/// # Safety
/// `T` must be 1-byte aligned with no padding and no uninitialized bytes.
#[inline(always)]
pub unsafe fn as_bytes<T: Blob>(data: &T) -> &[u8] {
    core::slice::from_raw_parts(data as *const T as *const u8, T::LEN)
}

// --------------------- ACCOUNT EXPECTATIONS ---------------------

pub fn expect_signer(info: &AccountInfo, writable: bool) -> Result<(), ProgramError> {
    if !info.is_signer() {
        log!("account is not a signer");
        return Err(ProgramError::MissingRequiredSignature);
    }
    if writable && !info.is_writable() {
        log!("signer is not writable");
        return Err(ProgramError::InvalidAccountData);
    }

    Ok(())
}

pub fn expect_token_program(info: &AccountInfo) -> Result<(), ProgramError> {
    if info.key().ne(&pinocchio_token::id()) {
        log!("account is not the token program");
        return Err(ProgramError::IncorrectProgramId);
    }

    Ok(())
}

pub fn expect_system_program(info: &AccountInfo) -> Result<(), ProgramError> {
    if info.key().ne(&pinocchio_system::id()) {
        log!("account is not the system program");
        return Err(ProgramError::IncorrectProgramId);
    }

    Ok(())
}

/// The account must still belong to the system program with no data, i.e.
/// not yet allocated by this program. A populated account here means the
/// vault already exists.
pub fn expect_unallocated(info: &AccountInfo, writable: bool) -> Result<(), ProgramError> {
    if unsafe { info.owner() }.ne(&pinocchio_system::id()) {
        log!("account is not owned by the system program");
        return Err(ProgramError::InvalidAccountOwner);
    }

    if !info.data_is_empty() {
        log!("account data is not empty");
        return Err(ProgramError::AccountAlreadyInitialized);
    }

    if writable && !info.is_writable() {
        log!("account is not writable");
        return Err(ProgramError::InvalidAccountData);
    }

    Ok(())
}
