pub mod empty_vault;
pub mod lock_vault;

use crate::error::SlotlockError;

/// Instruction opcodes. The leading byte of every instruction payload.
#[repr(u8)]
pub enum SlotlockInstruction {
    LockVault = 0x01,
    EmptyVault = 0x02,
}

impl TryFrom<&u8> for SlotlockInstruction {
    type Error = SlotlockError;

    fn try_from(value: &u8) -> Result<Self, Self::Error> {
        match *value {
            0x01 => Ok(SlotlockInstruction::LockVault),
            0x02 => Ok(SlotlockInstruction::EmptyVault),
            _ => Err(SlotlockError::UnknownInstruction),
        }
    }
}

// An opcode of 0 would alias zeroed instruction data.
const _: () = assert!(SlotlockInstruction::LockVault as u8 != 0);
const _: () = assert!(SlotlockInstruction::EmptyVault as u8 != 0);
