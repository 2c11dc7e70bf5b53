use pinocchio::program_error::ProgramError;

/// Program-specific error codes, surfaced as `ProgramError::Custom`.
#[derive(Clone, PartialEq)]
pub enum SlotlockError {
    /// Leading opcode byte is not a known instruction.
    UnknownInstruction,
    /// Instruction payload has the wrong length for its opcode.
    InvalidInstructionData,
    /// Empty was attempted before the lock duration elapsed.
    VaultLocked,
}

impl From<SlotlockError> for ProgramError {
    fn from(e: SlotlockError) -> Self {
        Self::Custom(e as u32)
    }
}
