#![allow(unexpected_cfgs)]

pub mod error;
pub mod instructions;
pub mod loaders;
pub mod pod;
pub mod state;

pinocchio_pubkey::declare_id!("DUGupzap1Yj13NzwMeUPC6gXF9rJRVpLkkzG7jPTLRjz");

use pinocchio::{
    account_info::AccountInfo, default_panic_handler, no_allocator, program_entrypoint,
    program_error::ProgramError, pubkey::Pubkey, ProgramResult,
};
use pinocchio_log::log;

use crate::instructions::{
    empty_vault::process_empty_vault, lock_vault::process_lock_vault, SlotlockInstruction,
};

program_entrypoint!(process_instruction);

no_allocator!();

default_panic_handler!();

#[inline(always)]
fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let (opcode, _) = instruction_data
        .split_first()
        .ok_or(ProgramError::InvalidInstructionData)?;

    match SlotlockInstruction::try_from(opcode)? {
        SlotlockInstruction::LockVault => {
            log!("slotlock: lock vault");
            process_lock_vault(program_id, accounts, instruction_data)
        }
        SlotlockInstruction::EmptyVault => {
            log!("slotlock: empty vault");
            process_empty_vault(program_id, accounts, instruction_data)
        }
    }
}
