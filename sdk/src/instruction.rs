//! Instruction encoding and transaction building.
//!
//! Payload layouts come from [`crate::layout`]; the builders compose address
//! derivation with the associated-token-account derivations and emit the
//! exact positional account lists the program destructures. Account order is
//! part of the wire contract: the program indexes accounts by position, so a
//! reorder here is a protocol break.

use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};

use crate::{
    config::ClientConfig,
    derive::vault_address,
    layout::{empty_ix_layout, lock_ix_layout},
};

/// Opcode of the lock operation.
pub const LOCK_VAULT_OPCODE: u8 = 1;
/// Opcode of the empty operation.
pub const EMPTY_VAULT_OPCODE: u8 = 2;

// Opcode 0 would alias zeroed payload bytes.
const _: () = assert!(LOCK_VAULT_OPCODE != 0);
const _: () = assert!(EMPTY_VAULT_OPCODE != 0);

/// Operand fields of a lock instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockIxData {
    /// Bump of the vault PDA the program will re-derive.
    pub vault_bump: u8,
    /// Lock duration in slots.
    pub slots_to_lock: u64,
    /// Amount to lock; `None` sweeps the admin's entire balance.
    pub tokens_to_lock: Option<u64>,
}

impl LockIxData {
    /// Encodes the payload. The amount region is written whether or not an
    /// amount is present: zero-filled on `None`, so no byte of the fixed
    /// 19-byte image is ever left over from earlier memory.
    pub fn encode(&self) -> [u8; lock_ix_layout::LEN] {
        let mut buf = [0u8; lock_ix_layout::LEN];

        lock_ix_layout::OPCODE.put_u8(&mut buf, LOCK_VAULT_OPCODE);
        lock_ix_layout::BUMP.put_u8(&mut buf, self.vault_bump);
        lock_ix_layout::SLOTS_TO_LOCK.put_u64(&mut buf, self.slots_to_lock);
        match self.tokens_to_lock {
            Some(amount) => {
                lock_ix_layout::AMOUNT_TAG.put_u8(&mut buf, 1);
                lock_ix_layout::AMOUNT.put_u64(&mut buf, amount);
            }
            None => {
                lock_ix_layout::AMOUNT_TAG.put_u8(&mut buf, 0);
                lock_ix_layout::AMOUNT.put_u64(&mut buf, 0);
            }
        }

        buf
    }

    /// Decodes a payload produced by [`encode`](Self::encode). `None` on
    /// anything that is not a well-formed lock payload.
    pub fn unpack(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != lock_ix_layout::LEN
            || lock_ix_layout::OPCODE.get_u8(bytes) != LOCK_VAULT_OPCODE
        {
            return None;
        }

        let tokens_to_lock = match lock_ix_layout::AMOUNT_TAG.get_u8(bytes) {
            0 => None,
            1 => Some(lock_ix_layout::AMOUNT.get_u64(bytes)),
            _ => return None,
        };

        Some(Self {
            vault_bump: lock_ix_layout::BUMP.get_u8(bytes),
            slots_to_lock: lock_ix_layout::SLOTS_TO_LOCK.get_u64(bytes),
            tokens_to_lock,
        })
    }
}

/// Encodes the empty payload: the opcode byte alone.
pub fn encode_empty_ix() -> [u8; empty_ix_layout::LEN] {
    [EMPTY_VAULT_OPCODE]
}

/// The positional account list shared by lock and empty:
/// `[vault (w), admin (ws), mint, admin_token (w), vault_token (w),
///   token_program, system_program]`
fn vault_operation_accounts(
    config: &ClientConfig,
    vault: Pubkey,
    admin: &Pubkey,
    mint: &Pubkey,
    admin_token: Pubkey,
    vault_token: Pubkey,
) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(vault, false),
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(admin_token, false),
        AccountMeta::new(vault_token, false),
        AccountMeta::new_readonly(config.token_program_id, false),
        AccountMeta::new_readonly(config.system_program_id, false),
    ]
}

/// Builds the lock operation as an explicit two-instruction sequence:
///
/// 1. idempotent creation of the vault's associated token account, a no-op
///    when the account already exists, so the pair can be resubmitted
///    without special-casing;
/// 2. the lock instruction itself.
///
/// Callers that know the token account exists may drop the first step.
pub fn lock_vault_ix(
    config: &ClientConfig,
    admin: &Pubkey,
    mint: &Pubkey,
    slots_to_lock: u64,
    tokens_to_lock: Option<u64>,
) -> [Instruction; 2] {
    let (vault, vault_bump) = vault_address(config, admin, mint);

    let admin_token = get_associated_token_address(admin, mint);
    let vault_token = get_associated_token_address(&vault, mint);

    let ix_data = LockIxData {
        vault_bump,
        slots_to_lock,
        tokens_to_lock,
    };

    let lock_ix = Instruction {
        program_id: config.program_id,
        accounts: vault_operation_accounts(config, vault, admin, mint, admin_token, vault_token),
        data: ix_data.encode().to_vec(),
    };

    let vault_ata_ix =
        create_associated_token_account_idempotent(admin, &vault, mint, &config.token_program_id);

    [vault_ata_ix, lock_ix]
}

/// Builds the empty operation.
///
/// The admin's associated token account is re-created idempotently first:
/// an admin who closed their token account while the vault was locked would
/// otherwise see the unlock transaction fail with no obvious cause. The
/// vault's token account is required to already exist, so no creation step
/// precedes it.
pub fn empty_vault_ix(config: &ClientConfig, admin: &Pubkey, mint: &Pubkey) -> [Instruction; 2] {
    let (vault, _) = vault_address(config, admin, mint);

    let admin_token = get_associated_token_address(admin, mint);
    let vault_token = get_associated_token_address(&vault, mint);

    let empty_ix = Instruction {
        program_id: config.program_id,
        accounts: vault_operation_accounts(config, vault, admin, mint, admin_token, vault_token),
        data: encode_empty_ix().to_vec(),
    };

    let admin_ata_ix =
        create_associated_token_account_idempotent(admin, admin, mint, &config.token_program_id);

    [admin_ata_ix, empty_ix]
}
