use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::{
    error::VaultClientError,
    layout::vault_layout::{
        ADMIN, BUMP, DISCRIMINATOR, HAS_DISCRIMINATOR, LEN, MINT, MINT_DECIMALS, RESERVED,
        REVISION, SLOTS_LOCKED, START_SLOT, VAULT_TOKEN,
    },
};

/// Type tag a live vault account carries in its discriminator byte.
pub const VAULT_DISCRIMINATOR: u8 = 1;

/// Presence tag marking the discriminator as set.
const DISCRIMINATOR_SET: u8 = 1;

/// Decoded vault account.
///
/// A faithful mirror of the on-chain record; the program is the authority
/// on these bytes and this struct never carries state the account does not.
/// The locked amount is deliberately absent: it lives in the vault token
/// account, the only place it cannot drift from reality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vault {
    /// Bump seed the account address was derived with.
    pub bump: u8,
    /// Sole authority permitted to empty the vault.
    pub admin: Pubkey,
    /// Mint of the locked token.
    pub mint: Pubkey,
    /// Decimals of the mint, cached at lock time.
    pub mint_decimals: u8,
    /// Token account owned by the vault address holding the locked balance.
    pub vault_token: Pubkey,
    /// Slot recorded when the vault was created.
    pub start_slot: u64,
    /// Minimum number of slots the vault stays locked.
    pub slots_locked: u64,
    /// Opaque. Preserved verbatim on every round trip, never interpreted.
    pub reserved: [u8; 32],
}

impl Vault {
    pub const LEN: usize = LEN;

    /// Decodes an account buffer.
    ///
    /// Shorter than the fixed layout is [`VaultClientError::TruncatedAccount`];
    /// an unset presence tag or a mismatched type tag is
    /// [`VaultClientError::NotInitialized`]. Bytes past the layout length are
    /// ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, VaultClientError> {
        if bytes.len() < LEN {
            return Err(VaultClientError::TruncatedAccount {
                have: bytes.len(),
                need: LEN,
            });
        }

        if HAS_DISCRIMINATOR.get_u8(bytes) != DISCRIMINATOR_SET
            || DISCRIMINATOR.get_u8(bytes) != VAULT_DISCRIMINATOR
        {
            return Err(VaultClientError::NotInitialized);
        }

        Ok(Self {
            bump: BUMP.get_u8(bytes),
            admin: ADMIN.get_key(bytes),
            mint: MINT.get_key(bytes),
            mint_decimals: MINT_DECIMALS.get_u8(bytes),
            vault_token: VAULT_TOKEN.get_key(bytes),
            start_slot: START_SLOT.get_u64(bytes),
            slots_locked: SLOTS_LOCKED.get_u64(bytes),
            reserved: RESERVED.get_bytes32(bytes),
        })
    }

    /// Encodes the record back into its exact account image, `reserved`
    /// included.
    pub fn encode(&self) -> [u8; LEN] {
        let mut buf = [0u8; LEN];

        HAS_DISCRIMINATOR.put_u8(&mut buf, DISCRIMINATOR_SET);
        DISCRIMINATOR.put_u8(&mut buf, VAULT_DISCRIMINATOR);
        BUMP.put_u8(&mut buf, self.bump);
        ADMIN.put_key(&mut buf, &self.admin);
        MINT.put_key(&mut buf, &self.mint);
        MINT_DECIMALS.put_u8(&mut buf, self.mint_decimals);
        VAULT_TOKEN.put_key(&mut buf, &self.vault_token);
        START_SLOT.put_u64(&mut buf, self.start_slot);
        SLOTS_LOCKED.put_u64(&mut buf, self.slots_locked);
        RESERVED.put(&mut buf, &self.reserved);

        buf
    }

    /// First slot at which the vault can be emptied.
    pub fn unlock_slot(&self) -> u64 {
        self.start_slot.saturating_add(self.slots_locked)
    }

    /// Unlock eligibility is a pure function of the clock.
    pub fn is_unlockable(&self, current_slot: u64) -> bool {
        current_slot >= self.unlock_slot()
    }

    /// Slots remaining until the vault can be emptied; zero once eligible.
    pub fn remaining_slots(&self, current_slot: u64) -> u64 {
        self.unlock_slot().saturating_sub(current_slot)
    }

    /// Transport form of this record.
    pub fn to_record(&self) -> VaultRecord {
        VaultRecord {
            revision: REVISION,
            bump: self.bump,
            admin: self.admin.to_string(),
            mint: self.mint.to_string(),
            mint_decimals: self.mint_decimals,
            vault_token: self.vault_token.to_string(),
            start_slot: self.start_slot.to_string(),
            slots_locked: self.slots_locked.to_string(),
            reserved: self.reserved,
        }
    }

    /// Rebuilds a vault from its transport form.
    pub fn from_record(record: &VaultRecord) -> Result<Self, VaultClientError> {
        if record.revision != REVISION {
            return Err(VaultClientError::MalformedRecord(format!(
                "unsupported layout revision {}",
                record.revision
            )));
        }

        Ok(Self {
            bump: record.bump,
            admin: parse_key(&record.admin)?,
            mint: parse_key(&record.mint)?,
            mint_decimals: record.mint_decimals,
            vault_token: parse_key(&record.vault_token)?,
            start_slot: parse_u64(&record.start_slot)?,
            slots_locked: parse_u64(&record.slots_locked)?,
            reserved: record.reserved,
        })
    }
}

/// Transport-neutral form of [`Vault`].
///
/// 64-bit integers travel as decimal strings so no JSON consumer silently
/// rounds them through a double; keys travel base58; `reserved` stays an
/// index-addressable byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Account layout revision this record was decoded against.
    pub revision: u8,
    pub bump: u8,
    pub admin: String,
    pub mint: String,
    pub mint_decimals: u8,
    pub vault_token: String,
    pub start_slot: String,
    pub slots_locked: String,
    pub reserved: [u8; 32],
}

fn parse_key(value: &str) -> Result<Pubkey, VaultClientError> {
    Pubkey::from_str(value)
        .map_err(|e| VaultClientError::InvalidAddress(format!("{value}: {e}")))
}

fn parse_u64(value: &str) -> Result<u64, VaultClientError> {
    value
        .parse::<u64>()
        .map_err(|_| VaultClientError::MalformedRecord(format!("not a u64: {value}")))
}

impl fmt::Display for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vault:\n\
             ├─ Bump: {}\n\
             ├─ Admin: {}\n\
             ├─ Mint: {} ({} decimals)\n\
             ├─ Vault Token Account: {}\n\
             ├─ Start Slot: {}\n\
             └─ Slots Locked: {}",
            self.bump,
            self.admin,
            self.mint,
            self.mint_decimals,
            self.vault_token,
            self.start_slot,
            self.slots_locked,
        )
    }
}
