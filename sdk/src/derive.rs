//! Deterministic vault address derivation.
//!
//! The vault address is a PDA over `["VAULT", admin, mint]`, so exactly one
//! vault can exist per (admin, mint) pair and anyone holding the three
//! public inputs can reproduce it. The bump is searched downward from 255
//! until the address falls off the curve; derivation is pure and
//! repeatable.

use solana_program::pubkey::Pubkey;

use crate::{config::ClientConfig, error::VaultClientError, vault::Vault};

/// Seed tag, shared with the on-chain program.
pub const VAULT_SEED: &[u8] = b"VAULT";

/// Finds the canonical `(address, bump)` for a vault.
///
/// Seed-space exhaustion aborts inside `find_program_address`; that case is
/// cryptographically negligible and treated as fatal, not as an error value.
pub fn vault_address(config: &ClientConfig, admin: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[VAULT_SEED, admin.as_ref(), mint.as_ref()],
        &config.program_id,
    )
}

/// Recomputes the vault address for a known bump, as the program does
/// on-chain.
pub fn vault_address_with_bump(
    config: &ClientConfig,
    admin: &Pubkey,
    mint: &Pubkey,
    bump: u8,
) -> Result<Pubkey, VaultClientError> {
    Pubkey::create_program_address(
        &[VAULT_SEED, admin.as_ref(), mint.as_ref(), &[bump]],
        &config.program_id,
    )
    .map_err(|e| VaultClientError::InvalidAddress(format!("bump {bump}: {e}")))
}

/// Checks that a decoded vault actually lives at `address`: the address must
/// re-derive from the record's own admin, mint and stored bump. A mismatch
/// means the account cannot be trusted as a vault for that pair.
pub fn verify_vault_address(
    config: &ClientConfig,
    address: &Pubkey,
    vault: &Vault,
) -> Result<(), VaultClientError> {
    let expected = vault_address_with_bump(config, &vault.admin, &vault.mint, vault.bump)?;
    if expected != *address {
        return Err(VaultClientError::InvalidAddress(format!(
            "vault record does not derive to {address}"
        )));
    }

    Ok(())
}
