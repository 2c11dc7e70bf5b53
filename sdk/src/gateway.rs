//! Transaction gateway boundary.
//!
//! The chain is reached only through the [`Gateway`] trait, so the core
//! never holds an endpoint itself. Implementations keep their submission
//! endpoint private; reads may go through a separately exposed,
//! low-sensitivity endpoint, but nothing in this API returns or displays
//! where a transaction was submitted.

use std::thread;
use std::time::Duration;

use solana_program::{instruction::Instruction, pubkey::Pubkey};

use crate::{
    config::ClientConfig,
    derive::{vault_address, verify_vault_address},
    error::VaultClientError,
    vault::Vault,
};

/// Minimal chain access the vault client needs.
///
/// Reads are pure and idempotent. `submit` signs with the implementation's
/// configured identity, obtains a fresh checkpoint, and blocks until the
/// transaction is confirmed or a typed failure is known. After a
/// confirmation timeout the correct recovery is to re-read state through
/// the idempotent reads, never to resubmit blindly: the original
/// transaction may still land.
pub trait Gateway {
    fn current_slot(&self) -> Result<u64, VaultClientError>;

    /// Raw account bytes, or `None` if the account does not exist.
    fn account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, VaultClientError>;

    /// Base-unit balance of a token account; zero if it does not exist.
    fn token_balance(&self, token_account: &Pubkey) -> Result<u64, VaultClientError>;

    fn submit(&self, instructions: &[Instruction]) -> Result<(), VaultClientError>;
}

/// Derives the vault address for `(admin, mint)`, reads it, decodes it and
/// verifies the record re-derives to the address it was read from.
///
/// `Ok(None)` means no vault exists for the pair: a normal pre-lock state,
/// not an error.
pub fn fetch_vault<G: Gateway>(
    gateway: &G,
    config: &ClientConfig,
    admin: &Pubkey,
    mint: &Pubkey,
) -> Result<Option<(Pubkey, Vault)>, VaultClientError> {
    let (address, _) = vault_address(config, admin, mint);

    let bytes = match gateway.account_bytes(&address)? {
        Some(bytes) => bytes,
        None => return Ok(None),
    };

    let vault = Vault::decode(&bytes)?;
    verify_vault_address(config, &address, &vault)?;

    Ok(Some((address, vault)))
}

/// Bounded retry for gateway operations.
///
/// Only [`VaultClientError::is_retryable`] kinds are retried:
/// `TransportFailure` after an exponentially growing pause,
/// `StaleCheckpoint` immediately (the retry itself fetches a fresh
/// checkpoint). Terminal errors and exhausted attempts surface unchanged.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> Result<T, VaultClientError>,
    ) -> Result<T, VaultClientError> {
        let mut backoff = self.initial_backoff;

        for _ in 1..self.max_attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => return Err(error),
                // a stale checkpoint is refreshed by the retry itself
                Err(VaultClientError::StaleCheckpoint) => {}
                Err(_) => {
                    thread::sleep(backoff);
                    backoff = (backoff * 2).min(self.max_backoff);
                }
            }
        }

        // last attempt, whatever it returns stands
        op()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StaticGateway {
        slot: u64,
        accounts: Vec<(Pubkey, Vec<u8>)>,
    }

    impl Gateway for StaticGateway {
        fn current_slot(&self) -> Result<u64, VaultClientError> {
            Ok(self.slot)
        }

        fn account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, VaultClientError> {
            Ok(self
                .accounts
                .iter()
                .find(|(key, _)| key == address)
                .map(|(_, bytes)| bytes.clone()))
        }

        fn token_balance(&self, _token_account: &Pubkey) -> Result<u64, VaultClientError> {
            Ok(0)
        }

        fn submit(&self, _instructions: &[Instruction]) -> Result<(), VaultClientError> {
            Ok(())
        }
    }

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn fetch_vault_absent_is_ok_none() {
        let config = ClientConfig::new(Pubkey::new_unique());
        let gateway = StaticGateway {
            slot: 1,
            accounts: vec![],
        };

        let fetched =
            fetch_vault(&gateway, &config, &Pubkey::new_unique(), &Pubkey::new_unique()).unwrap();
        assert!(fetched.is_none());
    }

    #[test]
    fn fetch_vault_decodes_and_verifies() {
        let config = ClientConfig::new(Pubkey::new_unique());
        let admin = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (address, bump) = vault_address(&config, &admin, &mint);

        let vault = Vault {
            bump,
            admin,
            mint,
            mint_decimals: 9,
            vault_token: Pubkey::new_unique(),
            start_slot: 5,
            slots_locked: 10,
            reserved: [0; 32],
        };
        let gateway = StaticGateway {
            slot: 7,
            accounts: vec![(address, vault.encode().to_vec())],
        };

        let (fetched_address, fetched) = fetch_vault(&gateway, &config, &admin, &mint)
            .unwrap()
            .unwrap();
        assert_eq!(fetched_address, address);
        assert_eq!(fetched, vault);
    }

    #[test]
    fn fetch_vault_rejects_record_address_mismatch() {
        let config = ClientConfig::new(Pubkey::new_unique());
        let admin = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (address, bump) = vault_address(&config, &admin, &mint);

        // a record claiming a different admin cannot re-derive to `address`
        let foreign = Vault {
            bump,
            admin: Pubkey::new_unique(),
            mint,
            mint_decimals: 9,
            vault_token: Pubkey::new_unique(),
            start_slot: 5,
            slots_locked: 10,
            reserved: [0; 32],
        };
        let gateway = StaticGateway {
            slot: 7,
            accounts: vec![(address, foreign.encode().to_vec())],
        };

        assert!(matches!(
            fetch_vault(&gateway, &config, &admin, &mint),
            Err(VaultClientError::InvalidAddress(_))
        ));
    }

    #[test]
    fn retry_stops_at_first_success() {
        let calls = RefCell::new(0u32);
        let result = instant_policy(5).run(|| {
            *calls.borrow_mut() += 1;
            if *calls.borrow() < 3 {
                Err(VaultClientError::TransportFailure("flaky".into()))
            } else {
                Ok(42)
            }
        });

        assert_eq!(result, Ok(42));
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn retry_gives_up_after_max_attempts() {
        let calls = RefCell::new(0u32);
        let result: Result<(), _> = instant_policy(4).run(|| {
            *calls.borrow_mut() += 1;
            Err(VaultClientError::TransportFailure("down".into()))
        });

        assert!(result.is_err());
        assert_eq!(*calls.borrow(), 4);
    }

    #[test]
    fn terminal_errors_are_not_retried() {
        let calls = RefCell::new(0u32);
        let result: Result<(), _> = instant_policy(5).run(|| {
            *calls.borrow_mut() += 1;
            Err(VaultClientError::RejectedByVerifier("custom error 4".into()))
        });

        assert_eq!(
            result,
            Err(VaultClientError::RejectedByVerifier("custom error 4".into()))
        );
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn stale_checkpoint_is_retried() {
        let calls = RefCell::new(0u32);
        let result = instant_policy(3).run(|| {
            *calls.borrow_mut() += 1;
            if *calls.borrow() == 1 {
                Err(VaultClientError::StaleCheckpoint)
            } else {
                Ok("landed")
            }
        });

        assert_eq!(result, Ok("landed"));
        assert_eq!(*calls.borrow(), 2);
    }
}
