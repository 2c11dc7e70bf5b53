use core::fmt;

/// Typed failure for every public operation in this crate.
///
/// Propagation policy: decode and derivation errors are local and final;
/// [`StaleCheckpoint`](VaultClientError::StaleCheckpoint) and
/// [`TransportFailure`](VaultClientError::TransportFailure) are recoverable
/// by retry; [`RejectedByVerifier`](VaultClientError::RejectedByVerifier)
/// carries the on-chain message verbatim and is never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultClientError {
    /// A key could not be parsed.
    InvalidAddress(String),
    /// Account missing, presence tag unset, or type tag mismatched.
    NotInitialized,
    /// Account buffer shorter than the fixed layout length.
    TruncatedAccount { have: usize, need: usize },
    /// Lock attempted while a vault already exists for this (admin, mint).
    AlreadyLocked,
    /// Empty attempted before the lock duration elapsed.
    StillLocked { remaining_slots: u64 },
    /// Caller is not the recorded vault admin.
    NotAdmin,
    /// Lock amount exceeds the admin's token balance.
    InsufficientBalance { requested: u64, available: u64 },
    /// Submission rejected because the recent checkpoint expired.
    StaleCheckpoint,
    /// Network or RPC failure.
    TransportFailure(String),
    /// The on-chain verifier rejected the transaction; message verbatim.
    RejectedByVerifier(String),
    /// A transport-form record failed to parse back into a vault.
    MalformedRecord(String),
}

impl VaultClientError {
    /// Whether a retry (with backoff, or with a fresh checkpoint) can
    /// succeed. Everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VaultClientError::StaleCheckpoint | VaultClientError::TransportFailure(_)
        )
    }
}

impl fmt::Display for VaultClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultClientError::InvalidAddress(detail) => {
                write!(f, "invalid address: {detail}")
            }
            VaultClientError::NotInitialized => {
                write!(f, "vault account does not exist or is not initialized")
            }
            VaultClientError::TruncatedAccount { have, need } => {
                write!(f, "truncated vault account: {have} bytes, need {need}")
            }
            VaultClientError::AlreadyLocked => {
                write!(f, "a vault already exists for this admin and mint")
            }
            VaultClientError::StillLocked { remaining_slots } => {
                write!(f, "vault is still locked for {remaining_slots} more slots")
            }
            VaultClientError::NotAdmin => {
                write!(f, "caller is not the vault admin")
            }
            VaultClientError::InsufficientBalance {
                requested,
                available,
            } => {
                write!(
                    f,
                    "insufficient balance: requested {requested}, available {available}"
                )
            }
            VaultClientError::StaleCheckpoint => {
                write!(f, "recent checkpoint expired before submission landed")
            }
            VaultClientError::TransportFailure(detail) => {
                write!(f, "transport failure: {detail}")
            }
            VaultClientError::RejectedByVerifier(detail) => {
                write!(f, "rejected by verifier: {detail}")
            }
            VaultClientError::MalformedRecord(detail) => {
                write!(f, "malformed vault record: {detail}")
            }
        }
    }
}

impl std::error::Error for VaultClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_kinds_are_retryable() {
        assert!(VaultClientError::StaleCheckpoint.is_retryable());
        assert!(VaultClientError::TransportFailure("timeout".into()).is_retryable());

        assert!(!VaultClientError::NotInitialized.is_retryable());
        assert!(!VaultClientError::AlreadyLocked.is_retryable());
        assert!(!VaultClientError::StillLocked { remaining_slots: 5 }.is_retryable());
        assert!(!VaultClientError::RejectedByVerifier("custom error 2".into()).is_retryable());
    }

    #[test]
    fn verifier_message_is_verbatim() {
        let err = VaultClientError::RejectedByVerifier("custom program error: 0x2".into());
        assert_eq!(
            err.to_string(),
            "rejected by verifier: custom program error: 0x2"
        );
    }
}
