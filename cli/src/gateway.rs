//! RPC-backed gateway.
//!
//! Holds two clients: a read client for low-sensitivity queries and a
//! submit client for sending transactions. The submit endpoint is private
//! to this struct: nothing here returns it, displays it or logs
//! it, so callers can hand the read endpoint to untrusted surfaces without
//! leaking where transactions go.

use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_client::RpcClient,
};
use solana_program::program_pack::Pack;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::{Transaction, TransactionError},
};

use slotlock_sdk::{
    gateway::{Gateway, RetryPolicy},
    VaultClientError,
};

pub struct RpcGateway {
    read: RpcClient,
    submit: RpcClient,
    payer: Keypair,
    policy: RetryPolicy,
}

impl RpcGateway {
    /// `submit_url` falls back to the read endpoint when no separate
    /// submission endpoint is configured.
    pub fn new(read_url: String, submit_url: Option<String>, payer: Keypair) -> Self {
        let submit_url = submit_url.unwrap_or_else(|| read_url.clone());
        Self {
            read: RpcClient::new_with_commitment(read_url, CommitmentConfig::confirmed()),
            submit: RpcClient::new_with_commitment(submit_url, CommitmentConfig::confirmed()),
            payer,
            policy: RetryPolicy::default(),
        }
    }

    pub fn payer_pubkey(&self) -> Pubkey {
        self.payer.pubkey()
    }
}

impl Gateway for RpcGateway {
    fn current_slot(&self) -> Result<u64, VaultClientError> {
        self.read.get_slot().map_err(classify)
    }

    fn account_bytes(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, VaultClientError> {
        let response = self
            .read
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .map_err(classify)?;

        Ok(response.value.map(|account| account.data))
    }

    fn token_balance(&self, token_account: &Pubkey) -> Result<u64, VaultClientError> {
        let bytes = match self.account_bytes(token_account)? {
            Some(bytes) => bytes,
            // a missing token account holds nothing
            None => return Ok(0),
        };

        let account = spl_token::state::Account::unpack(&bytes).map_err(|e| {
            VaultClientError::MalformedRecord(format!("token account {token_account}: {e}"))
        })?;

        Ok(account.amount)
    }

    fn submit(
        &self,
        instructions: &[solana_program::instruction::Instruction],
    ) -> Result<(), VaultClientError> {
        self.policy.run(|| {
            // the checkpoint is fetched inside the retry so a stale one is
            // replaced on the next attempt
            let blockhash = self.submit.get_latest_blockhash().map_err(classify)?;

            let transaction = Transaction::new_signed_with_payer(
                instructions,
                Some(&self.payer.pubkey()),
                &[&self.payer],
                blockhash,
            );

            self.submit
                .send_and_confirm_transaction(&transaction)
                .map_err(classify)?;

            Ok(())
        })
    }
}

/// Maps an RPC client error onto the typed failure kinds: expired
/// checkpoints and transport problems are retryable, anything the verifier
/// said no to is surfaced verbatim and terminal.
fn classify(error: ClientError) -> VaultClientError {
    match error.kind() {
        ClientErrorKind::TransactionError(TransactionError::BlockhashNotFound) => {
            VaultClientError::StaleCheckpoint
        }
        ClientErrorKind::TransactionError(tx_error) => {
            VaultClientError::RejectedByVerifier(tx_error.to_string())
        }
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            VaultClientError::TransportFailure(error.to_string())
        }
        _ => {
            // Preflight rejections arrive as RPC response errors with the
            // verifier's message embedded in the text.
            let message = error.to_string();
            if message.contains("Blockhash not found") {
                VaultClientError::StaleCheckpoint
            } else if message.contains("Transaction simulation failed")
                || message.contains("custom program error")
            {
                VaultClientError::RejectedByVerifier(message)
            } else {
                VaultClientError::TransportFailure(message)
            }
        }
    }
}
