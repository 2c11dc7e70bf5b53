#![allow(dead_code)]

use anyhow::{anyhow, Result};
use solana_program_test::{BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    clock::Clock,
    commitment_config::CommitmentLevel,
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use spl_token::state::{Account as TokenAccount, Mint};

use slotlock_sdk::Vault;

/// Test harness around `solana-program-test` with the real program binary.
///
/// Build it first:
/// `cargo-build-sbf && SBF_OUT_DIR=$(pwd)/target/sbf-solana-solana/release cargo test`
pub struct TestBuilder {
    pub context: ProgramTestContext,
}

impl TestBuilder {
    pub async fn new() -> Self {
        let mut program_test = ProgramTest::new(
            "slotlock_program",
            Pubkey::new_from_array(slotlock_program::id()),
            None,
        );
        program_test.prefer_bpf(true);

        let context = program_test.start_with_context().await;

        Self { context }
    }

    pub fn payer(&self) -> Keypair {
        self.context.payer.insecure_clone()
    }

    pub async fn send_transaction(
        &mut self,
        instructions: &[Instruction],
        signers: &[&Keypair],
    ) -> Result<()> {
        let blockhash = self
            .context
            .banks_client
            .get_latest_blockhash()
            .await
            .map_err(|e| anyhow!("failed to get blockhash: {}", e))?;

        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.context.payer.pubkey()),
            signers,
            blockhash,
        );

        self.context
            .banks_client
            .process_transaction_with_preflight_and_commitment(
                transaction,
                CommitmentLevel::Processed,
            )
            .await
            .map_err(|e| anyhow!("failed to send transaction: {}", e))?;

        Ok(())
    }

    /// Creates a mint with 9 decimals, authority = payer.
    pub async fn create_mint(&mut self, mint: &Keypair) -> Result<()> {
        let payer = self.payer();
        let rent = self
            .context
            .banks_client
            .get_rent()
            .await
            .map_err(|e| anyhow!("failed to get rent: {}", e))?;

        let instructions = [
            system_instruction::create_account(
                &payer.pubkey(),
                &mint.pubkey(),
                rent.minimum_balance(Mint::LEN),
                Mint::LEN as u64,
                &spl_token::id(),
            ),
            spl_token::instruction::initialize_mint2(
                &spl_token::id(),
                &mint.pubkey(),
                &payer.pubkey(),
                None,
                9,
            )?,
        ];

        self.send_transaction(&instructions, &[&payer, mint]).await
    }

    /// Mints base units into an associated token account owned by `to`,
    /// creating the account if needed.
    pub async fn mint_to(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        let payer = self.payer();

        let instructions = [
            create_associated_token_account_idempotent(
                &payer.pubkey(),
                to,
                mint,
                &spl_token::id(),
            ),
            spl_token::instruction::mint_to(
                &spl_token::id(),
                mint,
                &get_associated_token_address(to, mint),
                &payer.pubkey(),
                &[],
                amount,
            )?,
        ];

        self.send_transaction(&instructions, &[&payer]).await
    }

    pub async fn get_token_account(&mut self, token_account: &Pubkey) -> Result<TokenAccount> {
        let account = self
            .context
            .banks_client
            .get_account(*token_account)
            .await?
            .ok_or(BanksClientError::ClientError("token account not found"))?;

        TokenAccount::unpack(&account.data)
            .map_err(|e| anyhow!("failed to unpack token account: {}", e))
    }

    /// Reads and decodes a vault through the SDK codec, so every test also
    /// checks the codec against bytes the program actually wrote.
    pub async fn get_vault_account(&mut self, vault: &Pubkey) -> Result<Vault> {
        let account = self
            .context
            .banks_client
            .get_account(*vault)
            .await?
            .ok_or_else(|| anyhow!("vault account not found"))?;

        Vault::decode(&account.data).map_err(|e| anyhow!("failed to decode vault: {}", e))
    }

    pub async fn get_current_slot(&mut self) -> Result<u64> {
        let clock: Clock = self.context.banks_client.get_sysvar().await?;
        Ok(clock.slot)
    }

    pub async fn warp_slot_incremental(&mut self, incremental_slots: u64) -> Result<()> {
        let current = self.get_current_slot().await?;
        self.context
            .warp_to_slot(current.saturating_add(incremental_slots))
            .map_err(|_| anyhow!("failed to warp slot"))?;
        Ok(())
    }
}
