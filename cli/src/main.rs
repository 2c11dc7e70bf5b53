use std::{path::PathBuf, str::FromStr};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};

use slotlock_sdk::{
    derive::vault_address,
    gateway::{fetch_vault, Gateway},
    instruction::{empty_vault_ix, lock_vault_ix},
    layout::vault_layout,
    lifecycle::{self, LockState},
    ClientConfig, Vault,
};

mod gateway;
use gateway::RpcGateway;

/// Program id of the deployed vault program; overridable per invocation.
const DEFAULT_PROGRAM_ID: &str = "DUGupzap1Yj13NzwMeUPC6gXF9rJRVpLkkzG7jPTLRjz";

#[derive(Parser, Debug)]
#[command(name = "slotlock")]
#[command(about = "Slotlock time-locked vault CLI", long_about = None)]
struct Cli {
    /// Read-only RPC endpoint. Low sensitivity, safe to show.
    #[arg(
        short,
        long,
        env = "RPC",
        default_value = "https://api.mainnet-beta.solana.com"
    )]
    rpc: String,

    /// Transaction submission endpoint. Kept private; never printed.
    /// Falls back to the read endpoint when unset.
    #[arg(long, env = "SUBMIT_RPC")]
    submit_rpc: Option<String>,

    /// Vault program id
    #[arg(long, env = "PROGRAM_ID", default_value = DEFAULT_PROGRAM_ID)]
    program_id: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// View all vaults administered by a wallet
    View {
        /// Wallet to query vaults for
        #[arg(short, long, env = "WALLET")]
        wallet: String,

        /// Print decoded vaults as JSON transport records
        #[arg(long)]
        json: bool,
    },

    /// Lock tokens in a vault
    Lock {
        /// Path to the signing keypair file
        #[arg(short, long, env = "KEYPAIR")]
        keypair: PathBuf,

        /// Token mint address
        #[arg(short, long)]
        mint: String,

        /// Amount to lock, in base units. Locks the full balance if omitted
        #[arg(short, long)]
        tokens_to_lock: Option<u64>,

        /// Number of slots the vault stays locked
        #[arg(short, long)]
        slots_to_lock: u64,
    },

    /// Empty an unlockable vault and withdraw all tokens
    Empty {
        /// Path to the signing keypair file
        #[arg(short, long, env = "KEYPAIR")]
        keypair: PathBuf,

        /// Token mint address
        #[arg(short, long)]
        mint: String,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let program_id = Pubkey::from_str(&cli.program_id)
        .map_err(|e| anyhow!("could not read program id: {}", e))?;
    let config = ClientConfig::new(program_id);

    match &cli.command {
        Commands::View { wallet, json } => {
            let wallet = Pubkey::from_str(wallet).map_err(|e| anyhow!("could not read wallet: {}", e))?;

            println!("\n=== Viewing vaults for wallet: {} ===", wallet);
            println!("RPC address: {}", cli.rpc);

            let read_client = RpcClient::new(cli.rpc.clone());
            view_vaults(&read_client, &config, &wallet, *json)
        }

        Commands::Lock {
            keypair,
            mint,
            tokens_to_lock,
            slots_to_lock,
        } => {
            let keypair = load_keypair(keypair)?;
            let mint = Pubkey::from_str(mint).map_err(|e| anyhow!("could not read mint: {}", e))?;

            println!("\n=== Locking vault ===");
            println!("RPC address: {}", cli.rpc);
            println!("Mint: {}", mint);
            println!(
                "Tokens to lock: {}",
                tokens_to_lock.map_or("All".to_string(), |a| a.to_string())
            );
            println!("Slots to lock: {}", slots_to_lock);

            let gateway = RpcGateway::new(cli.rpc.clone(), cli.submit_rpc.clone(), keypair);
            lock_vault(&gateway, &config, &mint, *tokens_to_lock, *slots_to_lock)
        }

        Commands::Empty { keypair, mint } => {
            let keypair = load_keypair(keypair)?;
            let mint = Pubkey::from_str(mint).map_err(|e| anyhow!("could not read mint: {}", e))?;

            println!("\n=== Emptying vault ===");
            println!("RPC address: {}", cli.rpc);
            println!("Mint: {}", mint);

            let gateway = RpcGateway::new(cli.rpc.clone(), cli.submit_rpc.clone(), keypair);
            empty_vault(&gateway, &config, &mint)
        }
    }
}

fn load_keypair(path: &PathBuf) -> Result<Keypair> {
    read_keypair_file(path).map_err(|e| anyhow!("could not read keypair: {}", e))
}

fn view_vaults(
    read_client: &RpcClient,
    config: &ClientConfig,
    wallet: &Pubkey,
    json: bool,
) -> Result<()> {
    let scan_config = RpcProgramAccountsConfig {
        filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
            vault_layout::ADMIN.offset,
            wallet.to_bytes().to_vec(),
        ))]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            data_slice: None,
            commitment: None,
            min_context_slot: None,
        },
        with_context: None,
        sort_results: None,
    };

    let results = read_client
        .get_program_accounts_with_config(&config.program_id, scan_config)
        .map_err(|e| anyhow!("could not fetch accounts: {}", e))?;

    if results.is_empty() {
        println!("No vaults found");
        return Ok(());
    }

    let current_slot = read_client
        .get_slot()
        .map_err(|e| anyhow!("could not fetch current slot: {}", e))?;

    for (address, account) in results {
        let vault = Vault::decode(&account.data)
            .map_err(|e| anyhow!("could not decode vault {}: {}", address, e))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&vault.to_record())?);
            continue;
        }

        let state = match lifecycle::assess(Some(&vault), current_slot) {
            LockState::Unlockable => "unlockable".to_string(),
            _ => format!("locked, {} slots remaining", vault.remaining_slots(current_slot)),
        };

        println!("\n{}", address);
        println!("{}", vault);
        println!("   ({})\n", state);
    }

    Ok(())
}

fn lock_vault(
    gateway: &RpcGateway,
    config: &ClientConfig,
    mint: &Pubkey,
    tokens_to_lock: Option<u64>,
    slots_to_lock: u64,
) -> Result<()> {
    let admin = gateway.payer_pubkey();

    // Pre-validate locally before spending a round trip on a doomed
    // transaction. The chain re-checks all of this authoritatively.
    let existing = fetch_vault(gateway, config, &admin, mint)?;
    let admin_token =
        spl_associated_token_account::get_associated_token_address(&admin, mint);
    let balance = gateway.token_balance(&admin_token)?;
    let effective =
        lifecycle::plan_lock(existing.as_ref().map(|(_, vault)| vault), balance, tokens_to_lock)?;

    let ixs = lock_vault_ix(config, &admin, mint, slots_to_lock, tokens_to_lock);
    gateway.submit(&ixs)?;

    let (vault, _) = vault_address(config, &admin, mint);
    println!("\nLocked {} base units for {} slots", effective, slots_to_lock);
    println!("Vault: {}", vault);

    Ok(())
}

fn empty_vault(gateway: &RpcGateway, config: &ClientConfig, mint: &Pubkey) -> Result<()> {
    let admin = gateway.payer_pubkey();

    let (address, vault) = match fetch_vault(gateway, config, &admin, mint)? {
        Some(found) => found,
        None => bail!("no vault exists for this admin and mint"),
    };

    let current_slot = gateway.current_slot()?;
    lifecycle::plan_empty(&vault, &admin, current_slot)?;

    let ixs = empty_vault_ix(config, &admin, mint);
    gateway.submit(&ixs)?;

    println!("\nEmptied vault {}", address);

    Ok(())
}
