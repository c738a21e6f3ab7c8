use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{format_err, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tracing::info;

use xess_claim::merkle::{leaf_hash, leaf_hash_v2, MerkleTree};
use xess_client::chain::commitment_from_str;
use xess_client::config::{load_cfg, read_keypair_file, ClientConfig};
use xess_client::entitlement::decode_hex32;
use xess_client::instructions::admin_instructions::*;
use xess_client::logging::{self, LogLevel};
use xess_client::{
    format_xess, ClaimChain, ClaimReconciler, HttpEntitlementProvider, KeypairWallet,
    ReconcilerConfig, RpcChain,
};

#[derive(Debug, Parser)]
pub struct Opts {
    /// Path to the INI client config.
    #[arg(long, default_value = "client_config.ini")]
    pub config: String,
    /// Repeat for more detail (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[clap(subcommand)]
    pub command: XessClaimCommands,
}

#[derive(Debug, Parser)]
pub enum XessClaimCommands {
    /// Claim the latest epoch for the payer wallet.
    Claim,
    /// Claim every outstanding epoch, oldest first as listed by the server.
    ClaimAll,
    /// Show whether the payer wallet already claimed an epoch.
    Status {
        #[arg(long)]
        epoch: u64,
    },
    InitConfig {
        #[arg(long)]
        admin: Pubkey,
        #[arg(long)]
        mint: Pubkey,
    },
    SetEpochRoot {
        #[arg(long)]
        epoch: u64,
        /// 32-byte merkle root as 64 hex characters.
        #[arg(long)]
        root_hex: String,
    },
    SetAdmin {
        #[arg(long)]
        new_admin: Pubkey,
    },
    SetMint {
        #[arg(long)]
        new_mint: Pubkey,
    },
    /// Build the merkle root and proofs for an epoch from a JSON leaves file.
    MerkleRoot {
        #[arg(long)]
        leaves_file: PathBuf,
        #[arg(long)]
        epoch: u64,
    },
}

/// One allocation in a `merkle-root` leaves file; the leaf index is its
/// position in the array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeafInput {
    claimer: String,
    amount_atomic: String,
    #[serde(default)]
    claim_salt_hex: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeafOutput {
    claimer: String,
    amount_atomic: String,
    index: u32,
    version: u8,
    proof: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MerkleOutput {
    epoch: String,
    root_hex: String,
    leaves: Vec<LeafOutput>,
}

fn parse_root(root_hex: &str) -> Result<[u8; 32]> {
    let root = decode_hex32(root_hex).map_err(|e| format_err!("root_hex: {}", e))?;
    if root == [0u8; 32] {
        return Err(format_err!("root_hex must not be all zeros"));
    }
    Ok(root)
}

fn build_merkle(epoch: u64, leaves: Vec<LeafInput>) -> Result<MerkleOutput> {
    let mut hashes = Vec::with_capacity(leaves.len());
    let mut parsed = Vec::with_capacity(leaves.len());
    for (i, leaf) in leaves.into_iter().enumerate() {
        let index = u32::try_from(i).map_err(|_| format_err!("too many leaves"))?;
        let claimer = Pubkey::from_str(&leaf.claimer)
            .map_err(|e| format_err!("leaf {}: claimer {:?}: {}", i, leaf.claimer, e))?;
        let amount = leaf
            .amount_atomic
            .parse::<u64>()
            .map_err(|e| format_err!("leaf {}: amountAtomic {:?}: {}", i, leaf.amount_atomic, e))?;
        let (hash, version) = match &leaf.claim_salt_hex {
            None => (leaf_hash(&claimer, epoch, amount, index), 1),
            Some(salt_hex) => {
                let salt = decode_hex32(salt_hex)
                    .map_err(|e| format_err!("leaf {}: claimSaltHex: {}", i, e))?;
                (leaf_hash_v2(&claimer, epoch, amount, index, &salt), 2)
            }
        };
        hashes.push(hash);
        parsed.push((leaf, index, version));
    }

    let tree = MerkleTree::new(hashes).ok_or_else(|| format_err!("leaves file is empty"))?;
    let leaves = parsed
        .into_iter()
        .map(|(leaf, index, version)| {
            let proof = tree
                .proof(index as usize)
                .ok_or_else(|| format_err!("no proof for leaf {}", index))?;
            Ok(LeafOutput {
                claimer: leaf.claimer,
                amount_atomic: leaf.amount_atomic,
                index,
                version,
                proof: proof.iter().map(hex::encode).collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MerkleOutput {
        epoch: epoch.to_string(),
        root_hex: hex::encode(tree.root()),
        leaves,
    })
}

async fn send_admin_txn(
    chain: &RpcChain,
    config: &ClientConfig,
    payer: &Keypair,
    instructions: &[Instruction],
) -> Result<Signature> {
    let recent_hash = chain.latest_blockhash().await?;
    let txn = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &[payer],
        recent_hash,
    );
    let signature = tokio::time::timeout(config.confirm_timeout, chain.send_and_confirm(&txn))
        .await
        .map_err(|_| format_err!("transaction {} not confirmed in time", txn.signatures[0]))??;
    Ok(signature)
}

type Reconciler = ClaimReconciler<HttpEntitlementProvider, KeypairWallet, RpcChain>;

fn build_reconciler(config: &ClientConfig, payer: Keypair, chain: RpcChain) -> Reconciler {
    let provider = HttpEntitlementProvider::new(config.api_url.clone(), config.session_cookie.clone());
    ClaimReconciler::new(
        provider,
        KeypairWallet::new(payer),
        chain,
        ReconcilerConfig {
            program_id: config.xess_claim_program,
            confirm_timeout: config.confirm_timeout,
        },
    )
}

fn merkle_root(leaves_file: &Path, epoch: u64) -> Result<()> {
    let raw = std::fs::read_to_string(leaves_file)
        .map_err(|e| format_err!("failed to read {}: {}", leaves_file.display(), e))?;
    let leaves: Vec<LeafInput> = serde_json::from_str(&raw)?;
    let output = build_merkle(epoch, leaves)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    logging::try_init(LogLevel::from_flags(opts.verbose, opts.quiet)).map_err(|e| format_err!(e))?;

    // The only command that needs neither config nor keypair.
    if let XessClaimCommands::MerkleRoot { leaves_file, epoch } = &opts.command {
        return merkle_root(leaves_file, *epoch);
    }

    let client_config = load_cfg(&opts.config)?;
    let payer = read_keypair_file(&client_config.payer_path)?;
    let program_id = client_config.xess_claim_program;
    let chain = RpcChain::new(
        client_config.http_url.clone(),
        commitment_from_str(&client_config.commitment),
    );

    match opts.command {
        XessClaimCommands::Claim => {
            let reconciler = build_reconciler(&client_config, payer, chain);
            let entitlement = reconciler.prepare_single_claim().await?;
            let tx = reconciler.claim_single(&entitlement).await?;
            println!(
                "Claimed {} XESS for {}",
                format_xess(u128::from(tx.amount_atomic), 2),
                entitlement.label()
            );
            println!("{}", tx.signature);
        }
        XessClaimCommands::ClaimAll => {
            let reconciler = build_reconciler(&client_config, payer, chain);
            let batch = reconciler.claim_all_outstanding().await?;
            if batch.total_epochs == 0 {
                println!("No rewards ready to claim");
                return Ok(());
            }
            for attempt in &batch.attempts {
                match &attempt.outcome {
                    Ok(tx) => println!("epoch {}: {}", attempt.epoch, tx.signature),
                    Err(err) => println!("epoch {}: failed: {}", attempt.epoch, err),
                }
            }
            println!("{}", batch.summary());
        }
        XessClaimCommands::Status { epoch } => {
            let reconciler = build_reconciler(&client_config, payer, chain);
            let status = reconciler.claim_status(epoch).await?;
            match status.claimed_version {
                Some(version) => println!("epoch {}: claimed (v{})", epoch, version),
                None => println!("epoch {}: not claimed", epoch),
            }
        }
        XessClaimCommands::InitConfig { admin, mint } => {
            let ix = initialize_instr(&program_id, payer.pubkey(), admin, mint);
            let signature = send_admin_txn(&chain, &client_config, &payer, &[ix]).await?;
            println!("{}", signature);
        }
        XessClaimCommands::SetEpochRoot { epoch, root_hex } => {
            let root = parse_root(&root_hex)?;
            let ix = set_epoch_root_instr(&program_id, payer.pubkey(), payer.pubkey(), epoch, root);
            let signature = send_admin_txn(&chain, &client_config, &payer, &[ix]).await?;
            info!(epoch, root = %hex::encode(root), "epoch root published");
            println!("{}", signature);
        }
        XessClaimCommands::SetAdmin { new_admin } => {
            let ix = set_admin_instr(&program_id, payer.pubkey(), new_admin);
            let signature = send_admin_txn(&chain, &client_config, &payer, &[ix]).await?;
            println!("{}", signature);
        }
        XessClaimCommands::SetMint { new_mint } => {
            let ix = set_mint_instr(&program_id, payer.pubkey(), new_mint);
            let signature = send_admin_txn(&chain, &client_config, &payer, &[ix]).await?;
            println!("{}", signature);
        }
        XessClaimCommands::MerkleRoot { leaves_file, epoch } => merkle_root(&leaves_file, epoch)?,
    }
    Ok(())
}
