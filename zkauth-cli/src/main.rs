//! zkauth
//!
//! Command-line driver for a zkauth deployment: register a password
//! commitment for a login, prove knowledge of it to transfer tokens, and
//! inspect registration state.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use zkauth_client::flows::{REGISTRATION_SUCCESS_MESSAGE, TRANSFER_SUCCESS_MESSAGE};
use zkauth_client::{
    truncate_for_display, AuthBackend, Credentials, Phase, ZkAuthClient, ZkAuthConfig, ZkAuthError,
};
use zkauth_common::{password_to_secret, HashChainPair};
use zkauth_prover::{ProofEngine, SnarkjsProver};

#[derive(Parser)]
#[command(name = "zkauth", version, about = "Password-authorized token transfers")]
struct Args {
    /// JSON configuration file. Without it, `ZKAUTH_*` variables are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend base URL.
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// snarkjs executable used to generate proofs.
    #[arg(long, global = true, default_value = "snarkjs", env = "ZKAUTH_SNARKJS")]
    snarkjs: PathBuf,

    /// Override the circuit program (`.wasm`).
    #[arg(long, global = true)]
    wasm: Option<PathBuf>,

    /// Override the proving key (`.zkey`).
    #[arg(long, global = true)]
    zkey: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register the commitment of a password for a login.
    Register {
        #[arg(long)]
        login: String,
        #[arg(long, env = "ZKAUTH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Prove knowledge of the password and transfer tokens to a recipient.
    Transfer {
        #[arg(long)]
        login: String,
        #[arg(long, env = "ZKAUTH_PASSWORD", hide_env_values = true)]
        password: String,
        /// Recipient address (0x-prefixed, 42 characters).
        #[arg(long)]
        recipient: String,
    },
    /// Check whether a login is registered.
    Status {
        #[arg(long)]
        login: String,
    },
    /// Print the public hashes a password proves against.
    Statement {
        #[arg(long, env = "ZKAUTH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print explorer links for the deployment, or for a transaction.
    Links {
        #[arg(long)]
        tx: Option<String>,
    },
    /// Switch the configured wallet to the deployment chain and track the token.
    WalletSetup,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zkauth=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = load_config(&args)?;
    debug!(backend = %config.backend_url, chain_id = %config.chain_id, "configuration loaded");

    let engine: Arc<dyn ProofEngine> = Arc::new(SnarkjsProver::new(&args.snarkjs));
    let client = ZkAuthClient::connect(config, engine).context("failed to set up zkauth client")?;

    match args.command {
        Command::Register { login, password } => {
            let credentials = Credentials::new(login, password);
            let outcome = run_flow(&client, client.register(&credentials)).await;
            report(&client, REGISTRATION_SUCCESS_MESSAGE, outcome)
        }
        Command::Transfer {
            login,
            password,
            recipient,
        } => {
            let credentials = Credentials::new(login, password).with_recipient(recipient);
            let outcome = run_flow(&client, client.transfer(&credentials)).await;
            report(&client, TRANSFER_SUCCESS_MESSAGE, outcome)
        }
        Command::Status { login } => {
            let registered = client
                .backend()
                .is_user_registered(&login)
                .await
                .with_context(|| format!("failed to query registration of {:?}", login))?;
            println!(
                "{}: {}",
                login,
                if registered { "registered" } else { "not registered" }
            );
            Ok(())
        }
        Command::Statement { password } => {
            let secret = password_to_secret(&password).context("invalid password")?;
            let statement = HashChainPair::from_secret(secret).statement();
            println!("passwordHash        {}", statement.password_hash);
            println!("passwordPlusOneHash {}", statement.password_plus_one_hash);
            Ok(())
        }
        Command::Links { tx } => {
            let links = client.explorer();
            match tx {
                Some(tx) => println!("{}", links.tx(&tx)),
                None => {
                    println!("token    {}", links.token());
                    println!("contract {}", links.contract());
                }
            }
            Ok(())
        }
        Command::WalletSetup => {
            client.prepare_wallet().await;
            Ok(())
        }
    }
}

fn load_config(args: &Args) -> Result<ZkAuthConfig> {
    let base = match &args.config {
        Some(path) => ZkAuthConfig::from_file(path)?,
        None => ZkAuthConfig::from_env()?,
    };
    apply_overrides(args, base)
}

/// Command-line flags win over file and environment values.
fn apply_overrides(args: &Args, mut config: ZkAuthConfig) -> Result<ZkAuthConfig> {
    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(wasm) = &args.wasm {
        config.circuit.program = wasm.clone();
    }
    if let Some(zkey) = &args.zkey {
        config.circuit.proving_key = zkey.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Drive `flow` while echoing session progress to stderr.
async fn run_flow<F>(client: &ZkAuthClient, flow: F) -> Result<String, ZkAuthError>
where
    F: Future<Output = Result<String, ZkAuthError>>,
{
    let mut updates = client.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.phase == Phase::Busy {
                eprintln!("{}", state.display_message());
            }
            if state.phase.is_terminal() {
                break;
            }
        }
    });

    let outcome = flow.await;
    printer.abort();
    outcome
}

fn report(client: &ZkAuthClient, success: &str, outcome: Result<String, ZkAuthError>) -> Result<()> {
    match outcome {
        Ok(tx) => {
            println!("{}", success);
            info!(tx = %tx, "transaction submitted");
            println!("{}", client.explorer().tx(&tx));
            Ok(())
        }
        Err(e) => bail!("{}", truncate_for_display(&e.user_message())),
    }
}
