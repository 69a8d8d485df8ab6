//! badge-mint: mint a daily badge from the command line.
//!
//! ```text
//! BADGE_MINT_PRIVATE_KEY ─▶ Wallet ─▶ SessionProvider (connected)
//! config.toml + env ─────▶ AppConfig ─▶ ChainClient ─▶ Reader / Writer / Watcher
//!                                                          │
//!                                   MintManager ◀──────────┘
//!                                        │ state, balance
//!                                        ▼
//!                                    terminal output
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use badge_mint::blockchain::{ChainClient, ContractReader, ContractWriter, ReceiptWatcher, Wallet};
use badge_mint::config::{load_config, AppConfig, MintConfig, NetworkConfig};
use badge_mint::mint::{
    BalanceView, Gateways, ManagerSettings, MintHandle, MintManager, MintState, SubmitOutcome, TxHandle,
};
use badge_mint::observability::init_logging;
use badge_mint::session::SessionProvider;

#[derive(Parser)]
#[command(name = "badge-mint")]
#[command(about = "Mint daily badges and follow them to confirmation", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults plus environment if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print states and balances as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the badge count of the signing account
    Balance,
    /// Mint today's badge with an answer
    Mint {
        /// What inspired you today?
        answer: String,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability);

    if let Commands::Config = cli.command {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!(
        app = %config.app.name,
        network = config.network.kind.name(),
        contract = %config.contract.address,
        "badge-mint starting"
    );

    let wallet = Wallet::from_env(config.network.chain_id())?;
    let client = ChainClient::new(config.network.clone()).await?;
    let gateways = Gateways::new(
        Arc::new(ContractReader::new(client.clone(), &config.contract)),
        Arc::new(ContractWriter::new(&config.network, &config.contract, &wallet)?),
        Arc::new(ReceiptWatcher::new(client)),
    );

    let session = SessionProvider::connected(wallet.address());
    let settings = ManagerSettings {
        reason_max_len: config.mint.reason_max_len,
    };
    let (handle, task) = MintManager::spawn(gateways, session.subscribe(), settings);

    let outcome = tokio::select! {
        outcome = run(&cli.command, &handle, &config, cli.json) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, unmounting");
            Err("interrupted".into())
        }
    };

    handle.unmount();
    let _ = task.await;

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

async fn run(command: &Commands, handle: &MintHandle, config: &AppConfig, json: bool) -> CliResult {
    let read_wait = read_wait(&config.network);

    match command {
        Commands::Balance => {
            let mut balance = handle.watch_balance();
            let settled = balance.wait_for(|view| view.value.is_some() || view.notice.is_some());
            if tokio::time::timeout(read_wait, settled).await.is_err() {
                return Err(format!("balance query did not settle within {:?}", read_wait).into());
            }
            print_balance(&handle.balance(), json)
        }
        Commands::Mint { answer } => {
            match handle.submit(answer.as_str()).await {
                SubmitOutcome::Accepted(attempt) => tracing::debug!(%attempt, "Mint accepted"),
                SubmitOutcome::Rejected(e) => return Err(e.into()),
                SubmitOutcome::NotReady | SubmitOutcome::Unmounted => {
                    return Err("minter is not ready".into());
                }
            }

            match follow(handle, &config.mint, json).await {
                MintState::Confirmed(_) => {}
                MintState::Failed(reason) => return Err(reason.into_error().into()),
                _ => return Err("wallet disconnected before the mint settled".into()),
            }

            match tokio::time::timeout(read_wait, handle.settled_balance()).await {
                Ok(Some(view)) => print_balance(&view, json),
                Ok(None) => Err("minter stopped before the balance refresh".into()),
                Err(_) => Err(format!("balance refresh did not settle within {:?}", read_wait).into()),
            }
        }
        Commands::Config => Ok(()),
    }
}

/// Longest a balance read may take: one timeout per endpoint tried.
fn read_wait(network: &NetworkConfig) -> Duration {
    let endpoints = 1 + network.failover_urls.len() as u64;
    Duration::from_secs(network.rpc_timeout_secs.saturating_mul(endpoints))
}

/// Print every observed state until the attempt settles.
async fn follow(handle: &MintHandle, display: &MintConfig, json: bool) -> MintState {
    let mut states = handle.watch_state();
    loop {
        let state = states.borrow_and_update().clone();
        let settled = if json {
            print_json(&state);
            state.is_terminal() || state == MintState::Idle
        } else {
            print_state(&state, display)
        };
        if settled {
            return state;
        }
        if states.changed().await.is_err() {
            return handle.state();
        }
    }
}

/// Human-readable line for `state`; true once the attempt has settled.
fn print_state(state: &MintState, display: &MintConfig) -> bool {
    let preview = |tx: &TxHandle| tx.preview(display.tx_preview_head, display.tx_preview_tail);
    match state {
        MintState::Submitting => println!("{}", state.label()),
        MintState::Confirming(tx) => println!("{} Tx: {}", state.label(), preview(tx)),
        MintState::Confirmed(tx) => println!("✅ Badge minted successfully! Tx: {}", preview(tx)),
        MintState::Failed(_) | MintState::Idle => {}
    }
    state.is_terminal() || *state == MintState::Idle
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::error!(error = %e, "Failed to encode output"),
    }
}

/// Print `view`; a read notice without any value is an error.
fn print_balance(view: &BalanceView, json: bool) -> CliResult {
    if json {
        print_json(view);
    } else if let Some(value) = view.value {
        println!("Your badges: {}", value);
    }
    match (&view.notice, view.value) {
        (Some(notice), None) => Err(notice.clone().into()),
        (Some(notice), Some(_)) => {
            if !json {
                eprintln!("{}", notice);
            }
            Ok(())
        }
        (None, _) => Ok(()),
    }
}
