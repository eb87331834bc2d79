use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::Parser;
use election_client::rpc::{RpcClient, RpcGateway, RpcWallet};
use election_client::{DirectoryEntry, ElectionClient, NewElection, Phase};
use tracing::{info, warn};

#[derive(Clone, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Wallet-bridge JSON-RPC endpoint.
    #[arg(short, long, env, default_value = "http://localhost:8545")]
    pub rpc_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Clone)]
pub enum Commands {
    /// List all elections with their phase and remaining time.
    Elections {},
    /// Show one election with candidates and your vote record.
    Show {
        #[arg(long, help = "Election id")]
        id: u64,
    },
    /// Cast a vote for a candidate in an election.
    Vote {
        #[arg(long, help = "Election id")]
        id: u64,

        #[arg(long, help = "Candidate index within the election")]
        candidate: usize,
    },
    /// Create a new election (the gateway enforces the owner restriction).
    CreateElection {
        #[arg(long)]
        title: String,

        #[arg(long, value_delimiter = ',', help = "Comma-separated candidate names")]
        candidates: Vec<String>,

        #[arg(long, help = "Start time, RFC 3339 or YYYY-MM-DDTHH:MM (local)")]
        start: String,

        #[arg(long, help = "End time, RFC 3339 or YYYY-MM-DDTHH:MM (local)")]
        end: String,
    },
    /// Request wallet permission and print the bound account.
    Account {},
    /// Follow wallet account switches until interrupted.
    Watch {
        #[arg(long, default_value = "5", help = "Poll interval in seconds")]
        interval: u64,
    },
}

type Client = ElectionClient<RpcGateway, RpcWallet>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let rpc = Arc::new(RpcClient::new(cli.rpc_url.clone()));
    let client = ElectionClient::new(
        RpcGateway::new(Arc::clone(&rpc)),
        RpcWallet::new(rpc),
    );

    match cli.command {
        Commands::Elections {} => list_elections(&client).await?,
        Commands::Show { id } => show_election(&client, id).await?,
        Commands::Vote { id, candidate } => {
            let account = client.connect().await?;
            info!(%account, "session bound");

            let receipt = client.submit_vote(id, candidate).await?;
            println!(
                "Vote confirmed in block {} (tx {})",
                receipt.block_number, receipt.tx_hash
            );
        }
        Commands::CreateElection {
            title,
            candidates,
            start,
            end,
        } => {
            let account = client.connect().await?;
            info!(%account, "session bound");

            let params = NewElection {
                title: title.clone(),
                candidates,
                start_time: parse_datetime(&start)?,
                end_time: parse_datetime(&end)?,
            };
            let receipt = client.create_election(params).await?;
            println!(
                "Election \"{}\" created in block {} (tx {})",
                title, receipt.block_number, receipt.tx_hash
            );
        }
        Commands::Account {} => {
            let account = client.connect().await?;
            println!("Active account: {}", account);
        }
        Commands::Watch { interval } => {
            if let Ok(account) = client.connect().await {
                println!("Active account: {}", account);
            } else {
                println!("No account bound yet; waiting for the wallet");
            }
            client.on_account_changed(|account| match account {
                Some(account) => println!("Switched to account: {}", account),
                None => println!("Account unbound"),
            });

            tokio::select! {
                _ = client.watch_accounts(Duration::from_secs(interval)) => {}
                _ = tokio::signal::ctrl_c() => info!("interrupted"),
            }
        }
    }
    Ok(())
}

async fn list_elections(client: &Client) -> Result<()> {
    let entries = client.list_elections().await?;
    if entries.is_empty() {
        println!("No elections yet.");
        return Ok(());
    }

    for entry in entries {
        match entry {
            DirectoryEntry::Listed(summary) => {
                let window = format!(
                    "{} .. {}",
                    format_instant(summary.start_time),
                    format_instant(summary.end_time)
                );
                match summary.phase {
                    Phase::Ongoing => println!(
                        "[{}] {} - ongoing, {} remaining ({})",
                        summary.id,
                        summary.title,
                        format_remaining(summary.remaining_secs),
                        window
                    ),
                    phase => println!("[{}] {} - {} ({})", summary.id, summary.title, phase, window),
                }
            }
            DirectoryEntry::Unavailable { id, error } => {
                warn!(id, %error, "election could not be fetched");
                println!("[{}] <unavailable: {}>", id, error);
            }
        }
    }
    Ok(())
}

async fn show_election(client: &Client, id: u64) -> Result<()> {
    // A session is optional for reading; without one the vote record is
    // simply unknown.
    if let Err(err) = client.connect().await {
        warn!(%err, "continuing without a wallet session");
    }

    let view = client.election_details(id).await?;
    println!("Election {}: {}", view.election.id, view.election.title);
    println!(
        "Phase: {} ({} .. {})",
        view.phase,
        format_instant(view.election.start_time),
        format_instant(view.election.end_time)
    );
    if view.phase == Phase::Ongoing {
        println!("Time remaining: {}", format_remaining(view.remaining_secs));
    }
    match view.has_voted {
        Some(true) => println!("You have already voted in this election."),
        Some(false) => println!("You have not voted in this election."),
        None => {}
    }
    for (index, candidate) in view.election.candidates.iter().enumerate() {
        println!("  [{}] {}: {} votes", index, candidate.name, candidate.vote_count);
    }
    Ok(())
}

/// Accepts RFC 3339 or the datetime-local shape `YYYY-MM-DDTHH:MM`,
/// interpreted in the local timezone. Returns unix seconds.
fn parse_datetime(input: &str) -> Result<u64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return u64::try_from(parsed.timestamp()).map_err(|_| anyhow!("time before unix epoch"));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M")
        .with_context(|| format!("unrecognized datetime '{}'", input))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("datetime '{}' does not exist in the local timezone", input))?;
    u64::try_from(local.timestamp()).map_err(|_| anyhow!("time before unix epoch"))
}

fn format_instant(unix_secs: u64) -> String {
    match Local.timestamp_opt(unix_secs as i64, 0).single() {
        Some(instant) => instant.format("%Y-%m-%d %H:%M").to_string(),
        None => format!("@{}", unix_secs),
    }
}

fn format_remaining(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
