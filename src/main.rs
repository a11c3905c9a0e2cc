mod api;
mod attribution;
mod config;
mod display;
mod error;
mod queue;
mod rank;
mod rate_limit;
mod sampler;
mod store;
mod tracker;

use api::client::RiotApiClient;
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::Config;
use display::output::{display_attributed_matches, display_error, display_info, display_players, display_success};
use error::AppError;
use sampler::Sampler;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use store::blob::FileBlobStore;
use store::players::{PlayerAccount, PlayerRegistry};
use tracker::Tracker;

#[derive(Parser, Debug)]
#[command(name = "LP Tracker")]
#[command(about = "Track ranked LP changes per match across snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a player for tracking
    Add {
        /// Riot Game Name
        game_name: String,
        /// Riot Tag (tag line)
        tag_line: String,
    },
    /// List tracked players
    Players,
    /// Run one snapshot polling cycle now
    Sample,
    /// Fetch new matches and attribute LP (one player, or all)
    Update {
        /// "Name#TAG"; all tracked players when omitted
        riot_id: Option<String>,
    },
    /// Show a player's attributed match history
    Show {
        /// "Name#TAG"
        riot_id: String,
        /// Ranked queue: solo or flex
        #[arg(short, long, default_value = "solo")]
        queue: String,
    },
    /// Run the tracker daemon (sampler + periodic attribution)
    Run,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let blobs = Arc::new(FileBlobStore::new(config.data_dir.clone()));
    let client = Arc::new(RiotApiClient::new(config.clone()));
    let registry = PlayerRegistry::new(blobs.clone());

    match cli.command {
        Command::Add { game_name, tag_line } => {
            display_info(&format!("Looking up {}#{}...", game_name, tag_line));
            let account = client.get_account(&game_name, &tag_line)?;
            let riot_id = format!("{}#{}", account.game_name, account.tag_line);
            let added = registry.add(PlayerAccount {
                riot_id: riot_id.clone(),
                puuid: account.puuid,
                region: config.region.clone(),
                added_at: Utc::now(),
            })?;
            if added {
                display_success(&format!("Now tracking {}", riot_id));
            } else {
                display_info(&format!("{} is already tracked", riot_id));
            }
        }

        Command::Players => {
            display_players(&registry.list()?);
        }

        Command::Sample => {
            let sampler = Sampler::new(client, blobs, Duration::from_secs(60));
            sampler.poll_once();
        }

        Command::Update { riot_id } => {
            let tracker = Tracker::new(client, blobs);
            for account in resolve_players(&registry, riot_id.as_deref())? {
                let outcome = tracker.update_player(&account)?;
                display_success(&format!(
                    "{}: {} new match(es), {} newly attributed",
                    account.riot_id, outcome.new_matches, outcome.newly_attributed
                ));
            }
        }

        Command::Show { riot_id, queue: queue_arg } => {
            let queue_id = queue::from_cli(&queue_arg)?;
            let account = registry
                .find(&riot_id)?
                .ok_or_else(|| AppError::PlayerNotFound(riot_id.clone()))?;
            let tracker = Tracker::new(client, blobs);
            let matches = tracker
                .match_store()
                .get_attributed_matches(&account.riot_id, queue_id)?;
            display_attributed_matches(&account.riot_id, queue::name(queue_id), &matches);
        }

        Command::Run => {
            let interval = Duration::from_secs(config.poll_minutes * 60);
            display_info(&format!(
                "Starting daemon (polling every {} minutes)",
                config.poll_minutes
            ));

            let sampler = Sampler::new(client.clone(), blobs.clone(), interval);
            let _sampler_thread = sampler.start();

            // Attribution runs on the same cadence, offset behind the
            // sampler so fresh snapshots are visible to each pass.
            let tracker = Tracker::new(client, blobs);
            loop {
                thread::sleep(interval / 2);
                for account in resolve_players(&registry, None)? {
                    match tracker.update_player(&account) {
                        Ok(outcome) => {
                            if outcome.new_matches > 0 || outcome.newly_attributed > 0 {
                                display_success(&format!(
                                    "{}: {} new, {} attributed",
                                    account.riot_id,
                                    outcome.new_matches,
                                    outcome.newly_attributed
                                ));
                            }
                        }
                        Err(e) => {
                            // Upstream hiccups mean "no data this cycle",
                            // never a dead daemon.
                            display_error(&format!("{}: {}", account.riot_id, e));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn resolve_players(
    registry: &PlayerRegistry<FileBlobStore>,
    riot_id: Option<&str>,
) -> Result<Vec<PlayerAccount>, AppError> {
    match riot_id {
        Some(id) => {
            let account = registry
                .find(id)?
                .ok_or_else(|| AppError::PlayerNotFound(id.to_string()))?;
            Ok(vec![account])
        }
        None => registry.list(),
    }
}
