use anyhow::Result;
use clap::{Parser, Subcommand};
use solara_bridge::offline::{generate_offline_response_random, simulated_offline_response};
use solara_bridge::{Config, ModeTransition, ReplySource, SolaraBridge};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Resilient chat client for the Solara creative-process endpoint.
#[derive(Parser, Debug)]
#[command(name = "solara", version, about)]
struct Cli {
    /// Config file (defaults to $SOLARA_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start in forced-offline mode
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one message, or chat line by line from stdin
    Chat {
        /// User id sent with each message
        #[arg(long)]
        user: Option<String>,
        /// Message to send; omit for interactive mode
        message: Option<String>,
    },
    /// Probe the endpoint once
    Health,
    /// Clear the availability cache and probe again
    Refresh,
    /// Reply with the local generator only
    Offline {
        message: String,
        #[arg(long)]
        user: Option<String>,
        /// Add the simulated thinking delay
        #[arg(long)]
        simulate: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the JSON schema of the config file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("solara_bridge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &config.config_path {
        tracing::debug!(path = %path.display(), "Loaded config");
    }

    match cli.command {
        Commands::Offline {
            message,
            user,
            simulate,
        } => {
            let user = user.unwrap_or_else(|| config.default_user_id.clone());
            let text = if simulate {
                simulated_offline_response(&message, &user).await
            } else {
                generate_offline_response_random(&message, &user)
            };
            println!("{text}");
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => print!("{}", config.to_toml()?),
            ConfigAction::Schema => println!("{}", Config::json_schema()?),
        },
        Commands::Health => {
            let bridge = build_bridge(&config, cli.offline).await;
            exit_with_health(bridge.check_health().await);
        }
        Commands::Refresh => {
            let bridge = build_bridge(&config, cli.offline).await;
            exit_with_health(bridge.force_refresh().await);
        }
        Commands::Chat { user, message } => {
            let bridge = build_bridge(&config, cli.offline).await;
            match message {
                Some(message) => {
                    let reply = bridge.send(&message, user.as_deref()).await;
                    println!("{}", reply.text);
                }
                None => interactive(&bridge, user.as_deref()).await?,
            }
        }
    }

    Ok(())
}

async fn build_bridge(config: &Config, offline: bool) -> SolaraBridge {
    let bridge = SolaraBridge::from_config(config);
    if offline {
        bridge.set_forced_offline(true).await;
    }
    bridge
}

fn exit_with_health(available: bool) -> ! {
    println!("{}", if available { "available" } else { "unavailable" });
    std::process::exit(if available { 0 } else { 1 });
}

/// Line-by-line chat. Lines starting with `/` are control commands.
async fn interactive(bridge: &SolaraBridge, user: Option<&str>) -> Result<()> {
    eprintln!("Type a message, or /offline /online /refresh /status /events /quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/quit" | "/exit" => break,
            "/offline" => {
                bridge.set_forced_offline(true).await;
                eprintln!("Offline mode enabled. Using local responses.");
            }
            "/online" => match bridge.set_forced_offline(false).await {
                ModeTransition::WentOnline { reachable: true } => {
                    eprintln!("Back online; endpoint reachable.")
                }
                ModeTransition::WentOnline { reachable: false } => {
                    eprintln!("Back online, but the endpoint is not responding.")
                }
                _ => eprintln!("Already online."),
            },
            "/refresh" => {
                let available = bridge.force_refresh().await;
                eprintln!("Endpoint {}", if available { "available" } else { "unavailable" });
            }
            "/status" => {
                let snapshot = bridge.availability();
                let checked = snapshot
                    .last_checked_at
                    .map_or_else(|| "never".to_string(), |t| t.to_rfc3339());
                eprintln!(
                    "offline mode: {}, endpoint: {}, last checked: {checked}",
                    bridge.is_forced_offline(),
                    snapshot.available.as_str()
                );
            }
            "/events" => {
                for entry in bridge.context().events().entries().iter().rev() {
                    eprintln!(
                        "{} [{}] {}: {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.level.as_str(),
                        entry.source,
                        entry.message
                    );
                }
            }
            message => {
                let reply = bridge.send(message, user).await;
                if let ReplySource::Local(reason) = reply.source {
                    eprintln!("(local reply: {})", reason.as_str());
                }
                println!("{}", reply.text);
            }
        }
    }

    Ok(())
}
