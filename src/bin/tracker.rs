use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use hyperliquid_tracker::api::InfoClient;
use hyperliquid_tracker::config::{AppConfig, CONFIG_PATH};
use hyperliquid_tracker::engine;
use hyperliquid_tracker::notify::Notifier;
use hyperliquid_tracker::state::ObservationStore;
use hyperliquid_tracker::store::{AddOutcome, RemoveOutcome, WalletStore};
use hyperliquid_tracker::telegram::{Command, TelegramClient, WELCOME_TEXT, parse_command};
use hyperliquid_tracker::{INFO_API_URL, TELEGRAM_API_BASE};

#[derive(Parser)]
#[command(name = "tracker", about = "Hyperliquid wallet activity tracker bot")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = AppConfig::load(Path::new(&args.config))?;

    // The only fatal condition: no way to reach the chat.
    let bot_token = config.bot_token()?;
    let chat_id = config.chat_id()?;

    let poll_interval = Duration::from_secs(config.settings.poll_interval_secs);
    let wallets = Arc::new(WalletStore::new(&config.settings.wallet_file));
    let info_client = InfoClient::new(INFO_API_URL)?;
    let notifier = Notifier::new(TelegramClient::new(TELEGRAM_API_BASE, &bot_token)?, &chat_id);
    let mut observations = ObservationStore::new();

    info!(
        "Starting tracker — wallet file: {}, poll interval: {}s",
        config.settings.wallet_file, config.settings.poll_interval_secs,
    );

    // Command handling runs as its own task; it shares nothing with the
    // poll loop except the wallet store.
    {
        let wallets = Arc::clone(&wallets);
        let telegram = TelegramClient::new(TELEGRAM_API_BASE, &bot_token)?;
        tokio::spawn(async move {
            command_loop(telegram, wallets).await;
        });
    }

    info!("Entering polling loop. Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = tokio::time::sleep(poll_interval) => {
                poll_cycle(&info_client, &wallets, &mut observations, &notifier).await;
            }
        }
    }

    Ok(())
}

/// One polling cycle: for every tracked wallet, fetch fills and open
/// orders, detect deltas, and deliver one notification per event. A fetch
/// failure for one wallet never stops the remaining wallets from being
/// processed and never delays the next cycle.
async fn poll_cycle(
    client: &InfoClient,
    wallets: &WalletStore,
    observations: &mut ObservationStore,
    notifier: &Notifier,
) {
    // Re-read the list every cycle so adds and removes take effect without
    // a restart.
    let tracked = match wallets.snapshot().await {
        Ok(list) => list,
        Err(e) => {
            warn!("Failed to load wallet list: {e:#}");
            return;
        }
    };

    for wallet in &tracked {
        // A failed fill fetch collapses to an empty history: no events,
        // dedup state untouched.
        let fills = client.fetch_fills(wallet).await.unwrap_or_else(|e| {
            warn!("{e:#}");
            Vec::new()
        });
        let mut events = engine::detect_fill_events(observations, wallet, &fills);

        // A failed open-orders fetch skips the diff entirely. Diffing
        // against an empty set here would report every resting order as
        // cancelled and overwrite the committed set with garbage.
        match client.fetch_open_orders(wallet).await {
            Ok(orders) => {
                events.extend(engine::detect_order_events(observations, wallet, &orders));
            }
            Err(e) => warn!("{e:#}"),
        }

        for event in &events {
            notifier.notify(event).await;
        }
    }
}

/// Long-poll for chat commands and apply them to the wallet store.
/// Replies go to the chat each command arrived in.
async fn command_loop(telegram: TelegramClient, wallets: Arc<WalletStore>) {
    let mut offset = 0i64;
    loop {
        let updates = match telegram.get_updates(offset).await {
            Ok(u) => u,
            Err(e) => {
                warn!("{e:#}");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else { continue };
            let Some(command) = message.text.as_deref().and_then(parse_command) else {
                continue;
            };

            let reply = run_command(&wallets, command).await;
            let chat = message.chat.id.to_string();
            if let Err(e) = telegram.send_message(&chat, &reply, true).await {
                warn!("Failed to reply in chat {chat}: {e:#}");
            }
        }
    }
}

/// Map a command to its wallet-store operation and reply text.
async fn run_command(wallets: &WalletStore, command: Command) -> String {
    match command {
        Command::Start => WELCOME_TEXT.to_string(),
        Command::Add(address) => match wallets.add(&address).await {
            Ok(AddOutcome::Added) => format!("Added wallet: {}", address.to_lowercase()),
            Ok(AddOutcome::AlreadyTracked) => "Wallet already followed.".to_string(),
            Err(e) => {
                warn!("Failed to add wallet: {e:#}");
                "Failed to update the wallet list.".to_string()
            }
        },
        Command::Remove(address) => match wallets.remove(&address).await {
            Ok(RemoveOutcome::Removed) => format!("Removed wallet: {}", address.to_lowercase()),
            Ok(RemoveOutcome::NotFound) => "Wallet not found.".to_string(),
            Err(e) => {
                warn!("Failed to remove wallet: {e:#}");
                "Failed to update the wallet list.".to_string()
            }
        },
        Command::List => match wallets.snapshot().await {
            Ok(list) if list.is_empty() => "No wallets followed.".to_string(),
            Ok(list) => format!("📋 Followed wallets:\n{}", list.join("\n")),
            Err(e) => {
                warn!("Failed to list wallets: {e:#}");
                "Failed to read the wallet list.".to_string()
            }
        },
    }
}
