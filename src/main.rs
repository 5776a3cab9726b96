// MIT License - Copyright (c) 2026 Peter Wright
// Alarm receiver daemon

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use alarm_receiver::{
    AlarmReceiverService, AlarmServer, AlertStore, JsonLinesAlertStore, LogAlertStore,
    ReceiverConfig,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "alarm-receiver")]
#[command(about = "Receive Contact ID and SIA alarm signaling over TCP and raise alerts")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "alarm-receiver.toml")]
    config: String,

    /// Override the listening interface from the config file
    #[arg(long)]
    host: Option<String>,

    /// Override the listening port from the config file
    #[arg(long)]
    port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn open_store(config: &ReceiverConfig) -> Result<Arc<dyn AlertStore>> {
    match &config.store.path {
        Some(path) => {
            let store = JsonLinesAlertStore::open(path)
                .await
                .context("Failed to open alert store")?;
            info!("Writing alerts to {}", store.path().display());
            Ok(Arc::new(store))
        }
        None => {
            warn!("No [store] path configured; alerts are logged and not persisted");
            Ok(Arc::new(LogAlertStore))
        }
    }
}

fn register_accounts(service: &AlarmReceiverService, config: &ReceiverConfig) {
    for account in &config.accounts {
        service.register_account(account.clone());
    }
    info!("{} accounts registered", service.accounts().len());
}

/// Replace the registered accounts with those in a freshly loaded config.
fn reload_accounts(service: &AlarmReceiverService, config: &ReceiverConfig) {
    for code in service.accounts().account_codes() {
        if !config.accounts.iter().any(|a| a.account_code == code) {
            info!("Account {code} no longer configured, removing");
            service.accounts().remove(&code);
        }
    }
    register_accounts(service, config);
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=alarm_receiver=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt().without_time().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    let config = ReceiverConfig::load(&cli.config).context("Failed to load config file")?;
    let mut server_config = config.server_config();
    if let Some(host) = &cli.host {
        server_config.host = host.clone();
    }
    if let Some(port) = cli.port {
        server_config.port = port;
    }

    let store = open_store(&config).await?;
    let service = Arc::new(AlarmReceiverService::new(store));
    register_accounts(&service, &config);
    service.register_handler(|event, account| {
        if event.is_restore() {
            info!(
                "Restore {} from account {} ({})",
                event.event_code,
                event.account_code,
                account.map_or("unregistered", |a| a.name.as_str())
            );
        }
        Ok(())
    });

    let server = AlarmServer::bind(server_config, service.clone())
        .await
        .context("Failed to start alarm server")?;

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let server_handle = tokio::spawn(server.run_until(async move {
        let _ = shutdown_rx.changed().await;
    }));

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    info!("Alarm receiver running. Send SIGHUP to reload accounts, SIGINT/SIGTERM to stop.");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, reloading accounts from {}", cli.config);
                match ReceiverConfig::load(&cli.config) {
                    Ok(new_config) => {
                        reload_accounts(&service, &new_config);
                        if new_config.server_config() != config.server_config() {
                            warn!("[server] settings changed; restart to apply them");
                        }
                    }
                    Err(e) => warn!("Failed to reload config, keeping previous accounts: {e}"),
                }
            }
        }
    }

    let _ = shutdown_tx.send(true);
    server_handle
        .await
        .context("Server task failed")?
        .context("Server stopped with error")?;

    info!("Shutdown complete");
    Ok(())
}
