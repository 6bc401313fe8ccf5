//! `run` command implementation.

use anyhow::{Context, Result};
use api_client::ApiClient;
use catch_up::{CatchUpEngine, EngineConfig, TrackedReceiver};
use contracts::ReceiverConfig;
use dispatcher::RateLimitedDispatcher;
use link_packet::PacketSplitter;
use subscription::Subscription;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_receiver(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut config = super::load_config(&args.config)?;
    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config).map_err(CliError::Override)?;

    info!(
        server = %config.server.url,
        trigger = %config.transmission.trigger_status,
        channel = config.transmission.channel,
        bitrate_kbps = config.transmission.bitrate_kbps,
        sinks = config.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics(args.metrics_port)?;
    }

    let client = ApiClient::new(&config.server).context("Failed to build API client")?;
    let targets = dispatcher::create_targets(&config.sinks)
        .await
        .context("Failed to open output targets")?;
    let rate = RateLimitedDispatcher::new(config.transmission.bitrate_kbps)?;
    let engine = CatchUpEngine::new(
        EngineConfig::from(&config.transmission),
        client.clone(),
        PacketSplitter::new(),
        rate,
        targets,
    );
    let mut receiver = TrackedReceiver::new(engine);
    let subscription = Subscription::from_config(client, &config.server);

    info!(url = %config.server.url, "Subscribing to transmission feed");

    let outcome = tokio::select! {
        result = subscription.run(&mut receiver) => result.map_err(CliError::Subscription),
        signal = shutdown_signal() => {
            signal.context("Failed to listen for shutdown signals")?;
            warn!("Received shutdown signal, exiting");
            Ok(())
        }
    };

    receiver.engine().stats().print_summary();
    outcome?;
    info!("demo-rx finished");
    Ok(())
}

/// Apply command-line overrides on top of the file configuration
fn apply_overrides(config: &mut ReceiverConfig, args: &RunArgs) {
    if let Some(ref server) = args.server {
        info!(server = %server, "Overriding server from CLI");
        config.server.url = server.clone();
    }
    if let Some(bitrate) = args.bitrate {
        info!(bitrate_kbps = bitrate, "Overriding bit rate from CLI");
        config.transmission.bitrate_kbps = bitrate;
    }
    if let Some(channel) = args.channel {
        info!(channel, "Overriding channel from CLI");
        config.transmission.channel = channel;
    }
    if let Some(ref event) = args.event {
        info!(trigger = %event, "Overriding trigger status from CLI");
        config.transmission.trigger_status = event.clone();
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &ReceiverConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Server:");
    println!("  URL: {}", config.server.url);
    println!(
        "  TLS identity: {}",
        match (&config.server.tls_cert, &config.server.tls_key) {
            (Some(cert), Some(_)) => cert.display().to_string(),
            _ => "none".to_string(),
        }
    );
    println!("  Reconnect delay: {} ms", config.server.reconnect_delay_ms);

    let tx = &config.transmission;
    println!("\nTransmission:");
    println!("  Trigger status: {}", tx.trigger_status);
    println!("  Channel: {}", tx.channel);
    println!("  Bit rate: {} kbps", tx.bitrate_kbps);
    if !tx.regions.is_empty() {
        println!("  Regions: {:?}", tx.regions);
    }

    println!("\nSinks ({}):", config.sinks.len());
    for sink in &config.sinks {
        println!("  - {} ({:?})", sink.name, sink.sink_type);
    }
    println!();
}
