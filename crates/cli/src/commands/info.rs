//! `info` command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use contracts::ReceiverConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    server: ServerInfo,
    transmission: TransmissionInfo,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ServerInfo {
    url: String,
    client_identity: bool,
    reconnect_delay_ms: u64,
    request_timeout_s: u64,
}

#[derive(Serialize)]
struct TransmissionInfo {
    trigger_status: String,
    channel: u8,
    bitrate_kbps: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    regions: Vec<u8>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = super::load_config(&args.config)?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &ReceiverConfig, args: &InfoArgs) -> ConfigInfo {
    let sinks = config
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: format!("{:?}", s.sink_type),
            params: if args.sinks {
                s.params.clone()
            } else {
                HashMap::new()
            },
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", config.version),
        server: ServerInfo {
            url: config.server.url.clone(),
            client_identity: config.server.tls_cert.is_some(),
            reconnect_delay_ms: config.server.reconnect_delay_ms,
            request_timeout_s: config.server.request_timeout_s,
        },
        transmission: TransmissionInfo {
            trigger_status: config.transmission.trigger_status.clone(),
            channel: config.transmission.channel,
            bitrate_kbps: config.transmission.bitrate_kbps,
            regions: config.transmission.regions.clone(),
        },
        sinks,
    }
}

fn print_config_info(config: &ReceiverConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  demo-rx Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let server = &config.server;
    println!("🛰  Server");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ URL: {}", server.url);
    match &server.tls_cert {
        Some(cert) => println!("   ├─ Client certificate: {}", cert.display()),
        None => println!("   ├─ Client certificate: none"),
    }
    println!("   ├─ Reconnect delay: {} ms", server.reconnect_delay_ms);
    println!("   └─ Request timeout: {} s", server.request_timeout_s);

    let tx = &config.transmission;
    println!("\n📡 Transmission");
    println!("   ├─ Trigger status: {}", tx.trigger_status);
    println!("   ├─ Channel: {}", tx.channel);
    if tx.regions.is_empty() {
        println!("   └─ Bit rate: {} kbps", tx.bitrate_kbps);
    } else {
        println!("   ├─ Bit rate: {} kbps", tx.bitrate_kbps);
        println!("   └─ Regions: {:?}", tx.regions);
    }

    println!("\n📤 Sinks ({})", config.sinks.len());
    for (i, sink) in config.sinks.iter().enumerate() {
        let is_last = i == config.sinks.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };
        println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);

        if args.sinks {
            let mut params: Vec<_> = sink.params.iter().collect();
            params.sort();
            for (key, value) in params {
                println!("   {}  · {} = {}", child_prefix, key, value);
            }
        }
    }

    println!();
}
