//! Configuration validation
//!
//! Rules:
//! - server.url is an http(s) URL
//! - tls_cert / tls_key set together
//! - reconnect delay > 0
//! - bitrate_kbps >= MIN_BITRATE_KBPS
//! - trigger_status non-empty
//! - at least one sink, names unique and non-empty
//! - sink params complete for their type

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, ReceiverConfig, SinkConfig, SinkType, MIN_BITRATE_KBPS};

/// Validate a ReceiverConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ReceiverConfig) -> Result<(), ContractError> {
    validate_server(config)?;
    validate_transmission(config)?;
    validate_sinks(config)?;
    Ok(())
}

fn validate_server(config: &ReceiverConfig) -> Result<(), ContractError> {
    let server = &config.server;

    if !(server.url.starts_with("http://") || server.url.starts_with("https://")) {
        return Err(ContractError::config_validation(
            "server.url",
            format!("expected http:// or https:// URL, got '{}'", server.url),
        ));
    }

    if server.tls_cert.is_some() != server.tls_key.is_some() {
        return Err(ContractError::config_validation(
            "server.tls_cert / server.tls_key",
            "client certificate and key must be given together",
        ));
    }

    if server.reconnect_delay_ms == 0 {
        return Err(ContractError::config_validation(
            "server.reconnect_delay_ms",
            "reconnect delay must be > 0",
        ));
    }

    Ok(())
}

fn validate_transmission(config: &ReceiverConfig) -> Result<(), ContractError> {
    let tx = &config.transmission;

    if !tx.bitrate_kbps.is_finite() || tx.bitrate_kbps < MIN_BITRATE_KBPS {
        return Err(ContractError::config_validation(
            "transmission.bitrate_kbps",
            format!(
                "bitrate_kbps must be finite and >= {MIN_BITRATE_KBPS}, got {}",
                tx.bitrate_kbps
            ),
        ));
    }

    if tx.trigger_status.trim().is_empty() {
        return Err(ContractError::config_validation(
            "transmission.trigger_status",
            "trigger status cannot be empty",
        ));
    }

    Ok(())
}

fn validate_sinks(config: &ReceiverConfig) -> Result<(), ContractError> {
    if config.sinks.is_empty() {
        return Err(ContractError::config_validation(
            "sinks",
            "at least one output sink is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        validate_sink_params(idx, sink)?;
    }
    Ok(())
}

fn validate_sink_params(idx: usize, sink: &SinkConfig) -> Result<(), ContractError> {
    match sink.sink_type {
        SinkType::Log => Ok(()),
        SinkType::File => {
            if sink.params.get("path").is_none_or(|p| p.is_empty()) {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.path", idx),
                    "file sink requires 'path'",
                ));
            }
            Ok(())
        }
        SinkType::Udp => {
            let addr = sink.params.get("addr").ok_or_else(|| {
                ContractError::config_validation(
                    format!("sinks[{}].params.addr", idx),
                    "udp sink requires 'addr'",
                )
            })?;
            parse_socket_addr(idx, "addr", addr)?;
            if let Some(bind) = sink.params.get("bind") {
                parse_socket_addr(idx, "bind", bind)?;
            }
            if let Some(ttl) = sink.params.get("ttl") {
                ttl.parse::<u32>().map_err(|e| {
                    ContractError::config_validation(
                        format!("sinks[{}].params.ttl", idx),
                        format!("invalid ttl '{}': {}", ttl, e),
                    )
                })?;
            }
            Ok(())
        }
    }
}

fn parse_socket_addr(idx: usize, key: &str, value: &str) -> Result<SocketAddr, ContractError> {
    value.parse().map_err(|e| {
        ContractError::config_validation(
            format!("sinks[{}].params.{}", idx, key),
            format!("invalid address '{}': {}", value, e),
        )
    })
}
