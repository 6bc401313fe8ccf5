//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ReceiverConfig, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    server: String,
    trigger_status: String,
    channel: u8,
    bitrate_kbps: f64,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match super::load_config(&args.config) {
        Ok(config) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&config),
            summary: Some(ConfigSummary {
                version: format!("{:?}", config.version),
                server: config.server.url.clone(),
                trigger_status: config.transmission.trigger_status.clone(),
                channel: config.transmission.channel,
                bitrate_kbps: config.transmission.bitrate_kbps,
                sink_count: config.sinks.len(),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("{:#}", e)),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Non-fatal issues worth pointing out
fn collect_warnings(config: &ReceiverConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.sinks.iter().all(|s| s.sink_type == SinkType::Log) {
        warnings.push("Only log sinks configured - no packets leave this host".to_string());
    }

    if config.server.url.starts_with("https://") && config.server.tls_cert.is_none() {
        warnings.push(
            "No client certificate configured - the feed may reject the subscription"
                .to_string(),
        );
    }

    if config.transmission.regions.is_empty() {
        warnings.push("transmission.regions is empty - confirmations carry no regions".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Server: {}", summary.server);
            println!("  Trigger: {}", summary.trigger_status);
            println!("  Channel: {}", summary.channel);
            println!("  Bit rate: {} kbps", summary.bitrate_kbps);
            println!("  Sinks: {}", summary.sink_count);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn test_valid_config_reports_summary() {
        let file = fixtures::config_file(fixtures::VALID);
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });

        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.channel, 2);
        assert_eq!(summary.sink_count, 1);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("regions")));
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let file = fixtures::config_file(
            r#"
[transmission]
bitrate_kbps = 0.0

[[sinks]]
name = "log"
sink_type = "log"
"#,
        );
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };

        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("bitrate_kbps"));
        assert!(run_validate(&args).is_err());
    }
}
