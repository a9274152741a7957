//! TriageBuddy v0.5.0 - Main CLI Entry Point

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use serde_json::Value;
use triagebuddy::{
    cli::{Args, Commands, Config},
    models::OllamaClient,
    server,
    telemetry::{init_tracing, level_with_verbosity, parse_level},
    TriagePipeline, TriageRequest, TriageResponse,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    let level = level_with_verbosity(parse_level(&config.logging.level), args.verbose);
    init_tracing(args.json_logs || config.logging.json, level);

    match &args.command {
        Commands::Serve { bind } => {
            let bind = bind.clone().unwrap_or_else(|| config.server.bind.clone());
            if !config.stub_mode() {
                check_ollama(&config).await;
            }
            let pipeline = TriagePipeline::from_config(Arc::new(config))
                .context("Failed to build triage pipeline")?;
            server::serve(Arc::new(pipeline), &bind)
                .await
                .with_context(|| format!("Server on {} failed", bind))?;
        }
        Commands::Triage { input, json } => {
            let request = read_request(input, args.command.reads_stdin())?;
            let pipeline = TriagePipeline::from_config(Arc::new(config))
                .context("Failed to build triage pipeline")?;
            let response = pipeline.run(&request).await?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_summary(&request, &response);
            }
        }
        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}

/// Warn at startup when the model server is unreachable; requests still
/// succeed through the heuristic fallbacks.
async fn check_ollama(config: &Config) {
    let url = config.ollama_url();
    match OllamaClient::with_config(&url, &config.provider.model) {
        Ok(client) => match client.health_check().await {
            Ok(true) => tracing::info!(url = %url, model = %config.provider.model, "Ollama reachable"),
            _ => tracing::warn!(url = %url, "Ollama unreachable, model stages will fall back to heuristics"),
        },
        Err(e) => tracing::warn!(error = %e, "Could not build Ollama client"),
    }
}

/// Read a triage request from a file or stdin, generating a trace id if absent
fn read_request(input: &Path, from_stdin: bool) -> Result<TriageRequest> {
    let raw = if from_stdin {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read request file {:?}", input))?
    };

    let mut value: Value = serde_json::from_str(&raw).context("Request is not valid JSON")?;
    if let Value::Object(map) = &mut value {
        let missing = map
            .get("traceId")
            .and_then(Value::as_str)
            .map(|s| s.trim().is_empty())
            .unwrap_or(true);
        if missing {
            map.insert(
                "traceId".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
    }

    serde_json::from_value(value).context("Request does not match the triage schema")
}

fn print_summary(request: &TriageRequest, response: &TriageResponse) {
    println!();
    println!("{} {}", "Ticket:".bold(), request.ticket.id);
    println!("{} {}", "Trace:".bold(), request.trace_id.dimmed());
    println!();

    println!("{} {}", "Category:  ".bold(), response.predicted_category.to_string().cyan());
    let confidence = format!("{:.3}", response.confidence);
    let confidence = if response.auto_close_eligible {
        confidence.green()
    } else if response.confidence >= 0.5 {
        confidence.yellow()
    } else {
        confidence.red()
    };
    println!(
        "{} {} (classifier {:.3})",
        "Confidence:".bold(),
        confidence,
        response.original_confidence
    );
    println!(
        "{} {}",
        "Auto-close:".bold(),
        if response.auto_close_eligible { "eligible".green() } else { "manual review".yellow() }
    );
    if response.citations.is_empty() {
        println!("{} {}", "Citations: ".bold(), "none".dimmed());
    } else {
        println!("{} {}", "Citations: ".bold(), response.citations.join(", "));
    }

    let factors = &response.confidence_factors;
    println!();
    println!("{}", "Factors:".bold());
    println!("  Classification: {:.3}", factors.classification);
    println!("  Retrieval:      {:.3}", factors.retrieval);
    println!("  Draft:          {:.3}", factors.draft);
    println!("  Coverage:       {:.3}", factors.coverage);
    println!("  Boost:          +{:.3}", factors.boost_applied);
    println!("  Penalty:        -{:.3}", factors.penalty_applied);

    println!();
    println!("{}", "Draft reply:".bold());
    println!("{}", "─".repeat(60).dimmed());
    println!("{}", response.draft_reply);
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "{} via {} ({}) in {:.2} ms",
        "Processed".dimmed(),
        response.model_info.provider,
        response.model_info.model,
        response.model_info.total_processing_time_ms
    );
    println!();
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "TriageBuddy Configuration".bold());
    if let Some(path) = Config::default_path() {
        println!("{} {:?}", "Default path:".dimmed(), path);
    }
    println!();
    println!("{}", config.to_toml()?);
    Ok(())
}
