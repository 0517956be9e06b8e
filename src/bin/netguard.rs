//! Netguard CLI binary.
//!
//! Signature-based threat detection for request payloads.
//!
//! # Commands
//!
//! - `scan` - Scan content for known attack signatures
//! - `signatures` - List the signature registry
//! - `traffic` - Show the traffic sample
//! - `server` - Start the HTTP API server

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use netguard::{
    config::Config,
    security::{SignatureRegistry, ThreatScanner},
    server::{serve, AppState, ServerConfig},
    traffic::TrafficSample,
    VERSION,
};

#[derive(Parser)]
#[command(name = "netguard")]
#[command(version = VERSION)]
#[command(about = "Netguard - Signature-based threat detection", long_about = None)]
struct Cli {
    /// Config file (default: <config_dir>/netguard/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan content for known attack signatures
    Scan {
        /// Content to scan (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Extra signatures file (TOML)
        #[arg(short, long)]
        signatures: Option<PathBuf>,

        /// Exit with status 1 when a threat is found
        #[arg(long)]
        fail_on_threat: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the signature registry
    Signatures {
        /// Only show one category (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        /// Extra signatures file (TOML)
        #[arg(short, long)]
        signatures: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the traffic sample
    Traffic {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Rows per page
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Traffic CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Show summary statistics instead of rows
        #[arg(long)]
        stats: bool,
    },

    /// Start the HTTP API server
    Server {
        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host
        #[arg(long)]
        host: Option<String>,

        /// Bind to all interfaces
        #[arg(long)]
        bind_all: bool,

        /// Record threat verdicts from /scan as alerts
        #[arg(long)]
        record_alerts: bool,

        /// Disable CORS
        #[arg(long)]
        no_cors: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,

        /// Emit logs as JSON
        #[arg(long)]
        log_json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            input,
            file,
            signatures,
            fail_on_threat,
            json,
        } => cmd_scan(&config, input, file, signatures, fail_on_threat, json),

        Commands::Signatures {
            category,
            signatures,
            json,
        } => cmd_signatures(&config, category, signatures, json),

        Commands::Traffic {
            page,
            limit,
            csv,
            stats,
        } => cmd_traffic(&config, page, limit, csv, stats),

        Commands::Server {
            port,
            host,
            bind_all,
            record_alerts,
            no_cors,
            verbose,
            log_json,
        } => cmd_server(
            config,
            port,
            host,
            bind_all,
            record_alerts,
            no_cors,
            verbose,
            log_json,
        ),
    }
}

fn cmd_scan(
    config: &Config,
    input: Option<String>,
    file: Option<PathBuf>,
    signatures: Option<PathBuf>,
    fail_on_threat: bool,
    json_output: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let registry = SignatureRegistry::load(
        signatures.as_deref().or(config.signatures.path.as_deref()),
        config.signatures.include_builtin,
    )?;
    let scanner = ThreatScanner::new(registry)?;
    let result = scanner.scan(&content);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !result.is_threat() {
        println!("SAFE (no signatures matched)");
    } else {
        println!("THREAT ({} signature(s) matched)", result.threats().len());
        println!();
        for threat in result.threats() {
            println!(
                "  - {:<18} {:<8} {:?} at {}",
                threat.category, threat.severity, threat.pattern, threat.position
            );
        }
    }

    if fail_on_threat && result.is_threat() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_signatures(
    config: &Config,
    category: Option<String>,
    signatures: Option<PathBuf>,
    json_output: bool,
) -> anyhow::Result<()> {
    let registry = SignatureRegistry::load(
        signatures.as_deref().or(config.signatures.path.as_deref()),
        config.signatures.include_builtin,
    )?;
    let filter = category.map(|c| c.to_lowercase());

    let selected: Vec<_> = registry
        .iter()
        .filter(|s| {
            filter
                .as_deref()
                .map_or(true, |c| s.category.to_lowercase() == c)
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    println!("Signatures ({}):", selected.len());
    println!();
    println!("{:<20} {:<10} {}", "Category", "Severity", "Pattern");
    println!("{}", "-".repeat(60));
    for sig in selected {
        println!("{:<20} {:<10} {}", sig.category, sig.severity, sig.pattern);
    }

    Ok(())
}

fn cmd_traffic(
    config: &Config,
    page: usize,
    limit: usize,
    csv: Option<PathBuf>,
    stats: bool,
) -> anyhow::Result<()> {
    let path = csv.unwrap_or_else(|| config.traffic.csv_path.clone());
    let sample = TrafficSample::load_or_builtin(&path);

    if stats {
        let stats = sample.stats();
        println!("Traffic Statistics:");
        println!("  Total packets:  {}", stats.total_packets);
        println!("  Suspicious:     {}", stats.suspicious);
        println!("  Blocked:        {}", stats.blocked);
        println!(
            "  Protocols:      HTTP {} / HTTPS {} / FTP {} / SSH {}",
            stats.protocols.http, stats.protocols.https, stats.protocols.ftp, stats.protocols.ssh
        );
        return Ok(());
    }

    let page = sample.page(page, limit);
    println!(
        "Page {}/{} ({} records)",
        page.current_page, page.total_pages, page.total_records
    );
    println!();
    println!(
        "{:<22} {:<16} {:<16} {:<6} {:<7} {:<8} {}",
        "Timestamp", "Source", "Destination", "Proto", "Level", "Status", "Description"
    );
    println!("{}", "-".repeat(100));
    for row in &page.traffic {
        println!(
            "{:<22} {:<16} {:<16} {:<6} {:<7} {:<8} {}",
            row.timestamp,
            row.source_ip,
            row.destination_ip,
            row.protocol,
            row.threat_level,
            row.status,
            row.description
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn cmd_server(
    mut config: Config,
    port: Option<u16>,
    host: Option<String>,
    bind_all: bool,
    record_alerts: bool,
    no_cors: bool,
    verbose: bool,
    log_json: bool,
) -> anyhow::Result<()> {
    // Initialize logging
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // CLI flags take precedence over file and environment
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }
    if record_alerts {
        config.server.record_alerts = true;
    }
    if no_cors {
        config.server.cors = false;
    }

    let mut server_config = ServerConfig::from(&config);
    if bind_all {
        server_config = server_config.bind_all();
    }

    tracing::info!("Starting Netguard server on {}", server_config.addr);
    tracing::info!(
        "Alert recording: {}",
        if server_config.record_alerts {
            "enabled"
        } else {
            "disabled"
        }
    );

    let state = Arc::new(AppState::new(server_config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(state))?;

    Ok(())
}

// Helper functions

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}
