use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info};

use iaoms_audit::audit::logger::read_entries;
use iaoms_audit::audit::{verify_entries, AuditEntry, AuditEntryStore};
use iaoms_audit::database::Database;

const DEFAULT_SEARCH_URL: &str = "https://search.sigstore.dev";

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("verify-audit-log")
        .version("1.0.0")
        .about("Verify IAOMS approval audit trail integrity")
        .arg(
            Arg::new("log-path")
                .short('l')
                .long("log-path")
                .value_name("PATH")
                .help("Path to JSONL audit log file")
                .conflicts_with("database-url")
                .required_unless_present("database-url"),
        )
        .arg(
            Arg::new("database-url")
                .short('d')
                .long("database-url")
                .value_name("URL")
                .help("SQLite database holding audit entries"),
        )
        .arg(
            Arg::new("search-url")
                .short('s')
                .long("search-url")
                .value_name("URL")
                .default_value(DEFAULT_SEARCH_URL)
                .help("Base URL the verification links were built from"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress output except errors"),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let quiet = matches.get_flag("quiet");
    let search_url = matches
        .get_one::<String>("search-url")
        .map(String::as_str)
        .unwrap_or(DEFAULT_SEARCH_URL);

    let level = if quiet {
        tracing::Level::ERROR
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let entries = if let Some(url) = matches.get_one::<String>("database-url") {
        info!("Loading audit entries from database {}", url);
        Database::open_existing(url).await?.list().await?
    } else {
        let log_path = matches
            .get_one::<String>("log-path")
            .ok_or_else(|| anyhow!("--log-path or --database-url is required"))?;
        load_log_file(log_path)?
    };

    if let Err(e) = verify_trail(&entries, search_url, verbose) {
        error!("Audit trail verification failed: {}", e);
        std::process::exit(1);
    }

    if !quiet {
        println!("✓ Audit trail verification completed successfully");
    }

    Ok(())
}

fn load_log_file(log_path: &str) -> Result<Vec<AuditEntry>> {
    info!("Verifying audit log: {}", log_path);

    let path = Path::new(log_path);
    if !path.exists() {
        return Err(anyhow!("Audit log file not found: {}", log_path));
    }

    Ok(read_entries(path)?)
}

fn verify_trail(entries: &[AuditEntry], search_url: &str, verbose: bool) -> Result<()> {
    if verbose {
        println!("Loaded {} audit entries", entries.len());
    }

    let report = verify_entries(entries, search_url);
    for (position, issue) in &report.issues {
        println!("✗ Entry {}: {}", position, issue);
    }
    if !report.is_valid() {
        return Err(anyhow!(
            "{} issues found in {} entries",
            report.issues.len(),
            report.entry_count
        ));
    }

    if verbose && !entries.is_empty() {
        println!("✓ Content hashes, receipts and verification links intact");
        println!("\nAudit Trail Summary:");
        println!("  Total entries: {}", entries.len());
        println!("  First entry: {}", entries[0].timestamp);
        println!("  Last entry: {}", entries[entries.len() - 1].timestamp);

        let mut action_types: HashMap<&str, usize> = HashMap::new();
        for entry in entries {
            *action_types.entry(entry.action_type.as_str()).or_insert(0) += 1;
        }
        println!("\nAction distribution:");
        for (action_type, count) in action_types {
            println!("  {}: {}", action_type, count);
        }
    }

    Ok(())
}
