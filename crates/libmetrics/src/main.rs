//! Library Metrics CLI
//!
//! Ingests the metric tables from a data directory and shows the resulting
//! domain model one metric view at a time.

use anyhow::{Context, Result};
use clap::Parser;
use libmetrics::cli::{Cli, Commands};
use libmetrics::config::{resolve_data_dir, SourceKind};
use libmetrics::domain::queries::{find_domain, find_library, library_count};
use libmetrics::domain::{Domain, LastDiscussion, Library};
use libmetrics::errors::{self, IngestError};
use libmetrics::ingest::{ErrorPolicy, Ingestion, Ingestor};
use libmetrics::output::{ExitCode, JsonError, OutputContext};
use libmetrics::visualization::{metric_rows, render_metric};
use serde_json::json;
use std::env;
use tracing_subscriber::EnvFilter;

/// Map an error to its exit code and JSON error code.
fn classify_error(error: &anyhow::Error) -> (ExitCode, &'static str) {
    if let Some(ingest_error) = error.downcast_ref::<IngestError>() {
        return match ingest_error {
            IngestError::MissingSource { .. } => (ExitCode::NotFound, ingest_error.code()),
            _ => (ExitCode::ValidationFailed, ingest_error.code()),
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::NotFound => (ExitCode::NotFound, "IO_ERROR"),
            _ => (ExitCode::ExternalError, "IO_ERROR"),
        };
    }

    let error_msg = error.to_string().to_lowercase();
    if error_msg.contains("not found") {
        (ExitCode::NotFound, "NOT_FOUND")
    } else if error_msg.contains("failed to parse") {
        (ExitCode::InvalidArgument, "CONFIG_ERROR")
    } else {
        (ExitCode::GenericError, "ERROR")
    }
}

fn render_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<IngestError>() {
        Some(ingest_error) => errors::ingest_failed(ingest_error).to_string(),
        None => format!("{:#}", error),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            let (code, error_code) = classify_error(&e);
            if cli.json {
                let json_error = JsonError::new(error_code, e.to_string(), command_name(&cli.command));
                match json_error.to_json_string() {
                    Ok(text) => println!("{}", text),
                    Err(_) => eprintln!("Error: {}", render_error(&e)),
                }
            } else {
                eprintln!("Error: {}", render_error(&e));
            }
            code
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default level.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Domains => "domains",
        Commands::Show { .. } => "show",
        Commands::Library { .. } => "library",
        Commands::Check => "check",
        Commands::Export { .. } => "export",
    }
}

fn ingest(cli: &Cli) -> Result<Ingestion> {
    let current_dir = env::current_dir()?;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), &current_dir);

    let mut ingestor = Ingestor::from_config(&data_dir)?;
    if cli.strict {
        ingestor = ingestor.with_policy(ErrorPolicy::Strict);
    }

    Ok(ingestor.run()?)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let output = OutputContext::new(cli.quiet, cli.json);
    let ingestion = ingest(cli)?;
    let domains = &ingestion.domains;

    if !matches!(cli.command, Commands::Check) && !ingestion.report.is_clean() {
        output.print_warning(format!(
            "{} problem(s) recorded while ingesting; run 'libmetrics check' for details",
            ingestion.report.len()
        ))?;
    }

    match &cli.command {
        Commands::Domains => {
            let summary: Vec<_> = domains
                .iter()
                .map(|d| {
                    json!({
                        "name": d.name,
                        "libraries": d.libraries.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            output.print_json(json!({ "domains": summary, "count": domains.len() }), "domains")?;

            for domain in domains {
                output.print_data(format!(
                    "{} ({} {})",
                    domain.name,
                    domain.libraries.len(),
                    plural(domain.libraries.len(), "library", "libraries")
                ))?;
            }
        }
        Commands::Show { domain, metric } => {
            let found = find_domain(domains, domain).ok_or_else(|| unknown_domain(domains, domain))?;

            output.print_json(
                json!({
                    "domain": found.name,
                    "metric": metric,
                    "rows": metric_rows(found, *metric),
                }),
                "show",
            )?;
            output.print_data(render_metric(found, *metric).trim_end())?;
        }
        Commands::Library { name } => {
            let library = find_library(domains, name)
                .ok_or_else(|| anyhow::Error::new(errors::library_not_found(name)))?;

            output.print_json(library, "library")?;
            output.print_data(describe_library(domains, library))?;
        }
        Commands::Check => {
            let report = &ingestion.report;
            output.print_json(
                json!({
                    "domains": domains.len(),
                    "libraries": library_count(domains),
                    "clean": report.is_clean(),
                    "problems": report.entries(),
                }),
                "check",
            )?;

            output.print_info(format!(
                "Ingested {} {} with {} {}",
                domains.len(),
                plural(domains.len(), "domain", "domains"),
                library_count(domains),
                plural(library_count(domains), "library", "libraries")
            ))?;

            if report.is_clean() {
                output.print_info("No problems found")?;
            } else {
                output.print_data(format!("{} problem(s):", report.len()))?;
                for kind in SourceKind::ALL {
                    let problems: Vec<_> = report.for_table(kind).collect();
                    if problems.is_empty() {
                        continue;
                    }
                    output.print_data(format!("{}:", kind))?;
                    for problem in problems {
                        output.print_data(format!("  [{}] {}", problem.code(), problem))?;
                    }
                }
                return Ok(ExitCode::ValidationFailed);
            }
        }
        Commands::Export { output: path } => {
            let text = serde_json::to_string_pretty(domains)?;
            match path {
                Some(path) => {
                    std::fs::write(path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    output.print_json(json!({ "path": path, "domains": domains.len() }), "export")?;
                    output.print_info(format!("Exported {} domain(s) to {}", domains.len(), path.display()))?;
                }
                None => {
                    output.print_json(domains, "export")?;
                    output.print_data(text)?;
                }
            }
        }
    }

    Ok(ExitCode::Success)
}

fn unknown_domain(domains: &[Domain], name: &str) -> anyhow::Error {
    let available: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
    anyhow::Error::new(errors::domain_not_found(name, &available))
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn describe_library(domains: &[Domain], library: &Library) -> String {
    let domain = domains
        .iter()
        .find(|d| d.find_library(&library.name).is_some())
        .map(|d| d.name.as_str())
        .unwrap_or("-");

    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        format!("Name: {}", library.name),
        format!("Domain: {}", domain),
        format!("Repository: {}", or_dash(Some(library.repository.clone()).filter(|r| !r.is_empty()))),
        format!("Popularity: {}", library.popularity),
        format!("Releases: {}", library.release_dates.len()),
        format!("Latest release: {}", or_dash(library.latest_release().map(|d| d.to_string()))),
        format!("Last modified: {}", or_dash(library.last_modified.map(|d| d.to_string()))),
        format!("Breaking changes: {}", library.total_breaking_changes()),
    ];

    lines.push(format!(
        "Last discussed: {}",
        match library.last_discussed {
            Some(LastDiscussion::Never) => "never".to_string(),
            Some(LastDiscussion::On(date)) => date.to_string(),
            None => "-".to_string(),
        }
    ));
    lines.push(format!("Questions asked: {}", library.questions_asked));

    let open = library.issues.iter().filter(|i| i.is_open()).count();
    lines.push(format!("Issues: {} ({} open)", library.issues.len(), open));

    lines.join("\n")
}
