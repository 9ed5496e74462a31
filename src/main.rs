use anyhow::{Context, Result};
use iv3matrix::{
    fetch::ResourceFetcher,
    matrix::report::{process_upload, Outcome},
    Config,
};
use std::{env, fs, path::PathBuf, process::ExitCode};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: iv3matrix <BESTAND.json> [--json]";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,iv3matrix=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) arguments ────────────────────────────────────────────────
    let mut input: Option<PathBuf> = None;
    let mut as_json = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => as_json = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(ExitCode::SUCCESS);
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => {
                eprintln!("{}", USAGE);
                return Ok(ExitCode::from(2));
            }
        }
    }
    let Some(input) = input else {
        eprintln!("{}", USAGE);
        return Ok(ExitCode::from(2));
    };

    // ─── 3) config + fetcher ─────────────────────────────────────────
    let config = Config::from_env()?;
    let fetcher = ResourceFetcher::new(&config)?;
    info!(base_url = %config.base_url, "resources from");

    // ─── 4) run the pipeline ─────────────────────────────────────────
    let bytes = fs::read(&input).with_context(|| format!("reading {:?}", input))?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string());

    match process_upload(&fetcher, &name, &bytes).await {
        Outcome::Report(report) => {
            if report.skipped_records > 0 {
                warn!(skipped = report.skipped_records, "records without key or amount left out");
            }
            if as_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for table in &report.tables {
                    println!("{}", table);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failed { errors, .. } => {
            warn!(errors = errors.len(), "upload rejected");
            for e in &errors {
                eprintln!("{}", e);
            }
            Ok(ExitCode::from(1))
        }
    }
}
