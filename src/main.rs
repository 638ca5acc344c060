//! depwatch - Dependency manifest analyzer CLI tool
//!
//! This tool reports outdated packages declared in:
//! - Node.js (package.json)
//! - Python (requirements.txt)
//! - Dart/Flutter (pubspec.yaml)

use anyhow::Context;
use clap::Parser;
use depwatch::cache::TtlCache;
use depwatch::cli::CliArgs;
use depwatch::config::Config;
use depwatch::delta::SeverityPolicy;
use depwatch::orchestrator::{AnalysisOrchestrator, WorkspaceReport};
use depwatch::output::{create_formatter, OutputConfig, OutputFormat, Verbosity};
use depwatch::progress::Progress;
use depwatch::remote::{
    HttpClient, RemoteAnalysis, RemoteAnalysisClient, RetryPolicy, DEFAULT_USER_AGENT,
};
use depwatch::workspace::FsFileSource;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    init_tracing(args.verbose);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so JSON on stdout stays parseable
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("depwatch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the configuration file (if any) and apply CLI/env overrides
fn load_config(args: &CliArgs) -> depwatch::error::Result<Config> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    Ok(config.with_overrides(args.endpoint.clone(), args.token.clone(), &args.exclude))
}

/// Wire the file source, remote client and cache into an orchestrator
fn build_orchestrator(
    config: &Config,
) -> depwatch::error::Result<(AnalysisOrchestrator, Arc<TtlCache<RemoteAnalysis>>)> {
    let endpoint = config.endpoint()?;
    info!(endpoint = %endpoint, "depwatch v{}", env!("CARGO_PKG_VERSION"));

    let files = FsFileSource::new(config.exclude.as_slice())?;
    let cache = TtlCache::with_sweep(config.cache.max_entries, config.cache.sweep_interval());
    let transport = HttpClient::with_config(config.retry.timeout(), DEFAULT_USER_AGENT)?;
    let analyzer = RemoteAnalysisClient::new(endpoint, Arc::new(transport), Arc::clone(&cache))
        .with_token(config.token().map(str::to_string))
        .with_retry(RetryPolicy::new(
            config.retry.max_attempts,
            config.retry.base_delay(),
        ))
        .with_ttls(config.cache.success_ttl(), config.cache.failure_ttl());
    let orchestrator = AnalysisOrchestrator::new(Arc::new(files), Arc::new(analyzer))
        .with_policy(SeverityPolicy::new(config.severity.minor_gap_threshold));

    Ok((orchestrator, cache))
}

/// Resolve `--file` paths, dropping any already covered by the workspace scan
///
/// Paths are canonicalized like workspace roots so one file maps to one cache
/// key. A path that cannot be canonicalized (e.g. missing) is kept as an
/// absolute path and reports its read failure during analysis.
fn explicit_files(files: &[PathBuf], scanned: &WorkspaceReport) -> anyhow::Result<Vec<PathBuf>> {
    let mut resolved: Vec<PathBuf> = Vec::with_capacity(files.len());
    for file in files {
        let path = match file.canonicalize() {
            Ok(path) => path,
            Err(_) => std::path::absolute(file)
                .with_context(|| format!("invalid --file path: {}", file.display()))?,
        };
        if scanned.results.iter().any(|r| r.file == path) || resolved.contains(&path) {
            debug!(file = %path.display(), "file already analyzed");
            continue;
        }
        resolved.push(path);
    }
    Ok(resolved)
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = load_config(&args)?;
    let (orchestrator, cache) = build_orchestrator(&config)?;

    let roots = args.scan_roots();
    for root in &roots {
        let root = root
            .canonicalize()
            .with_context(|| format!("workspace root not found: {}", root.display()))?;
        orchestrator.add_workspace_folder(root);
    }

    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let show_progress =
        output_config.format == OutputFormat::Text && output_config.verbosity != Verbosity::Quiet;

    // Progress follows the change-event stream
    let mut progress = Progress::new(show_progress);
    if roots.is_empty() {
        progress.start(args.files.len() as u64, "Analyzing");
    } else {
        progress.spinner("Analyzing workspace");
    }
    let subscription = progress.attach(orchestrator.events());

    let mut report = orchestrator.analyze_workspace().await;
    let files = explicit_files(&args.files, &report)?;
    if !files.is_empty() {
        let explicit = orchestrator.analyze_files(&files).await;
        let mut results = std::mem::take(&mut report.results);
        results.extend(explicit.results);
        report = WorkspaceReport::from_results(results);
    }

    progress.detach(orchestrator.events(), subscription);
    progress.finish_and_clear();
    debug!(files = report.results.len(), "analysis finished");

    // Output results
    let formatter = create_formatter(output_config);
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    cache.dispose();

    if report.has_errors() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
