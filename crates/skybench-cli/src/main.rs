//! skybench command-line runner.
//!
//! Executes the benchmark query catalog against one backend engine,
//! waits for engines to become query-capable, and compares saved run
//! reports across engines.

mod render;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use skybench_backends::readiness;
use skybench_backends::Adapter;
use skybench_core::readiness::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use skybench_core::{
    BackendKind, Comparison, QueryCatalog, ReadinessGate, RunCoordinator, RunReport, TargetConfig,
};

use render::OutputFormat;

/// skybench: OLAP engine benchmark runner.
#[derive(Parser, Debug)]
#[command(name = "skybench")]
#[command(version, about = "OLAP engine benchmark runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute the benchmark catalog against one backend
    Run(RunArgs),
    /// Wait until a backend is ready to accept queries
    Wait(WaitArgs),
    /// Compare run reports produced by `run --report`
    Compare(CompareArgs),
}

/// Connection selection shared by `run` and `wait`.
#[derive(clap::Args, Debug)]
struct ConnectionArgs {
    /// Backend engine to connect to
    #[arg(long, value_enum)]
    backend: BackendKind,

    /// Host (overrides the default for the selected backend)
    #[arg(long)]
    host: Option<String>,

    /// Port (overrides the default for the selected backend)
    #[arg(long)]
    port: Option<u16>,

    /// User (overrides the default for the selected backend)
    #[arg(long)]
    user: Option<String>,

    /// Password (overrides the default for the selected backend)
    #[arg(long)]
    password: Option<String>,

    /// Database name
    #[arg(long)]
    database: Option<String>,
}

impl ConnectionArgs {
    /// Resolve the target: per-kind defaults plus explicit overrides.
    fn to_target(&self) -> TargetConfig {
        let mut target = TargetConfig::new(self.backend);
        if let Some(host) = &self.host {
            target = target.with_host(host);
        }
        if let Some(port) = self.port {
            target = target.with_port(port);
        }
        if let Some(user) = &self.user {
            target = target.with_user(user);
        }
        if let Some(password) = &self.password {
            target = target.with_password(password);
        }
        if let Some(database) = &self.database {
            target = target.with_database(database);
        }
        target
    }
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Path to the query catalog directory
    #[arg(long, default_value = "queries")]
    queries_dir: PathBuf,

    /// Per-query timeout in seconds
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,

    /// Run only these query ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    only: Vec<u32>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value_t = OutputFormat::Table, value_enum)]
    format: OutputFormat,
}

#[derive(clap::Args, Debug)]
struct WaitArgs {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Maximum number of poll attempts
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: u32,

    /// Seconds between poll attempts
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    interval_secs: u64,
}

#[derive(clap::Args, Debug)]
struct CompareArgs {
    /// Report files produced by `run --report`
    #[arg(required = true)]
    reports: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skybench_core=info".parse().expect("valid directive"))
                .add_directive("skybench_backends=info".parse().expect("valid directive"))
                .add_directive("skybench_cli=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Command::Run(args) => run_benchmark(args).await,
        Command::Wait(args) => wait_for_backend(args).await,
        Command::Compare(args) => compare_reports(args),
    }
}

/// Execute the catalog against one backend.
///
/// Exit code 0 means the run completed, even with per-query failures
/// recorded; a fatal connection error or misconfiguration exits non-zero.
async fn run_benchmark(args: RunArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let target = args.connection.to_target();

    let mut catalog = QueryCatalog::load(&args.queries_dir)?;
    if !args.only.is_empty() {
        catalog = catalog.subset(&args.only)?;
    }
    tracing::info!(
        backend = %target.kind,
        host = %target.host,
        port = target.port,
        queries = catalog.len(),
        "starting benchmark run"
    );

    let mut adapter = Adapter::connect(&target).await?;
    let coordinator = RunCoordinator::new(&catalog, &target)
        .with_query_timeout(Duration::from_secs(args.timeout_secs));
    let report = coordinator.run(&mut adapter).await;

    match args.format {
        OutputFormat::Table => {
            println!("{}", render::outcome_table(&report));
            println!();
            println!("{}", render::summary(&report));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(if report.fatal_error.is_some() { 1 } else { 0 })
}

/// Poll the backend until it accepts queries or the budget is exhausted.
async fn wait_for_backend(args: WaitArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let target = args.connection.to_target();
    tracing::info!(backend = %target.kind, host = %target.host, port = target.port, "waiting for backend");

    let gate = ReadinessGate::new()
        .with_max_attempts(args.attempts)
        .with_interval(Duration::from_secs(args.interval_secs));
    let attempts = gate.wait_until_ready(|| readiness::probe(&target)).await?;

    println!("{} is ready (after {} attempt(s))", target.kind, attempts);
    Ok(0)
}

/// Join saved reports into a cross-backend comparison table.
fn compare_reports(args: CompareArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut reports = Vec::with_capacity(args.reports.len());
    for path in &args.reports {
        let report: RunReport = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        reports.push(report);
    }

    let comparison = Comparison::of(&reports);
    println!("{}", render::comparison_table(&comparison));
    Ok(0)
}
