//! Command line front end for the Zabbix overview engine
//!
//! Resolves a connection profile (CLI flags, then environment, then the
//! profile file), runs one operation and prints the result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use zabbix_overview::{
    Host, OverviewSnapshot, ZabbixClient,
    config::{ClientOptions, ConnectionProfile, FileProfileStore, resolve_profile},
    format::{bytes_to_gb, format_cpu_count, format_percent, seconds_to_human},
    problems::{CurrentProblem, flatten_problems},
    util::{options_from_env, profile_from_env},
};

#[derive(Debug, Clone, Parser)]
#[command(name = "zbx-overview")]
#[command(about = "Host and problem overview for a Zabbix server", long_about = None)]
struct Args {
    /// Profile file (defaults to <config dir>/zabbix-overview/profiles.toml)
    #[arg(short, long, value_name = "FILE")]
    profiles: Option<PathBuf>,

    /// API endpoint URL (overrides profile)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// API token (overrides profile)
    #[arg(short, long, value_name = "TOKEN")]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum number of hosts enriched with metrics at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Enable trace logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Test the connection and print the API version
    Version,
    /// Host count, problem count and current problems
    Overview,
    /// All enabled hosts with problem counts and metrics
    Hosts,
    /// Current problems, one per line
    Problems,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    };
    let filter = filter::Targets::new().with_targets(vec![("zabbix_overview", level), ("zbx_overview", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn load_profile(args: &Args) -> Result<ConnectionProfile> {
    if let (Some(url), Some(token)) = (&args.url, &args.token) {
        return Ok(ConnectionProfile::new(url.clone(), token.clone()));
    }

    let stored = match profile_from_env() {
        Some(profile) => Some(profile),
        None => {
            let store = FileProfileStore::load(args.profiles.as_deref())?;
            trace!("loaded profile store from {}", store.path().display());
            resolve_profile(&store)
        }
    };

    let mut profile =
        stored.context("No Zabbix API profile configured; pass --url and --token")?;

    if let Some(url) = &args.url {
        profile.endpoint_url = url.clone();
    }
    if let Some(token) = &args.token {
        profile.token = token.clone();
    }

    Ok(profile)
}

fn client_options(args: &Args) -> ClientOptions {
    let env = options_from_env();
    ClientOptions {
        timeout_secs: args.timeout.or(env.timeout_secs),
        enrichment_concurrency: args.concurrency.or(env.enrichment_concurrency),
    }
}

fn print_problems(problems: &[CurrentProblem]) {
    for problem in problems {
        println!(
            "[{:<14}] {:<24} {} (value: {}, trigger {})",
            problem.severity.label(),
            problem.host_name,
            problem.name,
            problem.last_value,
            problem.trigger_id
        );
    }
}

fn print_overview(overview: &OverviewSnapshot) {
    println!(
        "updated {}",
        overview.fetched_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
    );
    println!("hosts:    {}", overview.host_count);
    println!("problems: {}", overview.problem_count);
    println!();
    print_problems(&flatten_problems(&overview.hosts_with_problems));
}

fn metric(value: Option<&String>, convert: fn(&str) -> String) -> String {
    value.map_or_else(|| String::from("-"), |raw| convert(raw))
}

fn print_hosts(hosts: &[Host]) {
    for host in hosts {
        let metrics = host.metrics.clone().unwrap_or_default();
        println!(
            "{:<24} {:<15} problems: {:<3} cpu: {}% ({} cores) mem: {}% of {} up: {}  [{}]",
            host.name,
            host.ip.as_deref().unwrap_or("-"),
            host.problem_count,
            metric(metrics.cpu_utilization.as_ref(), format_percent),
            metric(metrics.cpu_count.as_ref(), format_cpu_count),
            metric(metrics.memory_utilization.as_ref(), format_percent),
            metric(metrics.total_memory_bytes.as_ref(), bytes_to_gb),
            metric(metrics.uptime_seconds.as_ref(), seconds_to_human),
            if host.groups.is_empty() { "-" } else { host.groups.as_str() },
        );
    }
}

async fn run(args: Args) -> Result<()> {
    let profile = load_profile(&args)?;
    let client = ZabbixClient::with_options(&profile, client_options(&args))
        .context("failed to create client")?;

    match args.command {
        Command::Version => {
            let check = client.test_connection().await;
            println!("{}", check.message);
            if !check.success {
                anyhow::bail!("connection test failed");
            }
        }
        Command::Overview => print_overview(&client.get_overview().await?),
        Command::Hosts => print_hosts(&client.list_hosts_with_metrics().await?),
        Command::Problems => {
            let triggers = client.correlate().await?;
            print_problems(&flatten_problems(&triggers));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.verbose);
    trace!("running {:?}", args.command);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("load failed");
            ExitCode::FAILURE
        }
    }
}
