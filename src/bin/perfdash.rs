use clap::{Parser, Subcommand};

use perfdash::format::{currency, number, percentage};
use perfdash::{ClientReport, Config, DateRange, PerfDash, Period, SourceStatus};

#[derive(Parser)]
#[command(name = "perfdash", about = "Blended GA4 / Google Ads / Meta Ads client reports")]
struct Cli {
    /// Config file path (default: ~/.perfdash/config.json)
    #[arg(long)]
    config: Option<String>,

    /// Reporting worker base URL (overrides config and PERFDASH_WORKER_URL)
    #[arg(long)]
    worker_url: Option<String>,

    /// Bearer credential for the worker (default: PERFDASH_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a client's report across all configured sources
    Report {
        /// Client key or display name (default: first configured client)
        client: Option<String>,
        /// Period (e.g. 30d, mtd, qtd, 2025-Q1, 2025-03)
        #[arg(long, conflicts_with_all = ["start", "end"])]
        period: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Load the client directory from the worker first
        #[arg(long)]
        remote: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List configured clients
    Clients {
        /// Load the client directory from the worker
        #[arg(long)]
        remote: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config,
}

const DEFAULT_LOOKBACK_DAYS: u32 = 7;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_env()
    .with_worker_url(cli.worker_url.clone());

    match cli.command {
        Commands::Config => {
            print_config(&config, cli.config.as_deref())?;
        }
        Commands::Clients { remote, json } => {
            let config = if remote {
                let credential = credential(cli.token.as_deref())?;
                let mut dash = PerfDash::new(config)?;
                dash.sync_remote_clients(&credential).await?;
                dash.config().clone()
            } else {
                config
            };
            print_clients(&config, json)?;
        }
        Commands::Report {
            client,
            period,
            start,
            end,
            remote,
            json,
        } => {
            let credential = credential(cli.token.as_deref())?;
            let range = resolve_range(period.as_deref(), start.as_deref(), end.as_deref())?;
            let mut dash = PerfDash::new(config)?;
            if remote {
                dash.sync_remote_clients(&credential).await?;
            }
            let client = match client {
                Some(c) => c,
                None => dash.config().default_client()?.id.clone(),
            };
            let report = dash.client_report(&client, &range, &credential).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn credential(flag: Option<&str>) -> anyhow::Result<String> {
    match flag.filter(|t| !t.trim().is_empty()) {
        Some(t) => Ok(t.to_string()),
        None => Ok(perfdash::config::credential_from_env()?),
    }
}

fn resolve_range(
    period: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> anyhow::Result<DateRange> {
    let range = match (period, start, end) {
        (Some(p), _, _) => DateRange::from_period(&Period::parse(p)?)?,
        (None, Some(s), Some(e)) => DateRange::parse(s, e)?,
        _ => DateRange::last_days(DEFAULT_LOOKBACK_DAYS, chrono::Local::now().date_naive())?,
    };
    Ok(range)
}

fn print_config(config: &Config, path: Option<&str>) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => std::path::PathBuf::from(p),
        None => Config::default_path()?,
    };
    println!("Config file:      {}", path.display());
    println!(
        "Worker URL:       {}",
        config.worker_url.as_deref().unwrap_or("(not set)")
    );
    println!("Request timeout:  {}s", config.request_timeout_secs);
    println!("Deadline:         {}s", config.deadline_secs);
    println!("Transport errors: {:?}", config.transport_errors);
    println!("Meta auth header: {}", config.authenticate_meta);
    println!("Clients:          {}", config.clients.len());
    Ok(())
}

fn print_clients(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.clients)?);
        return Ok(());
    }
    if config.clients.is_empty() {
        println!("No clients configured.");
        return Ok(());
    }
    for (key, profile) in &config.clients {
        let sources: Vec<String> = profile
            .configured_sources()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let sources = if sources.is_empty() {
            "no sources".to_string()
        } else {
            sources.join(", ")
        };
        println!("{key}  {}  [{sources}]", profile.name);
    }
    Ok(())
}

fn print_report(cr: &ClientReport) {
    let r = &cr.report;
    println!("Performance: {} ({})", cr.client_name, cr.range);

    println!("  Blended:");
    println!("    Spend:       {}", currency(cr.kpis.cost));
    println!("    Clicks:      {}", number(cr.kpis.clicks as f64));
    println!("    Conversions: {}", number(cr.kpis.conversions));
    println!("    CPA:         {}", currency(cr.kpis.cpa));

    println!("  GA4: {}", status_label(&r.sources.ga4));
    println!("    Sessions:    {}", number(r.ga4.totals.sessions as f64));
    println!("    New users:   {}", number(r.ga4.totals.new_users as f64));
    println!("    Engagement:  {}", percentage(r.ga4.totals.engagement_rate, 2));
    println!("    Conversions: {}", number(r.ga4.totals.conversions as f64));
    for t in r.ga4.traffic.iter().take(5) {
        println!("      {:<28} {:>8} sessions", t.source, number(t.sessions as f64));
    }

    println!("  Google Ads: {}{}", status_label(&r.sources.ads), sandbox_label(r.ads_sandbox, r.ads_sandbox_reason.as_deref()));
    println!("    Cost:        {}", currency(r.ads.totals.cost));
    println!("    Clicks:      {}", number(r.ads.totals.clicks as f64));
    println!("    Conversions: {}", number(r.ads.totals.conversions));
    println!("    CPA:         {}", currency(r.ads.totals.cost_per_conversion));
    for c in &r.ads.campaigns {
        println!(
            "      {:<28} {:>12} {:>8} clicks  IS {}",
            c.name,
            currency(c.cost),
            number(c.clicks as f64),
            percentage(c.search_impression_share, 1)
        );
    }

    println!("  Meta Ads: {}{}", status_label(&r.sources.meta), sandbox_label(r.meta_sandbox, r.meta_sandbox_reason.as_deref()));
    println!("    Spend:       {}", currency(r.meta.totals.spend));
    println!("    Clicks:      {}", number(r.meta.totals.clicks as f64));
    println!("    Conversions: {}", number(r.meta.totals.conversions as f64));
    for c in &r.meta.campaigns {
        println!(
            "      {:<28} {:>12} {:>8} conv  CPA {}",
            c.name,
            currency(c.spend),
            number(c.conversions as f64),
            currency(c.cost_per_conversion)
        );
    }
}

fn status_label(status: &SourceStatus) -> String {
    match status {
        SourceStatus::NotConfigured => "not configured".into(),
        SourceStatus::Ok => "ok".into(),
        SourceStatus::HttpError { status } => format!("failed (HTTP {status})"),
        SourceStatus::TransportError { message } => format!("failed ({message})"),
        SourceStatus::InvalidBody { message } => format!("failed ({message})"),
    }
}

fn sandbox_label(sandbox: bool, reason: Option<&str>) -> String {
    match (sandbox, reason) {
        (false, _) => String::new(),
        (true, Some(reason)) => format!(" [sandbox: {reason}]"),
        (true, None) => " [sandbox]".into(),
    }
}
