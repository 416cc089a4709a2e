//! CLI for the sentiboard dashboard data layer.
//!
//! Each subcommand reproduces one dashboard page's data flow: latest
//! holdings, per-company sentiment scores and trends, the sentiment vs.
//! daily-return pairing, and the backtest trigger with its chart
//! artifacts.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use sentiboard::artifact::{self, ChartKind};
use sentiboard::{
    DashboardConfig, DashboardError, FeatureSet, MarketStore, Reconciler, backtest, company, db,
    model, sentiment_reference_date,
};

#[derive(Parser)]
#[command(name = "sentiboard")]
#[command(about = "Sentiment-to-strategy dashboard data layer", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the latest trading date and long/short holdings
    Holdings,
    /// Show a company's sentiment scores on the reference date
    Scores {
        /// Company ticker, plain or $-prefixed
        company: String,
        /// Emit the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a company's reconciled sentiment history
    Trend {
        /// Company ticker, plain or $-prefixed
        company: String,
        /// Lookback window
        #[arg(long, value_enum, default_value_t = Window::OneMonth)]
        window: Window,
    },
    /// Pair a company's polarity scores with daily returns over one year
    Returns {
        /// Company ticker, plain or $-prefixed
        company: String,
    },
    /// Trigger the external backtest or inspect its chart artifacts
    Backtest {
        #[command(subcommand)]
        action: BacktestAction,
    },
}

#[derive(Subcommand)]
enum BacktestAction {
    /// Run the backtest to completion
    Run,
    /// Check whether the chart artifacts are present
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Window {
    /// Five trading days
    #[value(name = "1w")]
    OneWeek,
    /// Thirty calendar days
    #[value(name = "1m")]
    OneMonth,
}

impl Window {
    fn days_back(self) -> i64 {
        match self {
            Self::OneWeek => 5,
            Self::OneMonth => 30,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match DashboardConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(2);
        }
    };

    let outcome = match &cli.command {
        Commands::Holdings => holdings(&config).await,
        Commands::Scores { company, json } => scores(&config, company, *json).await,
        Commands::Trend { company, window } => trend(&config, company, *window).await,
        Commands::Returns { company } => returns(&config, company).await,
        Commands::Backtest { action } => match action {
            BacktestAction::Run => run_backtest(&config),
            BacktestAction::Show => show_charts(&config),
        },
    };

    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn open_store(config: &DashboardConfig) -> anyhow::Result<MarketStore> {
    let pool = db::connect(&config.database)
        .await
        .context("connecting to database")?;
    Ok(MarketStore::new(pool))
}

/// Latest trading date with its long/short breakdown.
async fn holdings(config: &DashboardConfig) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let Some(holdings) = store.latest_holdings().await? else {
        println!("No trading data available.");
        return Ok(());
    };
    let reference = sentiment_reference_date(holdings.trading_date, config.sentiment_lag_days);
    println!(
        "Trading data from {}, sentiment from {}",
        holdings.trading_date, reference
    );

    println!("\nLong positions:");
    for position in holdings.long() {
        println!("  {}", position.ticker);
    }
    println!("\nShort positions:");
    for position in holdings.short() {
        println!("  {}", position.ticker);
    }
    Ok(())
}

/// Reconciled scores for the sentiment reference date.
async fn scores(config: &DashboardConfig, company: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let Some(trading_date) = store.latest_trading_date().await? else {
        println!("No trading data available.");
        return Ok(());
    };
    let reference = sentiment_reference_date(trading_date, config.sentiment_lag_days);

    let reconciler = Reconciler::from_pool(store.pool());
    let records = reconciler
        .reconcile(company, reference, reference, FeatureSet::Full)
        .await?;
    let Some(record) = records.first() else {
        println!("No sentiment scores available for {reference}.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    match record.intent {
        Some(intent) => println!("Overall sentiment: {intent}"),
        None => println!("Overall sentiment: unknown"),
    }
    println!();
    for (name, score) in record.scores(FeatureSet::Full) {
        match score {
            Some(value) => println!("{name:<10} {value:>8.3}"),
            None => println!("{name:<10} {:>8}", "-"),
        }
    }
    Ok(())
}

/// Reconciled sentiment history over the selected window.
async fn trend(config: &DashboardConfig, company: &str, window: Window) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let Some(trading_date) = store.latest_trading_date().await? else {
        println!("No trading data available.");
        return Ok(());
    };
    let reference = sentiment_reference_date(trading_date, config.sentiment_lag_days);
    let start = reference - Duration::days(window.days_back());

    let reconciler = Reconciler::from_pool(store.pool());
    let frame = reconciler
        .reconcile_frame(company, start, reference, FeatureSet::Full)
        .await?;
    if frame.height() == 0 {
        println!("No sentiment data available for this timeframe.");
        return Ok(());
    }
    println!("{frame}");
    Ok(())
}

/// Polarity scores paired with daily returns over the trailing year.
async fn returns(config: &DashboardConfig, company: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let today = chrono::Local::now().date_naive();
    let start = today - Duration::days(365);

    let reconciler = Reconciler::from_pool(store.pool());
    let records = reconciler
        .reconcile(company, start, today, FeatureSet::PolarityOnly)
        .await?;
    let prices = store
        .fetch_prices_trailing_year(company::canonical(company), today)
        .await?;
    if records.is_empty() || prices.is_empty() {
        println!("Insufficient data to pair sentiment with returns.");
        return Ok(());
    }

    let sentiment = model::sentiment_frame(&records, FeatureSet::PolarityOnly)?;
    let price_frame = model::price_frame(&prices)?;
    let paired = sentiboard::join_with_returns(&sentiment, &price_frame)?;
    if paired.height() == 0 {
        println!("Insufficient overlapping data to pair sentiment with returns.");
        return Ok(());
    }
    println!("{paired}");
    Ok(())
}

/// Runs the external backtest; failure is reported, not propagated.
fn run_backtest(config: &DashboardConfig) -> anyhow::Result<()> {
    println!("Running backtest, this may take a while...");
    match backtest::run(&config.backtest) {
        Ok(()) => println!("Backtest completed."),
        Err(err) => println!("{err}. You may retry."),
    }
    Ok(())
}

/// Reports which chart artifacts the backtest has produced.
fn show_charts(config: &DashboardConfig) -> anyhow::Result<()> {
    let charts = [
        (ChartKind::Backtest, "Backtest performance"),
        (ChartKind::IcComparison, "IC comparison"),
    ];
    for (kind, label) in charts {
        match artifact::load_chart(kind, &config.artifacts) {
            Ok(html) => println!(
                "{label}: {} ({} bytes)",
                kind.path(&config.artifacts).display(),
                html.len()
            ),
            Err(DashboardError::ArtifactMissing { path }) => println!(
                "{label}: not generated yet, run `sentiboard backtest run` first ({})",
                path.display()
            ),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
