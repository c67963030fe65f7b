use analytics::{PnlEngine, PnlReport};
use anyhow::{Context, bail};
use api_client::{CsvPriceFile, PriceTableProvider, YahooClient};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use configuration::{Config, ProviderKind};
use core_types::{PriceTable, Symbol};
use futures::future::join_all;
use indicatif::ProgressStyle;
use std::path::PathBuf;
use tracing::Instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

mod logging;
mod render;

/// The main entry point for the tickerpnl dashboard.
#[tokio::main]
async fn main() {
    // Load optional overrides from a .env file
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let today = Utc::now().date_naive();

    let config = match configuration::load_config(cli.config.as_deref(), today) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(2);
        }
    };

    // Held until exit so buffered file logs are flushed.
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error initializing logging: {}", e);
            std::process::exit(2);
        }
    };

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Prices(args) => handle_prices(args, &config, today).await,
        Commands::Pnl(args) => handle_pnl(args, &config, today).await,
    };

    if let Err(e) = result {
        tracing::error!(error = ?e, "Command failed.");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Historical prices and profit-and-loss for a handful of stocks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and print daily adjusted closing prices.
    Prices(PricesArgs),
    /// Compute per-share and per-holding profit and loss.
    Pnl(PnlArgs),
}

/// Which stocks to look at, over which period, from which source.
#[derive(Args)]
struct SelectionArgs {
    /// Comma-separated tickers (e.g., "AAPL,MSFT"). Defaults to the configured list.
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<Symbol>,

    /// The purchase date (format: YYYY-MM-DD). Defaults to the configured start date.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The end of the period, exclusive (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Overrides the configured price source.
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Price file for the csv source. Overrides the configured path.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct PricesArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Also write the table to this CSV file.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct PnlArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Shares owned of one ticker, repeatable (e.g., --hold AAPL=3 --hold MSFT=1).
    #[arg(long = "hold", value_parser = parse_hold)]
    holds: Vec<(Symbol, u32)>,

    /// Shares assumed for every ticker without an explicit quantity.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: Option<u32>,

    /// Only use explicit quantities; tickers without one follow `engine.missing_holding`.
    #[arg(long, conflicts_with = "quantity")]
    explicit_only: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn parse_hold(raw: &str) -> Result<(Symbol, u32), String> {
    let (symbol, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=QUANTITY, got '{}'", raw))?;
    let symbol = Symbol::new(symbol).map_err(|e| e.to_string())?;
    let quantity: u32 = quantity
        .trim()
        .parse()
        .map_err(|e| format!("invalid quantity '{}': {}", quantity.trim(), e))?;
    if quantity == 0 {
        return Err(format!("quantity for {} must be at least 1", symbol));
    }
    Ok((symbol, quantity))
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// A selection with every default filled in from the configuration.
struct Request {
    tickers: Vec<Symbol>,
    from: NaiveDate,
    to: NaiveDate,
    provider: ProviderKind,
    csv: Option<PathBuf>,
}

impl Request {
    fn resolve(args: SelectionArgs, config: &Config, today: NaiveDate) -> anyhow::Result<Self> {
        let tickers = if args.tickers.is_empty() {
            config.portfolio.tickers.clone()
        } else {
            args.tickers
        };
        config.portfolio.validate_selection(&tickers)?;

        let from = args.from.unwrap_or(config.portfolio.start_date);
        let to = args.to.unwrap_or(today);
        if from >= to {
            bail!("--from {} must be before --to {}", from, to);
        }

        let provider = args.provider.unwrap_or(config.provider.kind);
        let csv = args.csv.or_else(|| config.provider.csv_path.clone());
        if provider == ProviderKind::Csv && csv.is_none() {
            bail!("the csv provider needs --csv or provider.csv_path");
        }

        Ok(Self {
            tickers,
            from,
            to,
            provider,
            csv,
        })
    }
}

/// Handles the `prices` command.
async fn handle_prices(args: PricesArgs, config: &Config, today: NaiveDate) -> anyhow::Result<()> {
    let request = Request::resolve(args.selection, config, today)?;
    let prices = fetch_prices(&request, config).await?;

    println!(
        "Adjusted closing prices from {} to {} ({} trading days)",
        request.from,
        request.to,
        prices.row_count()
    );
    println!("{}", render::price_table(&prices));

    if let Some(path) = args.output {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        api_client::csv_file::write_table(&prices, file)?;
        tracing::info!(path = %path.display(), "Price table written.");
    }

    Ok(())
}

/// Handles the `pnl` command.
async fn handle_pnl(args: PnlArgs, config: &Config, today: NaiveDate) -> anyhow::Result<()> {
    let request = Request::resolve(args.selection, config, today)?;

    let mut holding = if args.explicit_only {
        config.portfolio.holdings.clone()
    } else {
        let quantity = args.quantity.unwrap_or(config.portfolio.default_quantity);
        config.portfolio.resolve_holding(&request.tickers, quantity)?
    };
    for (symbol, quantity) in args.holds {
        holding.set(symbol, quantity)?;
    }

    let prices = fetch_prices(&request, config).await?;
    let engine = PnlEngine::new(config.engine.missing_holding);
    let report = engine
        .evaluate(&prices, &holding)
        .context("No PnL can be computed for this selection")?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &PnlReport) {
    println!(
        "Profit and loss per share, bought {} and sold {}",
        report.first_date, report.last_date
    );
    println!("{}", render::per_share_table(report));
    println!();
    println!("Your profit/loss for each stock:");
    println!("{}", render::personal_table(report));
    println!("Sum of your profits and losses: {:.2}", report.total);

    let issues = render::issue_lines(report);
    if !issues.is_empty() {
        println!();
        println!("Left out:");
        for line in issues {
            println!("{}", line);
        }
    }
}

// ==============================================================================
// Price Download
// ==============================================================================

async fn fetch_prices(request: &Request, config: &Config) -> anyhow::Result<PriceTable> {
    let prices = match (request.provider, &request.csv) {
        (ProviderKind::Csv, Some(path)) => {
            CsvPriceFile::new(path)
                .fetch_price_table(&request.tickers, request.from, request.to)
                .await?
        }
        _ => {
            let client = YahooClient::new(&config.provider)?;
            fetch_with_progress(&client, &request.tickers, request.from, request.to).await?
        }
    };

    tracing::info!(
        symbols = prices.column_count(),
        rows = prices.row_count(),
        "Price table ready."
    );
    Ok(prices)
}

/// Downloads every ticker concurrently, with one progress bar for the whole batch.
///
/// The bar belongs to the `download` span, so the indicatif logging layer draws
/// it together with the log lines.
async fn fetch_with_progress(
    provider: &dyn PriceTableProvider,
    tickers: &[Symbol],
    from: NaiveDate,
    to: NaiveDate,
) -> anyhow::Result<PriceTable> {
    let download = tracing::info_span!("download", source = provider.name());
    download.pb_set_style(
        &ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    download.pb_set_length(tickers.len() as u64);

    let fetches = tickers.iter().map(|symbol| {
        let download = download.clone();
        async move {
            let result = provider.fetch_history(symbol, from, to).await;
            if let Err(e) = &result {
                tracing::debug!(%symbol, error = %e, "Fetch failed.");
            }
            download.pb_inc(1);
            download.pb_set_message(&format!("{} done", symbol));
            (symbol.clone(), result)
        }
    });

    // Wait for every symbol before joining, so the column order follows the request
    let results = join_all(fetches).instrument(download.clone()).await;

    Ok(api_client::collect_table(results)?)
}
