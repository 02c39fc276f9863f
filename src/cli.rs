//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[cfg(feature = "fetch")]
use crate::adapters::alphavantage_adapter::AlphaVantageAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_writer::{
    write_correlation_csv, write_enriched_csv, write_summary_csv, CORRELATION_FILE,
    SUMMARY_FILE,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::markdown_report::{MarkdownReportAdapter, REPORT_FILE};
use crate::adapters::svg_chart::SvgChartAdapter;
#[cfg(feature = "fetch")]
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::analysis_config::IndicatorConfig;
use crate::domain::config_validation::{
    read_number, read_window, validate_analysis_config, validate_data_config,
};
use crate::domain::correlation::{compute_correlation, CloseSeries};
use crate::domain::enriched::add_indicators;
use crate::domain::error::StockscopeError;
use crate::domain::source::{DataSource, Interval};
use crate::domain::summary::summarize_asset;
use crate::domain::universe::parse_tickers;
use crate::ports::chart_port::ChartPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportContext, ReportPort};

const DEFAULT_OUTPUT_DIR: &str = "outputs";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(
    name = "stockscope",
    about = "Analyze stocks with candlestick charts, MA/Bollinger indicators, volatility and correlations"
)]
pub struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch prices, compute indicators and write all outputs
    Analyze(AnalyzeArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Comma-separated tickers, e.g. AAPL,MSFT,TSLA
    #[arg(long)]
    pub tickers: String,
    /// First date, e.g. 2022-01-01
    #[arg(long)]
    pub start: NaiveDate,
    /// Last date (inclusive); defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// yahoo (alias yfinance), alphavantage or csv
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub alphavantage_api_key: Option<String>,
    /// 1d, 1wk or 1mo
    #[arg(long)]
    pub interval: Option<String>,
    /// Directory of {TICKER}.csv files for the csv source
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Resolve and print the plan without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Fully resolved `analyze` settings: CLI flags over config file over defaults.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub request: AnalysisRequest,
    pub source: DataSource,
    pub data_dir: PathBuf,
    pub alphavantage_api_key: Option<SecretString>,
}

/// Input to [`run_analysis_pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub interval: Interval,
    pub indicators: IndicatorConfig,
    pub output_dir: PathBuf,
}

/// Every file written by one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutputs {
    pub enriched_csvs: Vec<PathBuf>,
    pub summary_csv: PathBuf,
    pub correlation_csv: PathBuf,
    pub charts: Vec<PathBuf>,
    pub report: PathBuf,
}

impl AnalysisOutputs {
    /// The "Saved outputs" listing printed after a run.
    pub fn listing(&self) -> String {
        let mut lines = vec!["Saved outputs:".to_string()];
        lines.extend(
            self.enriched_csvs
                .iter()
                .map(|p| format!("- Enriched CSV: {}", p.display())),
        );
        lines.push(format!("- Summary CSV: {}", self.summary_csv.display()));
        lines.push(format!(
            "- Correlation CSV: {}",
            self.correlation_csv.display()
        ));
        lines.push(format!("- Report: {}", self.report.display()));
        lines.extend(self.charts.iter().map(|p| format!("- Chart: {}", p.display())));
        lines.join("\n")
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StockscopeError> {
    FileConfigAdapter::from_file(path).map_err(|e| StockscopeError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn report_failure(err: &StockscopeError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_analyze(args: &AnalyzeArgs) -> ExitCode {
    // Stage 1: Load config
    let adapter = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            match load_config(path) {
                Ok(a) => a,
                Err(e) => return report_failure(&e),
            }
        }
        None => FileConfigAdapter::empty(),
    };

    // Stage 2: Validate and resolve settings
    let settings = match resolve_settings(args, &adapter) {
        Ok(s) => s,
        Err(e) => return report_failure(&e),
    };

    if args.dry_run {
        println!("{}", dry_run_plan(&settings));
        return ExitCode::SUCCESS;
    }

    // Stage 3: Build the data source
    let data_port = match build_data_port(&settings) {
        Ok(p) => p,
        Err(e) => return report_failure(&e),
    };

    // Stages 4-8: Pipeline
    match run_analysis_pipeline(
        data_port.as_ref(),
        &SvgChartAdapter::new(),
        &MarkdownReportAdapter::new(),
        &settings.request,
    ) {
        Ok(outputs) => {
            println!("{}", outputs.listing());
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}

/// `[analysis]` section into an `IndicatorConfig`, after validation.
pub fn build_indicator_config(config: &dyn ConfigPort) -> Result<IndicatorConfig, StockscopeError> {
    validate_analysis_config(config)?;
    let defaults = IndicatorConfig::default();
    Ok(IndicatorConfig {
        ma_windows: (
            read_window(config, "ma_short", defaults.short_ma())?,
            read_window(config, "ma_long", defaults.long_ma())?,
        ),
        bb_window: read_window(config, "bb_window", defaults.bb_window)?,
        bb_std: read_number(config, "bb_std", defaults.bb_std)?,
        volatility_window: read_window(config, "volatility_window", defaults.volatility_window)?,
        periods_per_year: read_number(config, "periods_per_year", defaults.periods_per_year)?,
    })
}

pub fn resolve_settings(
    args: &AnalyzeArgs,
    config: &dyn ConfigPort,
) -> Result<AnalysisSettings, StockscopeError> {
    validate_data_config(config)?;
    let indicators = build_indicator_config(config)?;
    let tickers = parse_tickers(&args.tickers)?;

    if let Some(end) = args.end.filter(|end| *end < args.start) {
        return Err(StockscopeError::ConfigInvalid {
            section: "analyze".into(),
            key: "end".into(),
            reason: format!("end {end} is before start {}", args.start),
        });
    }

    let source = match args
        .source
        .clone()
        .or_else(|| config.get_string("data", "source"))
    {
        Some(s) => s.parse().map_err(|reason| StockscopeError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason,
        })?,
        None => DataSource::Yahoo,
    };

    let interval = match args
        .interval
        .clone()
        .or_else(|| config.get_string("data", "interval"))
    {
        Some(s) => s.parse().map_err(|reason| StockscopeError::ConfigInvalid {
            section: "data".into(),
            key: "interval".into(),
            reason,
        })?,
        None => Interval::default(),
    };

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| config.get_string("data", "data_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.get_string("output", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let alphavantage_api_key = args
        .alphavantage_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| config.get_string("data", "alphavantage_api_key"))
        .map(SecretString::from);

    Ok(AnalysisSettings {
        request: AnalysisRequest {
            tickers,
            start: args.start,
            end: args.end,
            interval,
            indicators,
            output_dir,
        },
        source,
        data_dir,
        alphavantage_api_key,
    })
}

pub fn build_data_port(settings: &AnalysisSettings) -> Result<Box<dyn DataPort>, StockscopeError> {
    match settings.source {
        DataSource::Csv => Ok(Box::new(CsvAdapter::new(settings.data_dir.clone()))),
        #[cfg(feature = "fetch")]
        DataSource::Yahoo => Ok(Box::new(YahooAdapter::new()?)),
        #[cfg(feature = "fetch")]
        DataSource::AlphaVantage => {
            let key = settings.alphavantage_api_key.clone().ok_or_else(|| {
                StockscopeError::ConfigMissing {
                    section: "data".into(),
                    key: "alphavantage_api_key".into(),
                }
            })?;
            Ok(Box::new(AlphaVantageAdapter::new(key)?))
        }
        #[cfg(not(feature = "fetch"))]
        remote => Err(StockscopeError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("fetch feature is required for source {remote}"),
        }),
    }
}

/// What an `analyze` run would do, without doing it.
pub fn dry_run_plan(settings: &AnalysisSettings) -> String {
    let req = &settings.request;
    let ind = &req.indicators;
    let mut lines = vec![
        "Dry run: nothing will be fetched or written".to_string(),
        format!("Tickers:     {}", req.tickers.join(", ")),
        format!(
            "Range:       {} to {}",
            req.start,
            req.end.map_or_else(|| "today".to_string(), |e| e.to_string())
        ),
        format!("Source:      {}", settings.source),
        format!("Interval:    {}", req.interval),
    ];
    if settings.source == DataSource::Csv {
        lines.push(format!("Data dir:    {}", settings.data_dir.display()));
    }
    lines.push(format!(
        "Indicators:  MA_{} MA_{} BB({}, {}) RollingVol_{} x sqrt({})",
        ind.short_ma(),
        ind.long_ma(),
        ind.bb_window,
        ind.bb_std,
        ind.volatility_window,
        ind.periods_per_year
    ));
    lines.push(format!("Output dir:  {}", req.output_dir.display()));
    lines.push("Would write:".to_string());
    for t in &req.tickers {
        lines.push(format!("  {t}_enriched_prices.csv"));
        lines.push(format!("  {t}_candlestick.svg"));
        lines.push(format!("  {t}_rolling_volatility.svg"));
    }
    for f in [
        SUMMARY_FILE,
        CORRELATION_FILE,
        "asset_correlation_heatmap.svg",
        REPORT_FILE,
    ] {
        lines.push(format!("  {f}"));
    }
    lines.join("\n")
}

/// Fetch, enrich, summarize and correlate every ticker, writing all outputs.
///
/// Fail-fast: the first error from any ticker or writer aborts the run. All
/// tickers are fetched before the output directory is created, so a fetch
/// failure leaves nothing on disk.
/// Summaries are written sorted by ticker; the correlation matrix keeps the
/// request's ticker order.
pub fn run_analysis_pipeline(
    data_port: &dyn DataPort,
    chart_port: &dyn ChartPort,
    report_port: &dyn ReportPort,
    request: &AnalysisRequest,
) -> Result<AnalysisOutputs, StockscopeError> {
    // Stage 4: Fetch every ticker before anything touches the output dir
    let mut fetched = Vec::with_capacity(request.tickers.len());
    for ticker in &request.tickers {
        tracing::info!(ticker = %ticker, "fetching prices");
        fetched.push(data_port.fetch_ohlcv(ticker, request.start, request.end, request.interval)?);
    }

    let dir = request.output_dir.as_path();
    fs::create_dir_all(dir)?;

    let mut outputs = AnalysisOutputs::default();
    let mut summaries = Vec::with_capacity(fetched.len());
    let mut closes = Vec::with_capacity(fetched.len());

    // Stage 5: Per-ticker indicators, summary, CSV and charts
    for (ticker, series) in request.tickers.iter().zip(&fetched) {
        tracing::info!(ticker = %ticker, rows = series.len(), "computing indicators");

        let enriched = add_indicators(series, &request.indicators);
        summaries.push(summarize_asset(
            &enriched,
            ticker,
            request.indicators.short_ma(),
            request.indicators.long_ma(),
        )?);

        outputs.enriched_csvs.push(write_enriched_csv(&enriched, dir)?);
        outputs.charts.push(chart_port.candlestick(&enriched, dir)?);
        outputs.charts.push(chart_port.rolling_volatility(&enriched, dir)?);
        closes.push(CloseSeries::from_enriched(&enriched));
    }

    // Stage 6: Correlation
    tracing::info!(tickers = closes.len(), "computing correlation");
    let matrix = compute_correlation(&closes)?;
    outputs.correlation_csv = write_correlation_csv(&matrix, dir)?;
    outputs.charts.push(chart_port.correlation_heatmap(&matrix, dir)?);

    // Stage 7: Summary CSV
    summaries.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    outputs.summary_csv = write_summary_csv(&summaries, dir)?;

    // Stage 8: Report
    let chart_names: Vec<String> = outputs
        .charts
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    outputs.report = report_port.write(
        &ReportContext {
            summaries: &summaries,
            correlation: &matrix,
            charts: &chart_names,
        },
        dir,
    )?;

    tracing::info!(dir = %dir.display(), "analysis complete");
    Ok(outputs)
}

fn run_validate(config_path: &Path) -> ExitCode {
    tracing::info!(path = %config_path.display(), "validating config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return report_failure(&e),
    };

    if let Err(e) = validate_data_config(&adapter) {
        return report_failure(&e);
    }
    let indicators = match build_indicator_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report_failure(&e),
    };

    let source = adapter
        .get_string("data", "source")
        .unwrap_or_else(|| DataSource::Yahoo.to_string());
    let interval = adapter
        .get_string("data", "interval")
        .unwrap_or_else(|| Interval::default().to_string());
    let output_dir = adapter
        .get_string("output", "dir")
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    println!("[analysis]");
    println!("  ma_windows:        {}, {}", indicators.short_ma(), indicators.long_ma());
    println!("  bb_window:         {}", indicators.bb_window);
    println!("  bb_std:            {}", indicators.bb_std);
    println!("  volatility_window: {}", indicators.volatility_window);
    println!("  periods_per_year:  {}", indicators.periods_per_year);
    println!("[data]");
    println!("  source:            {source}");
    println!("  interval:          {interval}");
    println!("[output]");
    println!("  dir:               {output_dir}");
    println!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
