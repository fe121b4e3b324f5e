//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvMarketData;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_executor::PaperExecutor;
use crate::domain::asset::Asset;
use crate::domain::config_validation::{asset_codes, asset_section, validate_config};
use crate::domain::error::RatchetError;
use crate::domain::performance::TradePnl;
use crate::domain::portfolio::Portfolio;
use crate::domain::scheduler::SharedSupervisor;
use crate::domain::strategy::{BasicParams, EnhancedParams, Strategy};
use crate::domain::supervisor::{
    AssetOutcome, CyclePorts, CycleReport, RiskConfig, RiskSupervisor,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::trade_journal_port::TradeJournalPort;

#[derive(Parser, Debug)]
#[command(name = "ratchet", about = "Risk-supervised trading advisor")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single decision cycle
    Cycle {
        #[arg(short, long)]
        config: PathBuf,
        /// Print the cycle report and supervisor snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run decision cycles on the configured interval
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// List journaled trades with their current profit/loss
    Trades {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the configured strategy and its parameters
    Strategy {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(&cli.log_level);
    match cli.command {
        Command::Cycle { config, json } => run_cycle_command(&config, json),
        Command::Run { config, cycles } => run_loop(&config, cycles),
        Command::Trades { config } => run_trades(&config),
        Command::Strategy { config } => run_strategy(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Logs go to stderr; `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .try_init();
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = RatchetError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_validated(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "loading config");
    let adapter = load_config(path)?;
    validate_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

fn fail(e: &RatchetError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

pub fn build_portfolio(config: &dyn ConfigPort) -> Portfolio {
    Portfolio::new(config.get_double("portfolio", "initial_capital", 1000.0))
}

pub fn build_risk_config(config: &dyn ConfigPort) -> RiskConfig {
    let defaults = RiskConfig::default();
    RiskConfig {
        max_risk_pct: config.get_double("risk", "max_risk_pct", defaults.max_risk_pct),
        stop_loss_pct: config.get_double("risk", "stop_loss_pct", defaults.stop_loss_pct),
        trailing_stop_pct: config.get_double(
            "risk",
            "trailing_stop_pct",
            defaults.trailing_stop_pct,
        ),
    }
}

pub fn build_assets(config: &dyn ConfigPort) -> Result<Vec<Asset>, RatchetError> {
    asset_codes(config)
        .into_iter()
        .map(|code| {
            let section = asset_section(&code);
            let market = config.get_string(&section, "market").ok_or_else(|| {
                RatchetError::ConfigMissing {
                    section: section.clone(),
                    key: "market".into(),
                }
            })?;
            let name = config
                .get_string(&section, "name")
                .unwrap_or_else(|| code.clone());
            let asset_type = config
                .get_string(&section, "type")
                .unwrap_or_else(|| "spot".to_string());
            Ok(Asset::new(&code, &name, &asset_type, market.trim()))
        })
        .collect()
}

fn get_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, RatchetError> {
    let value = config.get_int("strategy", key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|w| *w > 0)
        .ok_or_else(|| RatchetError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: format!("{} must be at least 1", key),
        })
}

/// `None` when `[strategy] kind` is absent.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<Option<Strategy>, RatchetError> {
    let Some(kind) = config.get_string("strategy", "kind") else {
        return Ok(None);
    };
    let strategy = match kind.trim() {
        "basic" => {
            let d = BasicParams::default();
            Strategy::Basic(BasicParams {
                window: get_window(config, "window", d.window)?,
                threshold: config.get_double("strategy", "threshold", d.threshold),
            })
        }
        "enhanced" => {
            let d = EnhancedParams::default();
            Strategy::Enhanced(EnhancedParams {
                short_window: get_window(config, "short_window", d.short_window)?,
                long_window: get_window(config, "long_window", d.long_window)?,
                threshold: config.get_double("strategy", "threshold", d.threshold),
                volume_window: get_window(config, "volume_window", d.volume_window)?,
                rsi_period: get_window(config, "rsi_period", d.rsi_period)?,
                rsi_overbought: config.get_double("strategy", "rsi_overbought", d.rsi_overbought),
                rsi_oversold: config.get_double("strategy", "rsi_oversold", d.rsi_oversold),
            })
        }
        other => {
            return Err(RatchetError::ConfigInvalid {
                section: "strategy".into(),
                key: "kind".into(),
                reason: format!("unknown strategy kind '{}'", other),
            });
        }
    };
    Ok(Some(strategy))
}

pub fn build_supervisor(config: &dyn ConfigPort) -> Result<RiskSupervisor, RatchetError> {
    let lookback = config.get_int("cycle", "lookback_days", 30);
    let lookback_days = u32::try_from(lookback)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| RatchetError::ConfigInvalid {
            section: "cycle".into(),
            key: "lookback_days".into(),
            reason: "lookback_days must be a positive number of days".into(),
        })?;

    let supervisor = RiskSupervisor::new(
        build_assets(config)?,
        build_portfolio(config),
        build_risk_config(config),
        lookback_days,
    );
    Ok(match build_strategy(config)? {
        Some(strategy) => supervisor.with_strategy(strategy),
        None => supervisor,
    })
}

pub fn cycle_interval(config: &dyn ConfigPort) -> Duration {
    Duration::from_secs(config.get_int("cycle", "interval_seconds", 3600).max(1) as u64)
}

#[cfg(feature = "sqlite")]
pub fn build_journal(config: &dyn ConfigPort) -> Result<Box<dyn TradeJournalPort>, RatchetError> {
    use crate::adapters::sqlite_adapter::SqliteTradeJournal;

    if config.get_string("sqlite", "path").is_none() {
        tracing::warn!("no [sqlite] path configured; trades are kept in memory only");
    }
    let journal = SqliteTradeJournal::from_config(config)?;
    journal.initialize_schema()?;
    Ok(Box::new(journal))
}

#[cfg(not(feature = "sqlite"))]
pub fn build_journal(_config: &dyn ConfigPort) -> Result<Box<dyn TradeJournalPort>, RatchetError> {
    use crate::adapters::memory_journal::MemoryTradeJournal;

    tracing::warn!("sqlite feature disabled; trades are kept in memory only");
    Ok(Box::new(MemoryTradeJournal::new()))
}

fn run_cycle_command(config_path: &PathBuf, json: bool) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let mut supervisor = match build_supervisor(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let journal = match build_journal(&adapter) {
        Ok(j) => j,
        Err(e) => return fail(&e),
    };
    let market = CsvMarketData::from_config(&adapter);
    let executor = PaperExecutor::from_config(&adapter);
    let ports = CyclePorts {
        market: &market,
        executor: &executor,
        journal: journal.as_ref(),
    };

    let report = match supervisor.run_cycle(&ports, Utc::now()) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if json {
        let output = serde_json::json!({
            "report": report,
            "snapshot": supervisor.snapshot(),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        print_cycle_summary(&report, &supervisor, &market);
    }
    ExitCode::SUCCESS
}

fn print_cycle_summary(
    report: &CycleReport,
    supervisor: &RiskSupervisor,
    market: &dyn MarketDataPort,
) {
    println!("=== Cycle {} ===", report.started_at.format("%Y-%m-%d %H:%M:%S"));
    for asset in &report.assets {
        let line = match &asset.outcome {
            AssetOutcome::PriceUnavailable => "skipped (price unavailable)".to_string(),
            AssetOutcome::Held => "hold".to_string(),
            AssetOutcome::InsufficientCash => "skipped (insufficient cash)".to_string(),
            AssetOutcome::NothingToSell => "skipped (nothing to sell)".to_string(),
            AssetOutcome::Traded { trade, forced_by } => {
                let forced = forced_by
                    .map(|t| format!(" [{} exit]", t))
                    .unwrap_or_default();
                format!(
                    "{} {:.8} @ {:.4}{}",
                    trade.side, trade.quantity, trade.price, forced
                )
            }
            AssetOutcome::ExecutionFailed { reason } => format!("failed ({reason})"),
            AssetOutcome::NotFilled => "not filled".to_string(),
            AssetOutcome::LedgerRejected { reason } => format!("rejected ({reason})"),
        };
        println!("  {:<12} {}", asset.code, line);
    }

    let portfolio = supervisor.portfolio();
    println!("\n=== Portfolio ===");
    println!("Cash:             {:.2}", portfolio.cash);
    for v in portfolio.valuations(market) {
        let value = v
            .value
            .map(|x| format!("{:.2}", x))
            .unwrap_or_else(|| "n/a".to_string());
        println!("  {:<12} {:.8}  value {}", v.code, v.amount, value);
    }
    println!("Total Value:      {:.2}", report.performance.portfolio_value);
    println!(
        "Cycle Variation:  {:.2}%",
        report.performance.variation * 100.0
    );
    if let Some(pnl) = portfolio.pnl(report.performance.portfolio_value) {
        println!("Total P&L:        {:.2}%", pnl * 100.0);
    }
}

fn run_loop(config_path: &PathBuf, cycles: Option<usize>) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let supervisor = match build_supervisor(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let journal = match build_journal(&adapter) {
        Ok(j) => j,
        Err(e) => return fail(&e),
    };
    let market = CsvMarketData::from_config(&adapter);
    let executor = PaperExecutor::from_config(&adapter);
    let ports = CyclePorts {
        market: &market,
        executor: &executor,
        journal: journal.as_ref(),
    };

    let interval = cycle_interval(&adapter);
    info!(interval_secs = interval.as_secs(), ?cycles, "starting scheduler");
    let shared = SharedSupervisor::new(supervisor);
    match shared.run_every(&ports, interval, cycles) {
        Ok(completed) => {
            let snapshot = shared.snapshot();
            println!("Completed {} cycle(s)", completed);
            println!("Cash:             {:.2}", snapshot.cash);
            println!("Open Positions:   {}", snapshot.positions.len());
            if let Some(perf) = &snapshot.last_performance {
                println!("Total Value:      {:.2}", perf.portfolio_value);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_trades(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_validated(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let assets = match build_assets(&adapter) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let journal = match build_journal(&adapter) {
        Ok(j) => j,
        Err(e) => return fail(&e),
    };
    let trades = match journal.list_trades() {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    let market = CsvMarketData::from_config(&adapter);

    let markets: HashMap<&str, &str> = assets
        .iter()
        .map(|a| (a.code.as_str(), a.market.as_str()))
        .collect();
    let mut prices: HashMap<String, Option<f64>> = HashMap::new();

    if trades.is_empty() {
        println!("No trades recorded");
        return ExitCode::SUCCESS;
    }

    println!(
        "{:<20} {:<12} {:<5} {:>14} {:>12} {:>12} {:>9}",
        "Time", "Asset", "Side", "Quantity", "Price", "Current", "P&L %"
    );
    for trade in trades {
        let current = *prices.entry(trade.code.clone()).or_insert_with(|| {
            markets
                .get(trade.code.as_str())
                .and_then(|m| market.current_price(m).ok())
        });
        let marked = TradePnl::mark(trade, current);
        let fmt_opt = |v: Option<f64>, prec: usize| {
            v.map(|x| format!("{:.*}", prec, x))
                .unwrap_or_else(|| "n/a".to_string())
        };
        println!(
            "{:<20} {:<12} {:<5} {:>14.8} {:>12.4} {:>12} {:>9}",
            marked.trade.timestamp.format("%Y-%m-%d %H:%M:%S"),
            marked.trade.code,
            marked.trade.side.to_string(),
            marked.trade.quantity,
            marked.trade.price,
            fmt_opt(marked.current_price, 4),
            fmt_opt(marked.pnl_pct, 2),
        );
    }
    ExitCode::SUCCESS
}

fn run_strategy(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match build_strategy(&adapter) {
        Ok(Some(strategy)) => {
            println!("Name:        {}", strategy.name());
            println!("Kind:        {}", strategy.kind());
            println!("Description: {}", strategy.description());
            println!("Parameters:");
            for param in strategy.parameters() {
                let value = serde_json::to_string(&param.value).unwrap_or_default();
                println!("  {:<16} {}", param.name, value);
            }
            ExitCode::SUCCESS
        }
        Ok(None) => fail(&RatchetError::NoStrategy),
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    match load_validated(config_path) {
        Ok(_) => {
            eprintln!("Config validated successfully");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}
