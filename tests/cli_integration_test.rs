//! CLI integration tests.
//!
//! Tests cover:
//! - Config builders (assets, risk, strategy, supervisor)
//! - Command dispatch with real INI and CSV files on disk
//! - Trades journaled by one command and read back by another

use clap::Parser;
use ratchet::adapters::file_config_adapter::FileConfigAdapter;
use ratchet::cli::{self, Cli};
use ratchet::domain::error::RatchetError;
use ratchet::domain::strategy::{BasicParams, EnhancedParams, Strategy};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn config(content: &str) -> FileConfigAdapter {
    FileConfigAdapter::from_string(content).unwrap()
}

// ExitCode has no PartialEq on older toolchains; compare the debug form
fn is_success(code: ExitCode) -> bool {
    format!("{code:?}") == format!("{:?}", ExitCode::SUCCESS)
}

fn run_cli(args: &[&str]) -> ExitCode {
    let mut argv = vec!["ratchet", "--log-level", "warn"];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

const VALID_INI: &str = r#"
[portfolio]
initial_capital = 1000.0

[risk]
max_risk_pct = 0.02
stop_loss_pct = 0.05
trailing_stop_pct = 0.10

[cycle]
interval_seconds = 1
lookback_days = 30

[assets]
codes = BTC/USDT, ETH/USDT

[asset:BTC/USDT]
name = Bitcoin
market = bitcoin

[asset:ETH/USDT]
market = ethereum
type = futures

[strategy]
kind = basic
window = 3
threshold = 0.02
"#;

mod builders {
    use super::*;

    #[test]
    fn assets_follow_configured_order() {
        let assets = cli::build_assets(&config(VALID_INI)).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].code, "BTC/USDT");
        assert_eq!(assets[0].name, "Bitcoin");
        assert_eq!(assets[0].asset_type, "spot");
        assert_eq!(assets[0].market, "bitcoin");
        // name falls back to the code
        assert_eq!(assets[1].name, "ETH/USDT");
        assert_eq!(assets[1].asset_type, "futures");
    }

    #[test]
    fn asset_without_market_is_missing() {
        let err = cli::build_assets(&config("[assets]\ncodes = XRP/USDT\n")).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigMissing { key, .. } if key == "market"));
    }

    #[test]
    fn risk_config_defaults() {
        let risk = cli::build_risk_config(&config("[risk]\nmax_risk_pct = 0.1\n"));
        assert_eq!(risk.max_risk_pct, 0.1);
        assert_eq!(risk.stop_loss_pct, 0.05);
        assert_eq!(risk.trailing_stop_pct, 0.10);
    }

    #[test]
    fn basic_strategy_from_config() {
        let strategy = cli::build_strategy(&config(VALID_INI)).unwrap();
        assert_eq!(
            strategy,
            Some(Strategy::Basic(BasicParams {
                window: 3,
                threshold: 0.02
            }))
        );
    }

    #[test]
    fn enhanced_strategy_fills_defaults() {
        let strategy =
            cli::build_strategy(&config("[strategy]\nkind = enhanced\nrsi_period = 9\n")).unwrap();
        assert_eq!(
            strategy,
            Some(Strategy::Enhanced(EnhancedParams {
                rsi_period: 9,
                ..EnhancedParams::default()
            }))
        );
    }

    #[test]
    fn absent_kind_means_no_strategy() {
        assert_eq!(cli::build_strategy(&config("[strategy]\nwindow = 3\n")).unwrap(), None);
    }

    #[test]
    fn unknown_kind_is_invalid() {
        let err = cli::build_strategy(&config("[strategy]\nkind = grid\n")).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn negative_window_is_invalid() {
        let err =
            cli::build_strategy(&config("[strategy]\nkind = basic\nwindow = -3\n")).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn supervisor_starts_with_initial_capital() {
        let sup = cli::build_supervisor(&config(VALID_INI)).unwrap();
        assert_eq!(sup.portfolio().cash, 1000.0);
        assert_eq!(sup.portfolio().initial_capital, 1000.0);
        assert_eq!(sup.assets().len(), 2);
        assert!(sup.strategy().is_some());
        assert!(sup.stop_levels().is_empty());
    }

    #[test]
    fn interval_from_config() {
        assert_eq!(cli::cycle_interval(&config(VALID_INI)).as_secs(), 1);
        assert_eq!(cli::cycle_interval(&config("")).as_secs(), 3600);
    }
}

mod commands {
    use super::*;

    /// Config plus a data dir where bitcoin is breaking out and ethereum is flat.
    fn setup(extra: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("prices");
        fs::create_dir(&data).unwrap();
        fs::write(
            data.join("bitcoin.csv"),
            "date,price,volume\n\
             2024-03-01,40.0,10\n\
             2024-03-02,40.0,10\n\
             2024-03-03,40.0,10\n\
             2024-03-04,50.0,20\n",
        )
        .unwrap();
        fs::write(
            data.join("ethereum.csv"),
            "date,price,volume\n2024-03-03,100.0,5\n2024-03-04,100.0,5\n",
        )
        .unwrap();

        let ini = format!(
            "{}\n[market]\ndata_dir = {}\n\n[sqlite]\npath = {}\n{}",
            VALID_INI,
            data.display(),
            dir.path().join("journal.db").display(),
            extra
        );
        let path = dir.path().join("ratchet.ini");
        fs::write(&path, ini).unwrap();
        (dir, path)
    }

    fn arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn validate_accepts_valid_config() {
        let file = write_temp_ini(VALID_INI);
        assert!(is_success(run_cli(&[
            "validate",
            "-c",
            file.path().to_str().unwrap()
        ])));
    }

    #[test]
    fn validate_rejects_bad_risk() {
        let file = write_temp_ini(&VALID_INI.replace("stop_loss_pct = 0.05", "stop_loss_pct = 2"));
        assert!(!is_success(run_cli(&[
            "validate",
            "-c",
            file.path().to_str().unwrap()
        ])));
    }

    #[test]
    fn missing_config_file_fails() {
        assert!(!is_success(run_cli(&["validate", "-c", "/nonexistent/ratchet.ini"])));
    }

    #[test]
    fn strategy_command_describes_strategy() {
        let file = write_temp_ini(VALID_INI);
        assert!(is_success(run_cli(&[
            "strategy",
            "-c",
            file.path().to_str().unwrap()
        ])));
    }

    #[test]
    fn strategy_command_without_strategy_fails() {
        let file = write_temp_ini(&VALID_INI.replace("kind = basic", ""));
        assert!(!is_success(run_cli(&[
            "strategy",
            "-c",
            file.path().to_str().unwrap()
        ])));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn cycle_journals_trades_for_trades_command() {
        use ratchet::adapters::sqlite_adapter::SqliteTradeJournal;
        use ratchet::domain::trade::OrderSide;
        use ratchet::ports::trade_journal_port::TradeJournalPort;

        let (_dir, path) = setup("");
        assert!(is_success(run_cli(&["cycle", "-c", arg(&path)])));
        assert!(is_success(run_cli(&["cycle", "-c", arg(&path), "--json"])));
        assert!(is_success(run_cli(&["trades", "-c", arg(&path)])));

        let adapter = FileConfigAdapter::from_file(&path).unwrap();
        let journal = SqliteTradeJournal::from_config(&adapter).unwrap();
        let trades = journal.list_trades().unwrap();
        // each fresh process buys bitcoin once; ethereum holds
        assert_eq!(trades.len(), 2);
        assert!(trades.iter().all(|t| t.code == "BTC/USDT" && t.side == OrderSide::Buy));
        assert!((trades[0].quantity - 0.4).abs() < 1e-12);
        assert_eq!(trades[0].exchange, "paper");
    }

    #[test]
    fn run_command_stops_after_requested_cycles() {
        let (_dir, path) = setup("");
        assert!(is_success(run_cli(&["run", "-c", arg(&path), "--cycles", "2"])));
    }

    #[test]
    fn cycle_without_strategy_fails() {
        let (_dir, path) = setup("");
        let ini = fs::read_to_string(&path).unwrap().replace("kind = basic", "");
        fs::write(&path, ini).unwrap();
        assert!(!is_success(run_cli(&["cycle", "-c", arg(&path)])));
    }
}
