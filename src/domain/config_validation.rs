//! Configuration validation.
//!
//! Validates every config section before a cycle runs and reports the first
//! offending `[section] key`.

use crate::domain::error::RatchetError;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    validate_portfolio(config)?;
    validate_risk(config)?;
    validate_cycle(config)?;
    validate_assets(config)?;
    validate_strategy_config(config)?;
    validate_sqlite(config)?;
    Ok(())
}

/// Comma-separated asset codes from `[assets] codes`, trimmed.
pub fn asset_codes(config: &dyn ConfigPort) -> Vec<String> {
    config
        .get_string("assets", "codes")
        .map(|s| {
            s.split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Section holding the descriptor of one asset.
pub fn asset_section(code: &str) -> String {
    format!("asset:{}", code)
}

fn invalid(section: &str, key: &str, reason: &str) -> RatchetError {
    RatchetError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_portfolio(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    let value = config.get_double("portfolio", "initial_capital", 1000.0);
    if value < 0.0 || !value.is_finite() {
        return Err(invalid(
            "portfolio",
            "initial_capital",
            "initial_capital must be non-negative",
        ));
    }
    Ok(())
}

fn validate_fraction(
    config: &dyn ConfigPort,
    key: &str,
    default: f64,
) -> Result<(), RatchetError> {
    let value = config.get_double("risk", key, default);
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return Err(invalid(
            "risk",
            key,
            &format!("{} must be between 0 and 1 (exclusive)", key),
        ));
    }
    Ok(())
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    validate_fraction(config, "max_risk_pct", 0.02)?;
    validate_fraction(config, "stop_loss_pct", 0.05)?;
    validate_fraction(config, "trailing_stop_pct", 0.10)?;
    Ok(())
}

fn validate_cycle(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    if config.get_int("cycle", "interval_seconds", 3600) < 1 {
        return Err(invalid(
            "cycle",
            "interval_seconds",
            "interval_seconds must be at least 1",
        ));
    }
    let lookback = config.get_int("cycle", "lookback_days", 30);
    if lookback < 1 || lookback > i64::from(u32::MAX) {
        return Err(invalid(
            "cycle",
            "lookback_days",
            "lookback_days must be a positive number of days",
        ));
    }
    Ok(())
}

fn validate_assets(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    let codes = asset_codes(config);
    if codes.is_empty() {
        return Err(RatchetError::ConfigMissing {
            section: "assets".to_string(),
            key: "codes".to_string(),
        });
    }
    for code in &codes {
        let section = asset_section(code);
        match config.get_string(&section, "market") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(RatchetError::ConfigMissing {
                    section,
                    key: "market".to_string(),
                });
            }
        }
    }
    Ok(())
}

/// A missing `[strategy] kind` is valid: the supervisor simply has no
/// strategy until one is set.
pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    let Some(kind) = config.get_string("strategy", "kind") else {
        return Ok(());
    };
    match kind.trim() {
        "basic" => {
            validate_window(config, "window", 7)?;
            validate_threshold(config)?;
        }
        "enhanced" => {
            validate_window(config, "short_window", 7)?;
            validate_window(config, "long_window", 25)?;
            validate_window(config, "volume_window", 7)?;
            validate_window(config, "rsi_period", 14)?;
            validate_threshold(config)?;
            validate_rsi_bounds(config)?;
        }
        other => {
            return Err(invalid(
                "strategy",
                "kind",
                &format!("unknown strategy kind '{}', expected basic or enhanced", other),
            ));
        }
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort, key: &str, default: i64) -> Result<(), RatchetError> {
    if config.get_int("strategy", key, default) < 1 {
        return Err(invalid("strategy", key, &format!("{} must be at least 1", key)));
    }
    Ok(())
}

fn validate_threshold(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    let value = config.get_double("strategy", "threshold", 0.02);
    if value < 0.0 || !value.is_finite() {
        return Err(invalid(
            "strategy",
            "threshold",
            "threshold must be non-negative",
        ));
    }
    Ok(())
}

fn validate_rsi_bounds(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    let overbought = config.get_double("strategy", "rsi_overbought", 70.0);
    let oversold = config.get_double("strategy", "rsi_oversold", 30.0);
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "rsi_overbought",
            "rsi_overbought must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be between 0 and 100",
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought",
        ));
    }
    Ok(())
}

fn validate_sqlite(config: &dyn ConfigPort) -> Result<(), RatchetError> {
    if config.get_int("sqlite", "pool_size", 4) < 1 {
        return Err(invalid("sqlite", "pool_size", "pool_size must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const ASSETS: &str = "[assets]\ncodes = BTC/USDT\n[asset:BTC/USDT]\nmarket = bitcoin\n";

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn with_assets(extra: &str) -> FileConfigAdapter {
        make_config(&format!("{}{}", ASSETS, extra))
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[portfolio]
initial_capital = 5000.0

[risk]
max_risk_pct = 0.02
stop_loss_pct = 0.05
trailing_stop_pct = 0.10

[cycle]
interval_seconds = 3600
lookback_days = 30

[assets]
codes = BTC/USDT, ETH/USDT

[asset:BTC/USDT]
name = Bitcoin
market = bitcoin

[asset:ETH/USDT]
name = Ethereum
market = ethereum

[strategy]
kind = enhanced
short_window = 7
long_window = 25
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&with_assets("")).is_ok());
    }

    #[test]
    fn negative_capital_fails() {
        let config = with_assets("[portfolio]\ninitial_capital = -1\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "initial_capital")
        );
    }

    #[test]
    fn zero_capital_allowed() {
        let config = with_assets("[portfolio]\ninitial_capital = 0\n");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn risk_fraction_out_of_range_fails() {
        for (key, value) in [
            ("max_risk_pct", "0"),
            ("stop_loss_pct", "1.0"),
            ("trailing_stop_pct", "-0.1"),
            ("max_risk_pct", "NaN"),
            ("stop_loss_pct", "nan"),
        ] {
            let config = with_assets(&format!("[risk]\n{} = {}\n", key, value));
            let err = validate_config(&config).unwrap_err();
            assert!(
                matches!(&err, RatchetError::ConfigInvalid { key: k, .. } if k == key),
                "{} = {} gave {:?}",
                key,
                value,
                err
            );
        }
    }

    #[test]
    fn zero_interval_fails() {
        let config = with_assets("[cycle]\ninterval_seconds = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "interval_seconds")
        );
    }

    #[test]
    fn missing_codes_fails() {
        let config = make_config("[portfolio]\ninitial_capital = 10\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigMissing { key, .. } if key == "codes"));
    }

    #[test]
    fn asset_without_market_fails() {
        let config = make_config("[assets]\ncodes = BTC/USDT\n[asset:BTC/USDT]\nname = Bitcoin\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            RatchetError::ConfigMissing { section, key }
                if section == "asset:BTC/USDT" && key == "market"
        ));
    }

    #[test]
    fn missing_strategy_kind_is_valid() {
        let config = with_assets("[strategy]\nwindow = 5\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn unknown_strategy_kind_fails() {
        let config = with_assets("[strategy]\nkind = martingale\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn zero_window_fails() {
        let config = with_assets("[strategy]\nkind = basic\nwindow = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn negative_threshold_fails() {
        let config = with_assets("[strategy]\nkind = basic\nthreshold = -0.1\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "threshold"));
    }

    #[test]
    fn inverted_rsi_bounds_fail() {
        let config =
            with_assets("[strategy]\nkind = enhanced\nrsi_overbought = 30\nrsi_oversold = 70\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "rsi_oversold"));
    }

    #[test]
    fn zero_pool_size_fails() {
        let config = with_assets("[sqlite]\npool_size = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, RatchetError::ConfigInvalid { key, .. } if key == "pool_size"));
    }

    #[test]
    fn asset_codes_are_trimmed() {
        let config = make_config("[assets]\ncodes = BTC/USDT , ETH/USDT,,\n");
        assert_eq!(asset_codes(&config), vec!["BTC/USDT", "ETH/USDT"]);
    }
}
