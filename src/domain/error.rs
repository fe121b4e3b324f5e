//! Domain error types.

/// Top-level error type for ratchet.
#[derive(Debug, thiserror::Error)]
pub enum RatchetError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no strategy configured")]
    NoStrategy,

    #[error("market data unavailable for {market}: {reason}")]
    DataUnavailable { market: String, reason: String },

    #[error("order for {code} failed: {reason}")]
    Execution { code: String, reason: String },

    #[error("cannot sell {requested} of {code}: only {held} held")]
    Oversell {
        code: String,
        requested: f64,
        held: f64,
    },

    #[error("a cycle is already running")]
    CycleInProgress,

    #[error("invalid capital {0}: must be non-negative")]
    InvalidCapital(f64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RatchetError> for std::process::ExitCode {
    fn from(err: &RatchetError) -> Self {
        let code: u8 = match err {
            RatchetError::Io(_) => 1,
            RatchetError::ConfigParse { .. }
            | RatchetError::ConfigMissing { .. }
            | RatchetError::ConfigInvalid { .. }
            | RatchetError::InvalidCapital(_) => 2,
            RatchetError::Database { .. } | RatchetError::DatabaseQuery { .. } => 3,
            RatchetError::NoStrategy | RatchetError::CycleInProgress => 4,
            RatchetError::DataUnavailable { .. } => 5,
            RatchetError::Execution { .. } | RatchetError::Oversell { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
