use std::{env, path::PathBuf};

use tracing_subscriber::EnvFilter;
use tripsplit_presentation::{CurrencyFormat, currency::DEFAULT_SYMBOL};

pub const CURRENCY_SYMBOL_VAR: &str = "TRIPSPLIT_CURRENCY_SYMBOL";
pub const GROUP_FILE_VAR: &str = "TRIPSPLIT_GROUP_FILE";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings read from the environment and an optional `.env` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub currency_symbol: String,
    /// Used when no group file is passed on the command line.
    pub group_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let currency_symbol = lookup(CURRENCY_SYMBOL_VAR)
            .map(|symbol| symbol.trim().to_owned())
            .filter(|symbol| !symbol.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_owned());
        let group_file = lookup(GROUP_FILE_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Self {
            currency_symbol,
            group_file,
        }
    }

    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.currency_symbol.as_str())
    }
}

/// Logs go to stderr so command output on stdout stays clean; `RUST_LOG` overrides the level.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
