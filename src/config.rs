use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medicine Wallet";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minutes after a scheduled dose during which it stays `pending`.
pub const GRACE_PERIOD_MINUTES: i64 = 60;

/// Course length used when the duration text carries no number.
pub const DEFAULT_DURATION_DAYS: i64 = 7;

/// Trailing window (calendar days, today included) for the compliance rate.
pub const COMPLIANCE_WINDOW_DAYS: i64 = 7;

/// How far back the streak walk looks before giving up.
pub const STREAK_LOOKBACK_DAYS: i64 = 30;

/// Width of the adherence calendar, in days.
pub const GRID_DAYS: i64 = 14;

/// Environment variable naming a SQLite file for the intake ledger.
pub const LEDGER_PATH_ENV: &str = "MEDICINE_WALLET_LEDGER";

/// Environment variable enabling strict schedule references ("1"/"true").
pub const STRICT_REFS_ENV: &str = "MEDICINE_WALLET_STRICT_REFS";

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medicine_wallet=info"
}

/// Get the application data directory
/// ~/MedicineWallet/ when a home directory is known, else the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("MedicineWallet")
}

/// Default location of the SQLite intake ledger.
pub fn default_ledger_path() -> PathBuf {
    app_data_dir().join("intake_ledger.db")
}

/// Runtime knobs for a `MedicineWallet`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletConfig {
    /// When set, intake records live in a SQLite file instead of memory.
    pub ledger_path: Option<PathBuf>,
    /// Reject intake records whose schedule id the generator never produced.
    pub strict_schedule_refs: bool,
}

impl WalletConfig {
    /// Build a config from `MEDICINE_WALLET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ledger_path = lookup(LEDGER_PATH_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let strict_schedule_refs = lookup(STRICT_REFS_ENV)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self {
            ledger_path,
            strict_schedule_refs,
        }
    }
}
