pub mod clock;
pub mod compensation;
pub mod compliance;
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod schedule; // Frequency/duration parsing + schedule generation
pub mod source;
pub mod status; // Dose and day classification
pub mod wallet;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::WalletConfig;
pub use error::WalletError;
pub use ledger::{InMemoryLedger, IntakeRepository, SqliteLedger};
pub use source::{JsonPrescriptionSource, PrescriptionSource, StaticPrescriptions};
pub use wallet::MedicineWallet;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. Later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
