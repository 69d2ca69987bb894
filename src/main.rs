//! Medicine Wallet report: schedules, today's doses and adherence as JSON.

use std::process::ExitCode;

use medicine_wallet::{
    config, init_logging, JsonPrescriptionSource, MedicineWallet, WalletConfig, WalletError,
};
use serde_json::json;

fn run(path: &str) -> Result<String, WalletError> {
    let source = JsonPrescriptionSource::new(path);
    let wallet = MedicineWallet::from_config(source, WalletConfig::from_env())?;

    let report = json!({
        "schedules": wallet.medicine_schedules()?,
        "today": wallet.today_schedule()?,
        "compliance": wallet.compliance_stats()?,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() -> ExitCode {
    init_logging();
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: medicine-wallet <prescriptions.json>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(path = %path, "Report failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
