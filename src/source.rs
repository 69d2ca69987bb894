//! Where active prescriptions come from.

use std::path::{Path, PathBuf};

use crate::error::WalletError;
use crate::models::Prescription;

pub trait PrescriptionSource: Send + Sync {
    fn active_prescriptions(&self) -> Result<Vec<Prescription>, WalletError>;
}

/// A fixed list held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticPrescriptions {
    prescriptions: Vec<Prescription>,
}

impl StaticPrescriptions {
    pub fn new(prescriptions: Vec<Prescription>) -> Self {
        Self { prescriptions }
    }
}

impl PrescriptionSource for StaticPrescriptions {
    fn active_prescriptions(&self) -> Result<Vec<Prescription>, WalletError> {
        Ok(self.prescriptions.clone())
    }
}

/// A JSON array of prescriptions, re-read on every call.
///
/// An entry that does not parse is logged and skipped; the rest still load.
#[derive(Debug, Clone)]
pub struct JsonPrescriptionSource {
    path: PathBuf,
}

impl JsonPrescriptionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PrescriptionSource for JsonPrescriptionSource {
    fn active_prescriptions(&self) -> Result<Vec<Prescription>, WalletError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

        let mut prescriptions = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Prescription>(entry) {
                Ok(prescription) => prescriptions.push(prescription),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    index,
                    error = %e,
                    "Skipping unreadable prescription"
                ),
            }
        }
        tracing::debug!(
            path = %self.path.display(),
            count = prescriptions.len(),
            "Loaded prescriptions"
        );
        Ok(prescriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "id": 6,
            "date": "2026-01-08",
            "doctor": "Dr. Rao",
            "diagnosis": "Sinusitis",
            "medications": [
                {"name": "Amoxicillin", "dosage": "500 mg", "frequency": "3 times daily", "duration": "7 days"}
            ]
        }
    ]"#;

    #[test]
    fn static_source_returns_its_list() {
        let source = StaticPrescriptions::default();
        assert!(source.active_prescriptions().unwrap().is_empty());
    }

    #[test]
    fn json_source_reads_file_and_ignores_extra_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = JsonPrescriptionSource::new(file.path());
        let prescriptions = source.active_prescriptions().unwrap();
        assert_eq!(prescriptions.len(), 1);
        assert_eq!(prescriptions[0].id, 6);
        assert_eq!(prescriptions[0].medications[0].name, "Amoxicillin");
        assert_eq!(prescriptions[0].date.to_string(), "2026-01-08");
    }

    #[test]
    fn json_source_missing_file_is_io_error() {
        let source = JsonPrescriptionSource::new("/definitely/not/here.json");
        assert!(matches!(source.active_prescriptions(), Err(WalletError::Io(_))));
    }

    fn source_over(json: &str) -> (tempfile::NamedTempFile, JsonPrescriptionSource) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let source = JsonPrescriptionSource::new(file.path());
        (file, source)
    }

    #[test]
    fn json_source_accepts_iso_datetimes() {
        let (_file, source) = source_over(
            r#"[
                {"id": 1, "date": "2026-01-06", "doctor": "Dr. Rao", "medications": []},
                {"id": 2, "date": "2026-01-06T10:00:00Z", "doctor": "Dr. Iyer", "medications": []}
            ]"#,
        );
        let prescriptions = source.active_prescriptions().unwrap();
        assert_eq!(prescriptions.len(), 2);
        assert_eq!(prescriptions[0].date, prescriptions[1].date);
    }

    #[test]
    fn json_source_skips_unreadable_entries() {
        let (_file, source) = source_over(
            r#"[
                {"id": 1, "date": "Jan 8", "doctor": "X", "medications": []},
                {"id": 2, "date": "2026-01-08", "doctor": "Dr. Rao", "medications": []},
                {"id": "three"}
            ]"#,
        );
        let prescriptions = source.active_prescriptions().unwrap();
        assert_eq!(prescriptions.len(), 1);
        assert_eq!(prescriptions[0].id, 2);
    }

    #[test]
    fn json_source_non_array_is_json_error() {
        let (_file, source) = source_over(r#"{"id": 1}"#);
        assert!(matches!(source.active_prescriptions(), Err(WalletError::Json(_))));
    }
}
