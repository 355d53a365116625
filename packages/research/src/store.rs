//! Report persistence - timestamped JSON snapshots.
//!
//! The pipeline's only durable artifact: each stage report is written
//! as a pretty-printed JSON document named
//! `{company}_{layer1|layer2}_{YYYYMMDD_HHMMSS}.json` (spaces in the
//! company name become underscores) under an output directory created
//! on demand.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ResearchError, Result};
use crate::types::report::{Layer1Report, Layer2Report};

/// Writes stage reports to an output directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    output_dir: PathBuf,
}

impl ReportStore {
    /// Create a store rooted at `output_dir`.
    ///
    /// The directory is created lazily on first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The directory reports are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist the stage-1 report. Returns the written path.
    pub async fn save_layer1(&self, report: &Layer1Report) -> Result<PathBuf> {
        self.write_snapshot(&report.company_name, "layer1", report)
            .await
    }

    /// Persist the stage-2 report. Returns the written path.
    pub async fn save_layer2(&self, report: &Layer2Report) -> Result<PathBuf> {
        self.write_snapshot(&report.company_name, "layer2", report)
            .await
    }

    async fn write_snapshot<T: serde::Serialize>(
        &self,
        company_name: &str,
        layer: &str,
        report: &T,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(ResearchError::Storage)?;

        let path = self
            .output_dir
            .join(snapshot_file_name(company_name, layer, Utc::now()));
        let json = serde_json::to_string_pretty(report)?;

        tokio::fs::write(&path, json)
            .await
            .map_err(ResearchError::Storage)?;

        info!(path = %path.display(), "report persisted");
        Ok(path)
    }
}

/// Build a snapshot file name for a company, layer and timestamp.
fn snapshot_file_name(
    company_name: &str,
    layer: &str,
    at: chrono::DateTime<Utc>,
) -> String {
    let company = company_name.replace(' ', "_");
    format!("{company}_{layer}_{}.json", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_file_name() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            snapshot_file_name("Acme Corp", "layer1", at),
            "Acme_Corp_layer1_20250314_092653.json"
        );
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_file() {
        let dir = std::env::temp_dir().join(format!("research_store_{}", std::process::id()));
        let store = ReportStore::new(&dir);

        let report = Layer1Report {
            company_name: "Acme Corp".to_string(),
            general_objective: "Market".to_string(),
            total_sub_objectives: 4,
            successful: 0,
            failed: 4,
            failed_objectives: vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
            ],
            research_results: vec![],
        };

        let path = store.save_layer1(&report).await.unwrap();
        assert!(path.exists());

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let round_trip: Layer1Report = serde_json::from_str(&raw).unwrap();
        assert!(round_trip.is_consistent());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
