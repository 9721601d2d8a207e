//! Persistence of solutions and archive summaries.

use super::{ArchiveSummary, Solution};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const JSON_EXTENSION: &str = "json";

/// Writes terminal results somewhere a collaborator can pick them up.
pub trait Encoder {
    fn encode_solution(&self, solution: &Solution) -> Result<()>;

    fn encode_summary(&self, summary: &ArchiveSummary) -> Result<()>;
}

/// Pretty-printed JSON files named after the result id:
///
/// - `<output>/<safe-id>.json` for a [`Solution`]
/// - `<output>/<safe-id>-Summary.json` for an [`ArchiveSummary`]
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    output_path: PathBuf,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn solution_path(&self, solution: &Solution) -> PathBuf {
        self.output_path
            .join(format!("{}.{JSON_EXTENSION}", solution.file_name_safe_id()))
    }

    pub fn summary_path(&self, summary: &ArchiveSummary) -> PathBuf {
        self.output_path
            .join(format!("{}-Summary.{JSON_EXTENSION}", summary.file_name_safe_id()))
    }

    fn write<T: Serialize>(&self, id: &str, value: &T, path: &Path) -> Result<()> {
        let marshaled = serde_json::to_vec_pretty(value).map_err(|source| Error::Json {
            id: id.to_string(),
            source,
        })?;

        let file = File::create(path)
            .map_err(|e| Error::io(format!("opening [{}] for json encoding", path.display()), e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&marshaled)
            .and_then(|()| writer.flush())
            .map_err(|e| Error::io(format!("writing json of [{id}]"), e))?;

        debug!(id, path = %path.display(), "encoded json");
        Ok(())
    }
}

impl Encoder for JsonEncoder {
    fn encode_solution(&self, solution: &Solution) -> Result<()> {
        self.write(&solution.id, solution, &self.solution_path(solution))
    }

    fn encode_summary(&self, summary: &ArchiveSummary) -> Result<()> {
        self.write(&summary.id, summary, &self.summary_path(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{ArchiveSummaryEntry, SolutionVariable};

    fn solution() -> Solution {
        Solution {
            id: "Scenario (1/2)".into(),
            decision_variables: vec![SolutionVariable {
                name: "ObjectiveValue".into(),
                value: 998.0,
            }],
            active_management_actions: vec!["PlanningUnit-3".into()],
        }
    }

    #[test]
    fn test_solution_written_under_safe_name() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = JsonEncoder::new().with_output_path(dir.path());
        encoder.encode_solution(&solution()).unwrap();

        let path = dir.path().join("Scenario (1_2).json");
        let decoded: Solution =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(decoded, solution());
    }

    #[test]
    fn test_summary_written_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = JsonEncoder::new().with_output_path(dir.path());
        let summary = ArchiveSummary {
            id: "mo".into(),
            objective_names: vec!["Cost".into(), "Benefit".into()],
            entries: vec![ArchiveSummaryEntry {
                objectives: vec![1.0, 2.0],
                active_management_actions: Vec::new(),
            }],
        };
        encoder.encode_summary(&summary).unwrap();

        let text = std::fs::read_to_string(dir.path().join("mo-Summary.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["objective_names"][1], "Benefit");
        assert_eq!(json["entries"][0]["objectives"][0], 1.0);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = JsonEncoder::new().with_output_path(dir.path().join("absent"));
        let error = encoder.encode_solution(&solution()).unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
        assert!(error.to_string().contains("json encoding"));
    }
}
