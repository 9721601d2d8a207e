//! Terminal results of an annealing run.
//!
//! A [`Solution`] is materialised from the explorer's model once the loop
//! finishes. Multi-objective runs additionally produce an
//! [`ArchiveSummary`] listing every non-dominated state the archive kept.
//! Both serialise to JSON through an [`Encoder`].

mod encoding;

pub use encoding::{Encoder, JsonEncoder};

use crate::archive::NonDominatedArchive;
use crate::model::Model;
use serde::{Deserialize, Serialize};

/// One decision variable of a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionVariable {
    pub name: String,
    pub value: f64,
}

/// The committed state of a model at the end of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solution {
    pub id: String,
    pub decision_variables: Vec<SolutionVariable>,
    pub active_management_actions: Vec<String>,
}

impl Solution {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Copies committed decision variables and active actions out of `model`.
    pub fn from_model(id: impl Into<String>, model: &dyn Model) -> Self {
        Self {
            id: id.into(),
            decision_variables: model
                .decision_variables()
                .iter()
                .map(|variable| SolutionVariable {
                    name: variable.name().to_string(),
                    value: variable.value(),
                })
                .collect(),
            active_management_actions: model.active_management_actions(),
        }
    }

    pub fn decision_variable(&self, name: &str) -> Option<f64> {
        self.decision_variables
            .iter()
            .find(|variable| variable.name == name)
            .map(|variable| variable.value)
    }

    pub fn file_name_safe_id(&self) -> String {
        file_name_safe(&self.id)
    }
}

/// One archived state, decoded for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSummaryEntry {
    /// Raw objective values, in the order of [`ArchiveSummary::objective_names`].
    pub objectives: Vec<f64>,
    pub active_management_actions: Vec<String>,
}

/// Every state held by a multi-objective archive at the end of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub id: String,
    pub objective_names: Vec<String>,
    pub entries: Vec<ArchiveSummaryEntry>,
}

impl ArchiveSummary {
    pub fn from_archive(id: impl Into<String>, archive: &NonDominatedArchive) -> Self {
        let action_names = archive.action_names();
        let entries = archive
            .entries()
            .iter()
            .map(|entry| ArchiveSummaryEntry {
                objectives: entry.objectives().to_vec(),
                active_management_actions: entry
                    .state()
                    .actions()
                    .iter()
                    .zip(action_names)
                    .filter(|(active, _)| *active)
                    .map(|(_, name)| name.clone())
                    .collect(),
            })
            .collect();

        Self {
            id: id.into(),
            objective_names: archive.objective_names().to_vec(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn file_name_safe_id(&self) -> String {
        file_name_safe(&self.id)
    }
}

/// Replaces path separators and characters most file systems reject.
pub fn file_name_safe(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
