//! Bounded Pareto archive of compressed model snapshots.
//!
//! The multi-objective explorer offers every accepted model state to a
//! [`NonDominatedArchive`]. The archive keeps only states no other entry
//! dominates, storing each as a [`CompressedModelState`] (decision-variable
//! values plus bit-packed action flags) rather than a model clone.
//!
//! # Invariant
//!
//! After any sequence of insertions no two entries dominate each other and
//! no two entries share an objective vector. An entry dominated by (or equal
//! to) an incumbent is rejected without changing the archive.
//!
//! # Eviction
//!
//! When an insertion pushes the archive past its maximum size, one
//! incumbent is evicted according to the configured [`EvictionPolicy`].
//! The default evicts the entry nearest another entry in objective space,
//! preferring the oldest among ties.

mod boolean;
mod compressor;
mod dominance;

pub use boolean::BooleanArchive;
pub use compressor::{CompressedModelState, ModelCompressor};
pub use dominance::{
    crowding_distance, dominance_cmp, dominates, nearest_neighbour_distances, Dominance,
};

use crate::error::{Error, Result};
use crate::model::{Model, Sense};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default maximum number of archive entries.
pub const DEFAULT_ARCHIVE_SIZE: usize = 100;

/// Distance measure used to pick an eviction victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvictionMetric {
    /// Smallest Euclidean distance to another entry.
    #[default]
    NearestNeighbour,
    /// Smallest crowding distance.
    CrowdingDistance,
}

/// Which entry loses when several share the eviction score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TieBreak {
    #[default]
    Oldest,
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvictionPolicy {
    pub metric: EvictionMetric,
    pub tie_break: TieBreak,
}

/// What happened to a state offered to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageResult {
    Stored,
    /// Stored, and an incumbent was evicted to respect the size bound.
    StoredWithEviction,
    /// Rejected: an incumbent dominates or equals it.
    Dominated,
}

/// One archived solution.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    objectives: Vec<f64>,
    minimised: Vec<f64>,
    state: CompressedModelState,
    sequence: u64,
}

impl ArchiveEntry {
    /// Objective values as the model reports them.
    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn state(&self) -> &CompressedModelState {
        &self.state
    }

    /// Insertion order, starting at zero.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// A bounded set of mutually non-dominated model states.
///
/// # Examples
///
/// ```
/// use u_anneal::archive::{NonDominatedArchive, StorageResult};
/// use u_anneal::model::{Model, MultiObjectiveDumbModel};
///
/// let model = MultiObjectiveDumbModel::new(5, 1);
/// let mut archive = NonDominatedArchive::for_model(&model, 10).unwrap();
///
/// assert_eq!(archive.try_store(&model).unwrap(), StorageResult::Stored);
/// assert_eq!(archive.try_store(&model).unwrap(), StorageResult::Dominated);
/// assert_eq!(archive.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct NonDominatedArchive {
    objective_names: Vec<String>,
    senses: Vec<Sense>,
    action_names: Vec<String>,
    max_size: usize,
    eviction: EvictionPolicy,
    compressor: ModelCompressor,
    entries: Vec<ArchiveEntry>,
    next_sequence: u64,
}

impl NonDominatedArchive {
    /// An empty archive whose objectives are the decision variables of
    /// `model`, in order.
    pub fn for_model(model: &dyn Model, max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::InvalidParameter {
                name: "archive_size".into(),
                reason: "archive must hold at least one entry".into(),
            });
        }
        let variables = model.decision_variables();
        Ok(Self {
            objective_names: variables.names(),
            senses: variables.iter().map(|variable| variable.sense()).collect(),
            action_names: model
                .management_actions()
                .iter()
                .map(|action| action.name().to_string())
                .collect(),
            max_size,
            eviction: EvictionPolicy::default(),
            compressor: ModelCompressor,
            entries: Vec::new(),
            next_sequence: 0,
        })
    }

    pub fn with_eviction_policy(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.eviction
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn objective_names(&self) -> &[String] {
        &self.objective_names
    }

    pub fn action_names(&self) -> &[String] {
        &self.action_names
    }

    /// Maps raw objective values onto the minimisation axis.
    pub fn minimised(&self, objectives: &[f64]) -> Vec<f64> {
        self.senses
            .iter()
            .zip(objectives)
            .map(|(sense, &value)| sense.to_minimisation(value))
            .collect()
    }

    /// True if some entry dominates or equals `objectives` (raw values).
    pub fn is_dominated(&self, objectives: &[f64]) -> bool {
        let candidate = self.minimised(objectives);
        self.entries.iter().any(|entry| {
            matches!(
                dominance_cmp(&entry.minimised, &candidate),
                Dominance::Left | Dominance::Equal
            )
        })
    }

    /// Offers the committed state of `model` to the archive.
    pub fn try_store(&mut self, model: &dyn Model) -> Result<StorageResult> {
        let state = self.compressor.compress(model);
        if state.variables().len() != self.objective_names.len() {
            return Err(Error::ArchiveViolation(format!(
                "model [{}] reports {} objectives, archive tracks {}",
                model.name(),
                state.variables().len(),
                self.objective_names.len(),
            )));
        }
        let objectives = state.variables().to_vec();
        if self.is_dominated(&objectives) {
            return Ok(StorageResult::Dominated);
        }

        let minimised = self.minimised(&objectives);
        self.entries
            .retain(|entry| !dominates(&minimised, &entry.minimised));
        self.entries.push(ArchiveEntry {
            objectives,
            minimised,
            state,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;

        if self.entries.len() > self.max_size {
            let victim = self.eviction_victim();
            self.entries.remove(victim);
            return Ok(StorageResult::StoredWithEviction);
        }
        Ok(StorageResult::Stored)
    }

    /// Restores entry `index` into `model`.
    pub fn restore(&self, index: usize, model: &mut dyn Model) -> Result<()> {
        let entry = self.entries.get(index).ok_or_else(|| Error::InvalidParameter {
            name: "index".into(),
            reason: format!("{index} is outside archive of {} entries", self.entries.len()),
        })?;
        self.compressor.decompress(&entry.state, model)
    }

    /// Checks that no entry dominates or duplicates another.
    pub fn verify(&self) -> Result<()> {
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                let relation = dominance_cmp(&a.minimised, &b.minimised);
                if relation != Dominance::Neither {
                    return Err(Error::ArchiveViolation(format!(
                        "entries {} and {} compare as {:?}",
                        a.sequence, b.sequence, relation
                    )));
                }
            }
        }
        Ok(())
    }

    /// Index of the incumbent to evict. The newest entry (last) never is.
    fn eviction_victim(&self) -> usize {
        let objectives: Vec<Vec<f64>> = self
            .entries
            .iter()
            .map(|entry| entry.minimised.clone())
            .collect();
        let scores = match self.eviction.metric {
            EvictionMetric::NearestNeighbour => nearest_neighbour_distances(&objectives),
            EvictionMetric::CrowdingDistance => crowding_distance(&objectives),
        };

        let incumbents = 0..self.entries.len() - 1;
        let tie_break = self.eviction.tie_break;
        incumbents
            .min_by(|&a, &b| {
                scores[a]
                    .partial_cmp(&scores[b])
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| {
                        let (sa, sb) = (self.entries[a].sequence, self.entries[b].sequence);
                        match tie_break {
                            TieBreak::Oldest => sa.cmp(&sb),
                            TieBreak::Newest => sb.cmp(&sa),
                        }
                    })
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DecisionVariable, DecisionVariables, MultiObjectiveDumbModel};
    use crate::random::create_rng;
    use proptest::prelude::*;
    use rand::RngCore;

    /// Two minimised objectives set directly.
    #[derive(Debug, Clone)]
    struct PointModel {
        variables: DecisionVariables,
    }

    impl PointModel {
        fn at(x: f64, y: f64) -> Self {
            Self {
                variables: DecisionVariables::new()
                    .with(DecisionVariable::new("x", x))
                    .with(DecisionVariable::new("y", y)),
            }
        }
    }

    impl Model for PointModel {
        fn name(&self) -> &str {
            "PointModel"
        }
        fn try_random_change(&mut self, _rng: &mut dyn RngCore) {}
        fn accept_change(&mut self) {}
        fn revert_change(&mut self) {}
        fn decision_variables(&self) -> &DecisionVariables {
            &self.variables
        }
        fn decision_variables_mut(&mut self) -> &mut DecisionVariables {
            &mut self.variables
        }
        fn clone_model(&self) -> Box<dyn Model> {
            Box::new(self.clone())
        }
    }

    fn archive(max_size: usize) -> NonDominatedArchive {
        NonDominatedArchive::for_model(&PointModel::at(0.0, 0.0), max_size).unwrap()
    }

    // ---- Insertion ----

    #[test]
    fn test_dominated_entry_rejected() {
        let mut archive = archive(10);
        archive.try_store(&PointModel::at(1.0, 1.0)).unwrap();
        let result = archive.try_store(&PointModel::at(2.0, 2.0)).unwrap();
        assert_eq!(result, StorageResult::Dominated);
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_dominating_entry_removes_incumbents() {
        let mut archive = archive(10);
        archive.try_store(&PointModel::at(3.0, 1.0)).unwrap();
        archive.try_store(&PointModel::at(1.0, 3.0)).unwrap();
        archive.try_store(&PointModel::at(2.0, 2.0)).unwrap();
        assert_eq!(archive.len(), 3);

        archive.try_store(&PointModel::at(0.5, 0.5)).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.entries()[0].objectives(), &[0.5, 0.5]);
    }

    #[test]
    fn test_maximised_objectives_respected() {
        let model = MultiObjectiveDumbModel::new(3, 1);
        let mut archive = NonDominatedArchive::for_model(&model, 10).unwrap();
        // Cost 0 / sediment 0 versus cost 0 / sediment 5: the latter wins.
        assert!(!archive.is_dominated(&[0.0, 0.0]));
        archive.try_store(&model).unwrap();
        assert!(!archive.is_dominated(&[0.0, 5.0]));
        assert!(archive.is_dominated(&[1.0, 0.0]));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(NonDominatedArchive::for_model(&PointModel::at(0.0, 0.0), 0).is_err());
    }

    // ---- Eviction ----

    #[test]
    fn test_nearest_neighbour_eviction_oldest() {
        let mut archive = archive(3);
        archive.try_store(&PointModel::at(0.0, 10.0)).unwrap();
        archive.try_store(&PointModel::at(5.0, 5.0)).unwrap();
        archive.try_store(&PointModel::at(10.0, 0.0)).unwrap();
        let result = archive.try_store(&PointModel::at(5.1, 4.8)).unwrap();

        assert_eq!(result, StorageResult::StoredWithEviction);
        assert_eq!(archive.len(), 3);
        let kept: Vec<&[f64]> = archive.entries().iter().map(ArchiveEntry::objectives).collect();
        assert!(!kept.contains(&[5.0, 5.0].as_slice()));
        assert!(kept.contains(&[5.1, 4.8].as_slice()));
    }

    #[test]
    fn test_tie_break_newest() {
        let mut archive = archive(3).with_eviction_policy(EvictionPolicy {
            metric: EvictionMetric::NearestNeighbour,
            tie_break: TieBreak::Newest,
        });
        archive.try_store(&PointModel::at(0.0, 2.0)).unwrap();
        archive.try_store(&PointModel::at(1.0, 1.0)).unwrap();
        archive.try_store(&PointModel::at(2.0, 0.0)).unwrap();
        archive.try_store(&PointModel::at(10.0, -10.0)).unwrap();

        // All three incumbents are sqrt(2) from a neighbour; the newest goes.
        let kept: Vec<u64> = archive.entries().iter().map(ArchiveEntry::sequence).collect();
        assert_eq!(kept, vec![0, 1, 3]);
    }

    #[test]
    fn test_crowding_distance_eviction() {
        let mut archive = archive(3).with_eviction_policy(EvictionPolicy {
            metric: EvictionMetric::CrowdingDistance,
            tie_break: TieBreak::Oldest,
        });
        archive.try_store(&PointModel::at(0.0, 10.0)).unwrap();
        archive.try_store(&PointModel::at(4.0, 6.0)).unwrap();
        archive.try_store(&PointModel::at(10.0, 0.0)).unwrap();
        archive.try_store(&PointModel::at(6.0, 3.0)).unwrap();

        assert_eq!(archive.len(), 3);
        archive.verify().unwrap();
    }

    // ---- Restore ----

    #[test]
    fn test_restore_entry() {
        let mut model = MultiObjectiveDumbModel::new(10, 2);
        let mut archive = NonDominatedArchive::for_model(&model, 10).unwrap();
        let mut rng = create_rng(5);
        model.try_random_change(&mut rng);
        model.accept_change();
        archive.try_store(&model).unwrap();
        let stored = model.clone();

        for _ in 0..5 {
            model.try_random_change(&mut rng);
            model.accept_change();
        }
        archive.restore(0, &mut model).unwrap();
        assert!(model.is_equivalent_to(&stored));
        assert!(archive.restore(3, &mut model).is_err());
    }

    // ---- Invariant ----

    proptest! {
        #[test]
        fn prop_archive_stays_non_dominated(
            points in proptest::collection::vec((0.0f64..100.0, 0.0f64..100.0), 1..60),
            max_size in 1usize..12,
        ) {
            let mut archive = archive(max_size);
            for (x, y) in points {
                let before = archive.len();
                let result = archive.try_store(&PointModel::at(x, y)).unwrap();
                if result == StorageResult::Dominated {
                    prop_assert_eq!(archive.len(), before);
                }
                prop_assert!(archive.len() <= max_size);
                prop_assert!(archive.verify().is_ok());
            }
        }
    }
}
