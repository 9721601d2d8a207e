use super::{Explorer, Trial};
use crate::archive::{EvictionPolicy, NonDominatedArchive, DEFAULT_ARCHIVE_SIZE};
use crate::cooling::{validate_cooling_factor, Coolant, CoolantKind};
use crate::error::{Error, Result};
use crate::model::Model;
use crate::observer::AttributeValue;
use crate::random::ConcurrencySafeRng;
use crate::solution::ArchiveSummary;
use std::sync::Arc;
use tracing::debug;

/// Multi-objective explorer after Suppapitnarm et al.
///
/// Every decision variable of the model is an objective, optimised in its
/// own [`Sense`](crate::model::Sense). Each objective has its own coolant,
/// seeded from the first temperature the annealer supplies.
///
/// A proposed change is *desirable* if no archived state dominates (or
/// equals) it, or if it improves at least one objective without worsening
/// any other by more than the configured tolerance. Desirable changes are
/// accepted outright; others with probability `prod_i exp(-delta_i / T_i)`.
/// Every accepted state is offered to the archive.
///
/// Every `return_to_base_step` iterations the iteration restores a randomly
/// chosen archive entry instead of perturbing; it is reported as an accepted
/// change.
pub struct SuppapitnarmExplorer {
    id: String,
    model: Box<dyn Model>,
    rng: Arc<ConcurrencySafeRng>,
    trial: Trial,
    coolant_kind: CoolantKind,
    cooling_factor: f64,
    coolants: Vec<Box<dyn Coolant>>,
    archive_size: usize,
    eviction: EvictionPolicy,
    archive: Option<NonDominatedArchive>,
    tolerance: f64,
    return_to_base_step: u64,
    iterations: u64,
}

impl SuppapitnarmExplorer {
    pub fn new(model: Box<dyn Model>) -> Self {
        Self {
            id: String::new(),
            model,
            rng: Arc::new(ConcurrencySafeRng::default()),
            trial: Trial::default(),
            coolant_kind: CoolantKind::Suppapitnarm,
            cooling_factor: 1.0,
            coolants: Vec::new(),
            archive_size: DEFAULT_ARCHIVE_SIZE,
            eviction: EvictionPolicy::default(),
            archive: None,
            tolerance: 0.0,
            return_to_base_step: 0,
            iterations: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(ConcurrencySafeRng::seeded(seed));
        self
    }

    pub fn with_rng(mut self, rng: Arc<ConcurrencySafeRng>) -> Self {
        self.rng = rng;
        self
    }

    /// Coolant built for each objective.
    pub fn with_coolant(mut self, kind: CoolantKind) -> Self {
        self.coolant_kind = kind;
        self
    }

    pub fn with_cooling_factor(mut self, cooling_factor: f64) -> Self {
        self.cooling_factor = cooling_factor;
        self
    }

    pub fn with_archive_size(mut self, archive_size: usize) -> Self {
        self.archive_size = archive_size;
        self
    }

    pub fn with_eviction_policy(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Largest worsening on any objective still counted as desirable
    /// alongside an improvement elsewhere.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// `0` disables returning to base.
    pub fn with_return_to_base_step(mut self, step: u64) -> Self {
        self.return_to_base_step = step;
        self
    }

    /// Checks the configuration without touching the model.
    pub fn validate(&self) -> Result<()> {
        validate_cooling_factor(self.cooling_factor)?;
        if self.archive_size == 0 {
            return Err(Error::InvalidParameter {
                name: "archive_size".into(),
                reason: "archive must hold at least one entry".into(),
            });
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tolerance".into(),
                reason: format!("must be non-negative, got {}", self.tolerance),
            });
        }
        Ok(())
    }

    pub fn archive(&self) -> Option<&NonDominatedArchive> {
        self.archive.as_ref()
    }

    /// Current temperature of each objective's coolant.
    pub fn temperatures(&self) -> Vec<f64> {
        self.coolants.iter().map(|coolant| coolant.temperature()).collect()
    }

    fn objective_values(&self) -> Vec<f64> {
        self.model.decision_variables().values()
    }

    fn first_objective(&self) -> f64 {
        self.model
            .decision_variables()
            .at(0)
            .map_or(0.0, |variable| variable.value())
    }

    fn ensure_coolants(&mut self, temperature: f64) -> Result<()> {
        if self.coolants.is_empty() {
            self.coolants = (0..self.model.decision_variables().len())
                .map(|_| self.coolant_kind.build(temperature, self.cooling_factor))
                .collect::<Result<_>>()?;
        }
        Ok(())
    }

    fn archive_mut(&mut self) -> Result<&mut NonDominatedArchive> {
        if self.archive.is_none() {
            let archive = NonDominatedArchive::for_model(self.model.as_ref(), self.archive_size)?
                .with_eviction_policy(self.eviction);
            self.archive = Some(archive);
        }
        self.archive
            .as_mut()
            .ok_or_else(|| Error::ArchiveViolation("archive unavailable".into()))
    }

    fn due_for_return_to_base(&self) -> bool {
        self.return_to_base_step > 0
            && self.iterations % self.return_to_base_step == 0
            && self.archive.as_ref().is_some_and(|archive| !archive.is_empty())
    }

    fn return_to_base(&mut self) -> Result<()> {
        let before = self.first_objective();
        if let Some(archive) = self.archive.as_ref() {
            let index = self.rng.random_index(archive.len());
            archive.restore(index, self.model.as_mut())?;
            debug!(id = %self.id, entry = index, "returned to archived base");
        }
        let after = self.first_objective();
        self.trial = Trial {
            objective_value: after,
            change_in_objective_value: after - before,
            change_is_desirable: true,
            change_accepted: true,
            acceptance_probability: 1.0,
        };
        Ok(())
    }

    fn perturb(&mut self) -> Result<()> {
        let before = self.first_objective();
        self.rng
            .with_dyn_rng(|rng| self.model.try_random_change(rng));

        let variables = self.model.decision_variables();
        let proposed: Vec<f64> = variables.iter().map(|v| v.inductive_value()).collect();
        let directed_changes: Vec<f64> = variables
            .iter()
            .map(|v| v.sense().to_minimisation(v.change()))
            .collect();

        let archive = self.archive_mut()?;
        let escapes_archive = !archive.is_dominated(&proposed);
        let improves_somewhere = directed_changes.iter().any(|&delta| delta < 0.0);
        let regression_tolerated = directed_changes.iter().all(|&delta| delta <= self.tolerance);
        let desirable = escapes_archive || (improves_somewhere && regression_tolerated);

        let probability = if desirable {
            1.0
        } else {
            self.coolants
                .iter()
                .zip(&directed_changes)
                .map(|(coolant, &delta)| coolant.acceptance_probability(delta))
                .product::<f64>()
                .min(1.0)
        };
        let accepted = desirable || self.rng.random_unit() < probability;

        for (coolant, &delta) in self.coolants.iter_mut().zip(&directed_changes) {
            coolant.observe(delta, accepted);
        }

        if accepted {
            self.model.accept_change();
            let model = self.model.as_ref();
            if let Some(archive) = self.archive.as_mut() {
                archive.try_store(model)?;
            }
        } else {
            self.model.revert_change();
        }

        let after = self.first_objective();
        self.trial = Trial {
            objective_value: after,
            change_in_objective_value: proposed.first().map_or(0.0, |&p| p - before),
            change_is_desirable: desirable,
            change_accepted: accepted,
            acceptance_probability: probability,
        };
        Ok(())
    }
}

impl Explorer for SuppapitnarmExplorer {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn initialise(&mut self) -> Result<()> {
        self.validate()?;
        self.model.initialise();
        self.iterations = 0;
        self.archive = None;
        self.archive_mut()?;
        self.trial = Trial {
            objective_value: self.first_objective(),
            ..Trial::default()
        };
        debug!(
            id = %self.id,
            model = self.model.name(),
            objectives = self.model.decision_variables().len(),
            "explorer initialised"
        );
        Ok(())
    }

    fn tear_down(&mut self) -> Result<()> {
        if let Some(archive) = &self.archive {
            archive.verify()?;
            debug!(id = %self.id, entries = archive.len(), "explorer torn down");
        }
        Ok(())
    }

    fn try_random_change(&mut self, temperature: f64) -> Result<()> {
        self.ensure_coolants(temperature)?;
        self.iterations += 1;

        if self.due_for_return_to_base() {
            self.return_to_base()?;
        } else {
            self.perturb()?;
        }

        for coolant in &mut self.coolants {
            coolant.cool_down();
        }
        Ok(())
    }

    fn trial(&self) -> &Trial {
        &self.trial
    }

    fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    fn model_mut(&mut self) -> &mut dyn Model {
        self.model.as_mut()
    }

    fn rng(&self) -> Option<&ConcurrencySafeRng> {
        Some(self.rng.as_ref())
    }

    fn clone_explorer(&self) -> Box<dyn Explorer> {
        Box::new(Self {
            id: self.id.clone(),
            model: self.model.clone(),
            rng: Arc::new(self.rng.fork()),
            trial: self.trial,
            coolant_kind: self.coolant_kind,
            cooling_factor: self.cooling_factor,
            coolants: self.coolants.clone(),
            archive_size: self.archive_size,
            eviction: self.eviction,
            archive: self.archive.clone(),
            tolerance: self.tolerance,
            return_to_base_step: self.return_to_base_step,
            iterations: self.iterations,
        })
    }

    fn iteration_attributes(&self) -> Vec<(&'static str, AttributeValue)> {
        vec![
            ("ObjectiveValues", AttributeValue::from(self.objective_values())),
            ("Temperatures", AttributeValue::from(self.temperatures())),
            (
                "ArchiveSize",
                AttributeValue::from(self.archive.as_ref().map_or(0, |a| a.len()) as u64),
            ),
        ]
    }

    fn archive_summary(&self, id: &str) -> Option<ArchiveSummary> {
        self.archive
            .as_ref()
            .map(|archive| ArchiveSummary::from_archive(id, archive))
    }
}
