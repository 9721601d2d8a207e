//! Decision variables with a pending (inductive) value.
//!
//! A model proposes a change by writing inductive values; the explorer then
//! either commits them ([`DecisionVariable::accept_inductive_value`]) or
//! discards them ([`DecisionVariable::reject_inductive_value`]).

use serde::{Deserialize, Serialize};

/// Direction in which a decision variable is optimised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sense {
    #[default]
    Minimise,
    Maximise,
}

impl Sense {
    /// Maps a raw value onto the minimisation axis used by explorers and the
    /// archive: lower is always better after this transformation.
    pub fn to_minimisation(self, value: f64) -> f64 {
        match self {
            Sense::Minimise => value,
            Sense::Maximise => -value,
        }
    }
}

/// A named, optionally bounded quantity the search can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionVariable {
    name: String,
    value: f64,
    #[serde(skip)]
    inductive_value: Option<f64>,
    bounds: Option<(f64, f64)>,
    sense: Sense,
}

impl DecisionVariable {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            inductive_value: None,
            bounds: None,
            sense: Sense::Minimise,
        }
    }

    /// Restricts values to `[minimum, maximum]`; the current value is clamped.
    pub fn with_bounds(mut self, minimum: f64, maximum: f64) -> Self {
        self.bounds = Some((minimum, maximum));
        self.value = self.clamp(self.value);
        self
    }

    pub fn with_sense(mut self, sense: Sense) -> Self {
        self.sense = sense;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The committed value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The pending value if a change is in flight, else the committed one.
    pub fn inductive_value(&self) -> f64 {
        self.inductive_value.unwrap_or(self.value)
    }

    pub fn has_pending_change(&self) -> bool {
        self.inductive_value.is_some()
    }

    /// `inductive - committed`.
    pub fn change(&self) -> f64 {
        self.inductive_value() - self.value
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.bounds
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Overwrites the committed value and drops any pending change.
    pub fn set_value(&mut self, value: f64) {
        self.value = self.clamp(value);
        self.inductive_value = None;
    }

    pub fn set_inductive_value(&mut self, value: f64) {
        self.inductive_value = Some(self.clamp(value));
    }

    pub fn accept_inductive_value(&mut self) {
        if let Some(pending) = self.inductive_value.take() {
            self.value = pending;
        }
    }

    pub fn reject_inductive_value(&mut self) {
        self.inductive_value = None;
    }

    /// Same name and committed value. Pending changes are ignored.
    pub fn is_equivalent_to(&self, other: &DecisionVariable) -> bool {
        self.name == other.name && self.value == other.value
    }

    fn clamp(&self, value: f64) -> f64 {
        match self.bounds {
            Some((minimum, maximum)) => value.max(minimum).min(maximum),
            None => value,
        }
    }
}

/// Ordered collection of decision variables, looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionVariables {
    variables: Vec<DecisionVariable>,
}

impl DecisionVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `variable`, replacing any existing variable of the same name.
    pub fn add(&mut self, variable: DecisionVariable) {
        match self.index_of(variable.name()) {
            Some(index) => self.variables[index] = variable,
            None => self.variables.push(variable),
        }
    }

    pub fn with(mut self, variable: DecisionVariable) -> Self {
        self.add(variable);
        self
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&DecisionVariable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DecisionVariable> {
        self.variables.iter_mut().find(|v| v.name() == name)
    }

    pub fn at(&self, index: usize) -> Option<&DecisionVariable> {
        self.variables.get(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut DecisionVariable> {
        self.variables.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionVariable> {
        self.variables.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DecisionVariable> {
        self.variables.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name().to_string()).collect()
    }

    /// Committed values in declaration order.
    pub fn values(&self) -> Vec<f64> {
        self.variables.iter().map(DecisionVariable::value).collect()
    }

    pub fn accept_all(&mut self) {
        self.variables
            .iter_mut()
            .for_each(DecisionVariable::accept_inductive_value);
    }

    pub fn reject_all(&mut self) {
        self.variables
            .iter_mut()
            .for_each(DecisionVariable::reject_inductive_value);
    }

    pub fn is_equivalent_to(&self, other: &DecisionVariables) -> bool {
        self.len() == other.len()
            && self
                .variables
                .iter()
                .zip(other.variables.iter())
                .all(|(a, b)| a.is_equivalent_to(b))
    }
}
