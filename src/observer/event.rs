use serde::Serialize;
use std::fmt;

pub const MAXIMUM_ITERATIONS: &str = "MaximumIterations";
pub const CURRENT_ITERATION: &str = "CurrentIteration";
pub const OBJECTIVE_VALUE: &str = "ObjectiveValue";
pub const TEMPERATURE: &str = "Temperature";
pub const COOLING_FACTOR: &str = "CoolingFactor";
pub const CHANGE_IN_OBJECTIVE_VALUE: &str = "ChangeInObjectiveValue";
pub const CHANGE_IS_DESIRABLE: &str = "ChangeIsDesirable";
pub const ACCEPTANCE_PROBABILITY: &str = "AcceptanceProbability";
pub const CHANGE_ACCEPTED: &str = "ChangeAccepted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventType {
    StartedAnnealing,
    StartedIteration,
    FinishedIteration,
    FinishedAnnealing,
    Note,
}

impl EventType {
    /// True for `StartedIteration` and `FinishedIteration`.
    pub fn is_iteration(self) -> bool {
        matches!(self, EventType::StartedIteration | EventType::FinishedIteration)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::StartedAnnealing => "StartedAnnealing",
            EventType::StartedIteration => "StartedIteration",
            EventType::FinishedIteration => "FinishedIteration",
            EventType::FinishedAnnealing => "FinishedAnnealing",
            EventType::Note => "Note",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    U64(u64),
    F64(f64),
    Bool(bool),
    Str(String),
    F64List(Vec<f64>),
}

impl AttributeValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttributeValue::U64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::F64(value) => Some(*value),
            AttributeValue::U64(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::U64(value) => write!(f, "{value}"),
            AttributeValue::F64(value) => write!(f, "{value}"),
            AttributeValue::Bool(value) => write!(f, "{value}"),
            AttributeValue::Str(value) => f.write_str(value),
            AttributeValue::F64List(values) => write!(f, "{values:?}"),
        }
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::U64(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::F64(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(value: Vec<f64>) -> Self {
        AttributeValue::F64List(value)
    }
}

/// Something that happened to an annealer, with its attributes in
/// insertion order. Immutable once published.
///
/// # Examples
///
/// ```
/// use u_anneal::observer::{Event, EventType};
///
/// let event = Event::new(EventType::StartedIteration, "run")
///     .with_attribute("CurrentIteration", 3u64);
///
/// assert_eq!(event.u64_attribute("CurrentIteration"), Some(3));
/// assert_eq!(event.source(), "run");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    event_type: EventType,
    source: String,
    attributes: Vec<(&'static str, AttributeValue)>,
    note: Option<String>,
}

impl Event {
    pub fn new(event_type: EventType, source: impl Into<String>) -> Self {
        Self {
            event_type,
            source: source.into(),
            attributes: Vec::new(),
            note: None,
        }
    }

    /// A free-text `Note` event.
    pub fn note(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            note: Some(text.into()),
            ..Self::new(EventType::Note, source)
        }
    }

    pub fn with_attribute(mut self, name: &'static str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    pub fn with_attributes<I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, AttributeValue)>,
    {
        self.attributes.extend(attributes);
        self
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Id of the annealer that raised the event.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn note_text(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn attributes(&self) -> &[(&'static str, AttributeValue)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn u64_attribute(&self, name: &str) -> Option<u64> {
        self.attribute(name).and_then(AttributeValue::as_u64)
    }

    pub fn f64_attribute(&self, name: &str) -> Option<f64> {
        self.attribute(name).and_then(AttributeValue::as_f64)
    }

    pub fn bool_attribute(&self, name: &str) -> Option<bool> {
        self.attribute(name).and_then(AttributeValue::as_bool)
    }
}
