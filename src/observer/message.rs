use super::{
    Event, EventType, Filter, Modulator, NullFilter, NullModulator, Observer, ANNEALER_LOG_TARGET,
};
use crate::error::Result;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Mutex, PoisonError};
use tracing::{info, Level};

/// One modulator per event source, each started from `prototype`.
struct SourceModulators {
    prototype: Box<dyn Modulator>,
    by_source: HashMap<String, Box<dyn Modulator>>,
}

impl SourceModulators {
    fn new(prototype: Box<dyn Modulator>) -> Self {
        Self {
            prototype,
            by_source: HashMap::new(),
        }
    }

    fn should_modulate(&mut self, event: &Event) -> bool {
        let source = event.source();
        if !self.by_source.contains_key(source) {
            self.by_source
                .insert(source.to_string(), self.prototype.fresh());
        }
        let modulated = self
            .by_source
            .get_mut(source)
            .is_some_and(|modulator| modulator.should_modulate(event));
        if event.event_type() == EventType::FinishedAnnealing {
            self.by_source.remove(source);
        }
        modulated
    }
}

/// Renders events as free-text lines on the `annealer` target.
///
/// ```text
/// Id [run (1/3)], Event [FinishedIteration]: CurrentIteration [12], ObjectiveValue [998], ...
/// ```
///
/// Modulator state is kept per source id, so concurrent runs sharing the
/// observer throttle independently.
pub struct MessageObserver {
    filter: Box<dyn Filter>,
    modulators: Mutex<SourceModulators>,
}

impl MessageObserver {
    pub fn new() -> Self {
        Self {
            filter: Box::new(NullFilter),
            modulators: Mutex::new(SourceModulators::new(Box::new(NullModulator))),
        }
    }

    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_modulator(self, modulator: impl Modulator + 'static) -> Self {
        self.with_boxed_modulator(Box::new(modulator))
    }

    pub fn with_boxed_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_boxed_modulator(self, modulator: Box<dyn Modulator>) -> Self {
        Self {
            modulators: Mutex::new(SourceModulators::new(modulator)),
            ..self
        }
    }

    /// The line this observer would log for `event`.
    pub fn render(event: &Event) -> String {
        let mut line = format!("Id [{}], Event [{}]: ", event.source(), event.event_type());
        if event.event_type() == EventType::Note {
            let _ = write!(line, "[{}]", event.note_text().unwrap_or_default());
            return line;
        }
        for (index, (name, value)) in event.attributes().iter().enumerate() {
            if index > 0 {
                line.push_str(", ");
            }
            let _ = write!(line, "{name} [{value}]");
        }
        line
    }

    fn suppressed(&self, event: &Event) -> bool {
        if self.filter.should_filter(event) {
            return true;
        }
        self.modulators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_modulate(event)
    }
}

impl Default for MessageObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MessageObserver {
    fn observe_event(&self, event: &Event) -> Result<()> {
        if !tracing::enabled!(target: ANNEALER_LOG_TARGET, Level::INFO) || self.suppressed(event) {
            return Ok(());
        }
        info!(target: ANNEALER_LOG_TARGET, "{}", Self::render(event));
        Ok(())
    }
}

/// Emits each event as structured tracing fields, attributes as JSON.
pub struct AttributeObserver {
    filter: Box<dyn Filter>,
}

impl AttributeObserver {
    pub fn new() -> Self {
        Self {
            filter: Box::new(NullFilter),
        }
    }

    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_boxed_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Attributes of `event` as a JSON object.
    pub fn attributes_json(event: &Event) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in event.attributes() {
            let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
            map.insert((*name).to_string(), value);
        }
        if let Some(note) = event.note_text() {
            map.insert("Note".to_string(), serde_json::Value::from(note));
        }
        serde_json::Value::Object(map)
    }
}

impl Default for AttributeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for AttributeObserver {
    fn observe_event(&self, event: &Event) -> Result<()> {
        if !tracing::enabled!(target: ANNEALER_LOG_TARGET, Level::INFO)
            || self.filter.should_filter(event)
        {
            return Ok(());
        }
        info!(
            target: ANNEALER_LOG_TARGET,
            id = event.source(),
            event = %event.event_type(),
            attributes = %Self::attributes_json(event),
        );
        Ok(())
    }
}
