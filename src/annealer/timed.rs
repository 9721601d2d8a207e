use super::{Annealer, AnnealerState, SimpleAnnealer};
use crate::error::Result;
use crate::explorer::Explorer;
use crate::observer::{Event, Observer};
use crate::solution::Solution;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wraps a [`SimpleAnnealer`] and, once annealing succeeds, publishes a
/// `Note` event reading `Total elapsed time of annealing = [<duration>]`.
#[derive(Clone, Default)]
pub struct ElapsedTimeTrackingAnnealer {
    inner: SimpleAnnealer,
    elapsed: Option<Duration>,
}

impl ElapsedTimeTrackingAnnealer {
    pub fn new(inner: SimpleAnnealer) -> Self {
        Self {
            inner,
            elapsed: None,
        }
    }

    /// Wall-clock time of the last `anneal`, when it succeeded.
    pub fn elapsed_time(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn inner(&self) -> &SimpleAnnealer {
        &self.inner
    }
}

impl Annealer for ElapsedTimeTrackingAnnealer {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn set_id(&mut self, id: &str) {
        self.inner.set_id(id);
    }

    fn state(&self) -> AnnealerState {
        self.inner.state()
    }

    fn temperature(&self) -> f64 {
        self.inner.temperature()
    }

    fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        self.inner.set_temperature(temperature)
    }

    fn cooling_factor(&self) -> f64 {
        self.inner.cooling_factor()
    }

    fn maximum_iterations(&self) -> u64 {
        self.inner.maximum_iterations()
    }

    fn current_iteration(&self) -> u64 {
        self.inner.current_iteration()
    }

    fn explorer(&self) -> &dyn Explorer {
        self.inner.explorer()
    }

    fn add_observer(&mut self, observer: Arc<dyn Observer>) {
        self.inner.add_observer(observer);
    }

    fn observers(&self) -> &[Arc<dyn Observer>] {
        self.inner.observers()
    }

    fn anneal(&mut self) -> Result<Solution> {
        let start = Instant::now();
        let solution = self.inner.anneal()?;
        let elapsed = start.elapsed();
        self.elapsed = Some(elapsed);

        let note = Event::note(
            self.inner.id(),
            format!("Total elapsed time of annealing = [{elapsed:?}]"),
        );
        self.inner.publish(note)?;
        self.inner.flush()?;
        Ok(solution)
    }

    fn solution(&self) -> Option<&Solution> {
        self.inner.solution()
    }

    fn clone_annealer(&self) -> Box<dyn Annealer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::observer::EventType;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Notes {
        texts: Mutex<Vec<String>>,
        last: Mutex<Option<EventType>>,
    }

    impl Observer for Notes {
        fn observe_event(&self, event: &Event) -> Result<()> {
            if let Some(text) = event.note_text() {
                self.texts.lock().unwrap().push(text.to_string());
            }
            *self.last.lock().unwrap() = Some(event.event_type());
            Ok(())
        }
    }

    #[test]
    fn test_note_follows_finished_annealing() {
        let notes = Arc::new(Notes::default());
        let inner = SimpleAnnealer::new()
            .with_maximum_iterations(5)
            .with_observer(notes.clone());
        let mut annealer = ElapsedTimeTrackingAnnealer::new(inner);
        annealer.anneal().unwrap();

        let texts = notes.texts.lock().unwrap();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("Total elapsed time of annealing = ["));
        assert_eq!(*notes.last.lock().unwrap(), Some(EventType::Note));
        assert!(annealer.elapsed_time().is_some());
        assert_eq!(annealer.current_iteration(), 5);
    }

    #[test]
    fn test_failure_skips_note() {
        let notes = Arc::new(Notes::default());
        let mut annealer =
            ElapsedTimeTrackingAnnealer::new(SimpleAnnealer::new().with_observer(notes.clone()));
        annealer.anneal().unwrap();
        notes.texts.lock().unwrap().clear();

        assert!(matches!(annealer.anneal(), Err(Error::InvalidState { .. })));
        assert!(notes.texts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delegates_identity() {
        let mut annealer = ElapsedTimeTrackingAnnealer::default();
        annealer.set_id("timed");
        assert_eq!(annealer.id(), "timed");
        assert_eq!(annealer.explorer().id(), "timed");
        assert_eq!(annealer.inner().id(), "timed");
    }
}
