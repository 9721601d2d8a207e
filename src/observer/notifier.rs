//! Event delivery to observers.

use super::{Event, EventType, Observer};
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use tracing::warn;

/// Default capacity of the asynchronous delivery queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Delivers an annealer's events to its observers.
///
/// Each observer sees one annealer's events in emission order. An error
/// returned by an observer is fatal for the run and surfaces from
/// [`notify`](EventNotifier::notify) or [`flush`](EventNotifier::flush).
pub trait EventNotifier: Send {
    fn add_observer(&mut self, observer: Arc<dyn Observer>);

    fn observers(&self) -> &[Arc<dyn Observer>];

    fn notify(&mut self, event: Event) -> Result<()>;

    /// Blocks until every published event has been observed.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// A notifier with the same observers and no pending deliveries.
    fn clone_notifier(&self) -> Box<dyn EventNotifier>;
}

impl Clone for Box<dyn EventNotifier> {
    fn clone(&self) -> Self {
        self.clone_notifier()
    }
}

/// Invokes observers in registration order on the caller's thread.
#[derive(Clone, Default)]
pub struct SynchronousNotifier {
    observers: Vec<Arc<dyn Observer>>,
}

impl SynchronousNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventNotifier for SynchronousNotifier {
    fn add_observer(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    fn observers(&self) -> &[Arc<dyn Observer>] {
        &self.observers
    }

    fn notify(&mut self, event: Event) -> Result<()> {
        for observer in &self.observers {
            observer.observe_event(&event)?;
        }
        Ok(())
    }

    fn clone_notifier(&self) -> Box<dyn EventNotifier> {
        Box::new(self.clone())
    }
}

struct DeliveryWorker {
    sender: Sender<Event>,
    handle: JoinHandle<()>,
}

/// Queues events for a dedicated delivery thread.
///
/// The queue is bounded: a producer blocks only while it is full. The
/// worker starts with the first event and is joined when
/// `FinishedAnnealing` is published, on [`flush`](EventNotifier::flush), or
/// on drop. After an observer fails, remaining events are discarded and the
/// failure is returned by the next `notify` or `flush`.
pub struct AsynchronousNotifier {
    observers: Vec<Arc<dyn Observer>>,
    capacity: usize,
    worker: Option<DeliveryWorker>,
    failure: Arc<Mutex<Option<Error>>>,
}

impl AsynchronousNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            observers: Vec::new(),
            capacity: capacity.max(1),
            worker: None,
            failure: Arc::new(Mutex::new(None)),
        }
    }

    fn take_failure(&self) -> Option<Error> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn start_worker(&mut self) -> Result<&DeliveryWorker> {
        if self.worker.is_none() {
            let (sender, receiver) = bounded::<Event>(self.capacity);
            let observers = self.observers.clone();
            let failure = Arc::clone(&self.failure);
            let handle = std::thread::Builder::new()
                .name("event-delivery".into())
                .spawn(move || {
                    for event in receiver {
                        if failure
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .is_some()
                        {
                            continue;
                        }
                        for observer in &observers {
                            if let Err(error) = observer.observe_event(&event) {
                                *failure.lock().unwrap_or_else(PoisonError::into_inner) =
                                    Some(error);
                                break;
                            }
                        }
                    }
                })
                .map_err(|error| Error::io("spawning event delivery thread", error))?;
            self.worker = Some(DeliveryWorker { sender, handle });
        }
        self.worker
            .as_ref()
            .ok_or_else(|| Error::Runner("event delivery thread unavailable".into()))
    }

    fn join_worker(&mut self) -> Result<()> {
        if let Some(DeliveryWorker { sender, handle }) = self.worker.take() {
            drop(sender);
            if handle.join().is_err() {
                return Err(Error::Fault("event observer panicked".into()));
            }
        }
        match self.take_failure() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for AsynchronousNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EventNotifier for AsynchronousNotifier {
    fn add_observer(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    fn observers(&self) -> &[Arc<dyn Observer>] {
        &self.observers
    }

    fn notify(&mut self, event: Event) -> Result<()> {
        if let Some(error) = self.take_failure() {
            let _ = self.join_worker();
            return Err(error);
        }
        let finished = event.event_type() == EventType::FinishedAnnealing;
        let worker = self.start_worker()?;
        if worker.sender.send(event).is_err() {
            return self.join_worker();
        }
        if finished {
            self.join_worker()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.join_worker()
    }

    fn clone_notifier(&self) -> Box<dyn EventNotifier> {
        let mut clone = AsynchronousNotifier::with_capacity(self.capacity);
        clone.observers = self.observers.clone();
        Box::new(clone)
    }
}

impl Drop for AsynchronousNotifier {
    fn drop(&mut self) {
        if let Err(error) = self.join_worker() {
            warn!(%error, "event delivery failed before notifier was dropped");
        }
    }
}
