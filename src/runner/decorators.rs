//! Runner decorators.
//!
//! - [`ProfilingRunner`] samples the CPU while the wrapped run executes and
//!   writes a pprof protobuf profile.
//! - [`ExclusiveRunner`] holds a lock for the whole run, so scenarios that
//!   touch a non-reentrant external resource never overlap.

use super::{CallableRunner, RunOutcome};
use crate::error::{Error, Result};
use pprof::protos::Message;
use pprof::{ProfilerGuardBuilder, Report};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info};

/// Samples per second taken by [`ProfilingRunner`].
pub const DEFAULT_SAMPLING_FREQUENCY: i32 = 1000;

const PROFILER_BLOCKLIST: [&str; 4] = ["libc", "libgcc", "pthread", "vdso"];

/// The sampling profiler is process-global; profiled runs take turns.
fn profiler_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// CPU-profiles a wrapped runner into a pprof protobuf file.
///
/// The profile is written whether or not the wrapped run succeeds; the
/// run's own error takes precedence over a failure to write it.
pub struct ProfilingRunner {
    base: Box<dyn CallableRunner>,
    profile_path: PathBuf,
    frequency: i32,
}

impl ProfilingRunner {
    pub fn new(base: Box<dyn CallableRunner>, profile_path: impl Into<PathBuf>) -> Self {
        Self {
            base,
            profile_path: profile_path.into(),
            frequency: DEFAULT_SAMPLING_FREQUENCY,
        }
    }

    /// Non-positive frequencies are ignored.
    pub fn with_frequency(mut self, frequency: i32) -> Self {
        if frequency > 0 {
            self.frequency = frequency;
        }
        self
    }

    pub fn profile_path(&self) -> &Path {
        &self.profile_path
    }

    pub fn frequency(&self) -> i32 {
        self.frequency
    }

    fn write_profile(&self, report: &Report) -> Result<()> {
        let profile = report.pprof()?;
        fs::write(&self.profile_path, profile.encode_to_vec()).map_err(|e| {
            Error::io(
                format!("writing profile file [{}]", self.profile_path.display()),
                e,
            )
        })
    }
}

impl CallableRunner for ProfilingRunner {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn run(&mut self) -> Result<Vec<RunOutcome>> {
        let path = self.profile_path.display().to_string();
        let _profiling = profiler_lock()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let guard = ProfilerGuardBuilder::default()
            .frequency(self.frequency)
            .blocklist(&PROFILER_BLOCKLIST)
            .build()?;
        info!("About to collect profiling data to file [{path}]");

        let result = self.base.run();

        let written = guard
            .report()
            .build()
            .map_err(Error::from)
            .and_then(|report| self.write_profile(&report));
        drop(guard);
        info!("Collection of profiling data to file [{path}] complete.");

        let outcomes = result?;
        written?;
        Ok(outcomes)
    }
}

fn process_lock() -> Arc<Mutex<()>> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    Arc::clone(LOCK.get_or_init(|| Arc::new(Mutex::new(()))))
}

/// Serialises wrapped runners on a shared lock.
///
/// The lock is released when the run returns or unwinds.
pub struct ExclusiveRunner {
    base: Box<dyn CallableRunner>,
    lock: Arc<Mutex<()>>,
}

impl ExclusiveRunner {
    /// Uses one process-wide lock.
    pub fn new(base: Box<dyn CallableRunner>) -> Self {
        Self::with_lock(base, process_lock())
    }

    pub fn with_lock(base: Box<dyn CallableRunner>, lock: Arc<Mutex<()>>) -> Self {
        Self { base, lock }
    }
}

impl CallableRunner for ExclusiveRunner {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn run(&mut self) -> Result<Vec<RunOutcome>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(scenario = self.base.name(), "acquired exclusive runner lock");
        let result = self.base.run();
        debug!(scenario = self.base.name(), "released exclusive runner lock");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::Solution;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct Fixed {
        runs: usize,
        fail: bool,
    }

    impl CallableRunner for Fixed {
        fn name(&self) -> &str {
            "Fixed"
        }

        fn run(&mut self) -> Result<Vec<RunOutcome>> {
            if self.fail {
                return Err(Error::Runner("fixed failure".into()));
            }
            Ok((0..self.runs)
                .map(|k| RunOutcome {
                    id: format!("Fixed ({k})"),
                    solution: Solution::new("Fixed"),
                    archive_summary: None,
                })
                .collect())
        }
    }

    struct Overlap {
        active: Arc<AtomicBool>,
        overlaps: Arc<AtomicUsize>,
    }

    impl CallableRunner for Overlap {
        fn name(&self) -> &str {
            "Overlap"
        }

        fn run(&mut self) -> Result<Vec<RunOutcome>> {
            if self.active.swap(true, Ordering::SeqCst) {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(5));
            self.active.store(false, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    // ---- Profiling ----

    fn read_profile(path: &Path) -> pprof::protos::Profile {
        let bytes = std::fs::read(path).unwrap();
        pprof::protos::Profile::decode(bytes.as_slice()).unwrap()
    }

    #[test]
    fn test_profile_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpu.pb");
        let mut runner = ProfilingRunner::new(Box::new(Fixed { runs: 3, fail: false }), &path)
            .with_frequency(0);
        assert_eq!(runner.frequency(), DEFAULT_SAMPLING_FREQUENCY);
        assert_eq!(runner.run().unwrap().len(), 3);

        let profile = read_profile(&path);
        assert!(!profile.sample_type.is_empty());
        assert!(!profile.string_table.is_empty());
    }

    #[test]
    fn test_profile_written_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpu.pb");
        let mut runner = ProfilingRunner::new(Box::new(Fixed { runs: 0, fail: true }), &path);
        assert!(matches!(runner.run(), Err(Error::Runner(_))));

        assert!(!read_profile(&path).sample_type.is_empty());
    }

    #[test]
    fn test_unwritable_profile_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cpu.pb");
        let mut runner = ProfilingRunner::new(Box::new(Fixed { runs: 1, fail: false }), path);
        assert!(matches!(runner.run(), Err(Error::Io { .. })));
    }

    // ---- Exclusive ----

    #[test]
    fn test_exclusive_runs_never_overlap() {
        let active = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let lock = Arc::new(Mutex::new(()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut runner = ExclusiveRunner::with_lock(
                    Box::new(Overlap {
                        active: Arc::clone(&active),
                        overlaps: Arc::clone(&overlaps),
                    }),
                    Arc::clone(&lock),
                );
                thread::spawn(move || runner.run())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exclusive_releases_after_error() {
        let lock = Arc::new(Mutex::new(()));
        let mut failing =
            ExclusiveRunner::with_lock(Box::new(Fixed { runs: 0, fail: true }), Arc::clone(&lock));
        assert!(failing.run().is_err());
        assert!(lock.try_lock().is_ok());
        assert_eq!(ExclusiveRunner::new(Box::new(Fixed { runs: 1, fail: false })).name(), "Fixed");
    }
}
