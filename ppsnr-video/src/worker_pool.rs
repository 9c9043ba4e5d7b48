//! Fixed-size worker pool for frame-parallel PSNR scoring
//!
//! A single producer submits frames in index order through a bounded
//! channel; W long-lived workers score them and store each result into the
//! slot of its own frame index. Slots are partitioned by index, so results
//! need no lock and come out in frame order whatever the completion order.

use crate::error::{PsnrError, Result};
use crate::psnr;
use crate::types::LumaBuffer;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Marks a slot no worker has written. A NaN pattern, which PSNR never yields.
const EMPTY_SLOT: u64 = u64::MAX;

/// Scoring function run by every worker
pub type Scorer = Arc<dyn Fn(&[u8], &[u8]) -> Result<f64> + Send + Sync>;

/// Worker count matching the available processing units, at least 1
pub fn default_worker_count() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Lifecycle of a [`PsnrWorkerPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Submissions allowed
    Accepting,
    /// Intake closed, workers finishing queued frames
    Draining,
    /// Workers joined, results readable
    Finalized,
}

struct FrameTask {
    frame: usize,
    reference: LumaBuffer,
    candidate: LumaBuffer,
}

/// Pre-sized, index-partitioned result storage
struct ResultSlots {
    slots: Box<[AtomicU64]>,
}

impl ResultSlots {
    fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicU64::new(EMPTY_SLOT)).collect(),
        }
    }

    fn store(&self, frame: usize, value: f64) {
        // Joining the workers orders this write before any read
        self.slots[frame].store(value.to_bits(), Ordering::Relaxed);
    }

    fn take(&self) -> Result<Vec<f64>> {
        self.slots
            .iter()
            .enumerate()
            .map(|(frame, slot)| match slot.load(Ordering::Relaxed) {
                EMPTY_SLOT => Err(PsnrError::MissingResult(frame)),
                bits => Ok(f64::from_bits(bits)),
            })
            .collect()
    }
}

/// Scores frames on a fixed pool of worker threads
pub struct PsnrWorkerPool {
    tx: Option<Sender<FrameTask>>,
    workers: Vec<JoinHandle<usize>>,
    slots: Arc<ResultSlots>,
    failures: Arc<Mutex<Vec<PsnrError>>>,
    submitted: Vec<bool>,
    state: PoolState,
}

impl PsnrWorkerPool {
    /// Create a pool of `workers` threads with room for `frame_count` results
    pub fn new(frame_count: usize, workers: usize) -> Result<Self> {
        Self::with_scorer(frame_count, workers, Arc::new(psnr::psnr))
    }

    /// Create a pool whose workers run `scorer` instead of [`psnr::psnr`]
    pub fn with_scorer(frame_count: usize, workers: usize, scorer: Scorer) -> Result<Self> {
        let workers = workers.max(1);
        let (tx, rx) = channel::bounded(workers);
        let slots = Arc::new(ResultSlots::new(frame_count));
        let failures = Arc::new(Mutex::new(Vec::new()));

        let mut pool = PsnrWorkerPool {
            tx: Some(tx),
            workers: Vec::with_capacity(workers),
            slots,
            failures,
            submitted: vec![false; frame_count],
            state: PoolState::Accepting,
        };

        for id in 0..workers {
            let handle = Self::spawn_worker(
                id,
                rx.clone(),
                pool.slots.clone(),
                pool.failures.clone(),
                scorer.clone(),
            )?;
            pool.workers.push(handle);
        }

        log::debug!("Started {} PSNR workers for {} frames", workers, frame_count);

        Ok(pool)
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn frame_count(&self) -> usize {
        self.submitted.len()
    }

    /// Queue one frame for scoring
    ///
    /// Blocks while the queue is full. Each frame index may be submitted once.
    pub fn submit(
        &mut self,
        frame: usize,
        reference: LumaBuffer,
        candidate: LumaBuffer,
    ) -> Result<()> {
        let tx = match (&self.tx, self.state) {
            (Some(tx), PoolState::Accepting) => tx,
            _ => return Err(PsnrError::IntakeClosed),
        };

        let frame_count = self.submitted.len();
        let seen = self
            .submitted
            .get_mut(frame)
            .ok_or(PsnrError::FrameOutOfRange { frame, frame_count })?;
        if *seen {
            return Err(PsnrError::DuplicateFrame(frame));
        }

        tx.send(FrameTask {
            frame,
            reference,
            candidate,
        })
        .map_err(|_| PsnrError::IntakeClosed)?;
        *seen = true;

        log::trace!("Submitted frame {}", frame);
        Ok(())
    }

    /// Stop accepting work; queued frames are still scored
    pub fn close_intake(&mut self) {
        if self.tx.take().is_some() {
            self.state = PoolState::Draining;
        }
    }

    /// Close intake, wait for every worker and return the ordered results
    pub fn finalize(mut self) -> Result<PsnrResults> {
        self.close_intake();

        let mut tasks_per_worker = Vec::with_capacity(self.workers.len());
        let mut panicked = None;
        for (id, handle) in self.workers.drain(..).enumerate() {
            match handle.join() {
                Ok(completed) => tasks_per_worker.push(completed),
                Err(_) => {
                    tasks_per_worker.push(0);
                    panicked.get_or_insert(id);
                }
            }
        }
        self.state = PoolState::Finalized;

        if let Some(id) = panicked {
            return Err(PsnrError::WorkerPanicked(id));
        }

        let mut failures = std::mem::take(&mut *self.failures.lock());
        if !failures.is_empty() {
            failures.sort_by_key(|e| match e {
                PsnrError::Scoring { frame, .. } => *frame,
                _ => usize::MAX,
            });
            return Err(failures.swap_remove(0));
        }

        let values = self.slots.take()?;
        log::info!(
            "Scored {} frames on {} workers",
            values.len(),
            tasks_per_worker.len()
        );

        Ok(PsnrResults {
            values,
            stats: PoolStats { tasks_per_worker },
        })
    }

    fn spawn_worker(
        id: usize,
        rx: Receiver<FrameTask>,
        slots: Arc<ResultSlots>,
        failures: Arc<Mutex<Vec<PsnrError>>>,
        scorer: Scorer,
    ) -> Result<JoinHandle<usize>> {
        let handle = thread::Builder::new()
            .name(format!("ppsnr-worker-{}", id))
            .spawn(move || {
                let mut completed = 0;

                // Ends once intake is closed and the queue is empty
                for task in rx.iter() {
                    match scorer(&task.reference, &task.candidate) {
                        Ok(value) => slots.store(task.frame, value),
                        Err(e) => failures.lock().push(PsnrError::Scoring {
                            frame: task.frame,
                            reason: e.to_string(),
                        }),
                    }
                    completed += 1;
                }

                log::debug!("Worker {} exiting after {} frames", id, completed);
                completed
            })?;

        Ok(handle)
    }
}

impl Drop for PsnrWorkerPool {
    fn drop(&mut self) {
        self.close_intake();

        for handle in self.workers.drain(..) {
            handle.join().ok();
        }
    }
}

/// Ordered PSNR values plus worker diagnostics
#[derive(Debug, Clone)]
pub struct PsnrResults {
    pub values: Vec<f64>,
    pub stats: PoolStats,
}

/// Which share of the frames each worker executed
///
/// Informational only; the assignment of frames to workers is not stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub tasks_per_worker: Vec<usize>,
}

impl PoolStats {
    pub fn total_tasks(&self) -> usize {
        self.tasks_per_worker.iter().sum()
    }
}
