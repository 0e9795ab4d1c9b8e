//! Background tile builders.
//!
//! Jobs go out over an unbounded channel so dispatch never blocks the scheduling thread;
//! finished tiles come back over a second channel drained once per tick.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use terra_noise::GridPosition;

use crate::{TileBuilder, TileData, TileError};

/// A request to build one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileJob {
    /// Grid cell to build.
    pub position: GridPosition,
    /// Samples per tile edge.
    pub resolution: u32,
}

/// The outcome of one job.
#[derive(Debug)]
pub struct TileResult {
    /// Grid cell the job was for.
    pub position: GridPosition,
    /// Built content or the failure.
    pub result: Result<TileData, TileError>,
    /// Build time in microseconds.
    pub build_time_us: u64,
}

fn run_job(builder: &dyn TileBuilder, job: TileJob) -> TileResult {
    let start = Instant::now();
    let result = builder.build(job.position, job.resolution);
    TileResult {
        position: job.position,
        result,
        build_time_us: start.elapsed().as_micros() as u64,
    }
}

/// A pool of tile builder threads.
///
/// With zero threads, jobs are built inline during [`TileWorkers::submit`] and their
/// results queued for the next drain, so callers see the same flow either way.
pub struct TileWorkers {
    builder: Arc<dyn TileBuilder>,
    job_sender: Option<Sender<TileJob>>,
    result_sender: Sender<TileResult>,
    result_receiver: Receiver<TileResult>,
    handles: Vec<JoinHandle<()>>,
}

impl TileWorkers {
    /// Starts `thread_count` workers sharing `builder`.
    pub fn new(builder: Arc<dyn TileBuilder>, thread_count: usize) -> Self {
        let (result_sender, result_receiver) = unbounded::<TileResult>();

        let (job_sender, handles) = if thread_count == 0 {
            (None, Vec::new())
        } else {
            let (job_sender, job_receiver) = unbounded::<TileJob>();
            let handles = (0..thread_count)
                .map(|_| {
                    let receiver = job_receiver.clone();
                    let sender = result_sender.clone();
                    let builder = Arc::clone(&builder);
                    std::thread::Builder::new()
                        .name("tile-gen-worker".into())
                        .spawn(move || {
                            while let Ok(job) = receiver.recv() {
                                if sender.send(run_job(builder.as_ref(), job)).is_err() {
                                    break;
                                }
                            }
                        })
                        .expect("failed to spawn tile generation worker thread")
                })
                .collect();
            (Some(job_sender), handles)
        };

        tracing::debug!(threads = thread_count, "started tile workers");
        Self {
            builder,
            job_sender,
            result_sender,
            result_receiver,
            handles,
        }
    }

    /// Number of worker threads; 0 means inline building.
    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Queues a job without blocking.
    pub fn submit(&self, job: TileJob) -> Result<(), TileError> {
        match &self.job_sender {
            Some(sender) => sender.send(job).map_err(|_| TileError::WorkersStopped),
            None => self
                .result_sender
                .send(run_job(self.builder.as_ref(), job))
                .map_err(|_| TileError::WorkersStopped),
        }
    }

    /// Collects every finished result without blocking.
    pub fn drain(&self) -> Vec<TileResult> {
        self.result_receiver.try_iter().collect()
    }
}

impl Drop for TileWorkers {
    fn drop(&mut self) {
        // Closing the job channel ends each worker's receive loop.
        self.job_sender.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("tile worker panicked");
            }
        }
    }
}
