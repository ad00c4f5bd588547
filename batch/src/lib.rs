//! Failure-isolated parallel jobs
//!
//! Runs many independent units of work (one deviation comparison per base vector,
//! one fingerprint per strategy) on a rayon pool. Results come back in job-id order
//! whatever order the jobs finished in.
//!
//! ```rust
//! use batch::{ParallelRunner, simple_progress_reporter};
//!
//! let results = ParallelRunner::new(100, |job_id| {
//!     if job_id == 13 {
//!         return Err(format!("no data for job {}", job_id));
//!     }
//!     Ok(job_id as f64 / 100.0)
//! })
//! .progress(simple_progress_reporter(25))
//! .num_threads(4)
//! .run();
//!
//! assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
//! ```
//!
//! A job returning `Err(e)` becomes `JobError::Failed` and a job that panics becomes
//! `JobError::Panicked`. Sibling jobs are unaffected; nothing is retried.
//!
//! Jobs that seed their RNGs from the job id give the same results for any thread
//! count. `run()` keeps every result in memory until the end; `run_batched()` hands
//! them to a sink batch by batch instead.

use rayon::prelude::*;
use std::any::Any;
use std::fmt::Display;
use std::ops::{ControlFlow, Range};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Why a single job produced no result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("job failed: {0}")]
    Failed(String),
    #[error("job panicked: {0}")]
    Panicked(String),
}

type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Builder for a parallel run of `num_jobs` calls to `job(job_id)`
///
/// ```rust
/// use batch::ParallelRunner;
///
/// let results = ParallelRunner::new(50, |job_id| Ok::<usize, String>(job_id * 2))
///     .num_threads(2)
///     .run();
///
/// assert_eq!(results[7], Ok(14));
/// ```
pub struct ParallelRunner<F> {
    num_jobs: usize,
    job: F,
    num_threads: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl<F, S, E> ParallelRunner<F>
where
    F: Fn(usize) -> Result<S, E> + Send + Sync,
    S: Send,
    E: Display,
{
    pub fn new(num_jobs: usize, job: F) -> Self {
        ParallelRunner {
            num_jobs,
            job,
            num_threads: None,
            progress_callback: None,
        }
    }

    /// Use a dedicated pool of `n` threads instead of the global one
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Set progress callback (called after each job completes)
    ///
    /// The callback receives `(completed_count, total_count)`.
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Execute all jobs and return results in job-id order
    pub fn run(self) -> Vec<Result<S, JobError>> {
        let counter = AtomicUsize::new(0);
        match self.build_pool() {
            Some(pool) => pool.install(|| self.execute(0..self.num_jobs, &counter)),
            None => self.execute(0..self.num_jobs, &counter),
        }
    }

    /// Execute jobs in sequential batches, streaming results to `sink`
    ///
    /// Jobs inside a batch run in parallel. After each batch completes, `sink` is
    /// called on the calling thread once per job, in job-id order. This makes the
    /// sink the single writer for any shared output such as an append-mode CSV file.
    ///
    /// A sink returning `ControlFlow::Break` ends the run: no further results are
    /// handed over and no further batch is started. Returns the number of results
    /// the sink received.
    ///
    /// # Example
    ///
    /// ```rust
    /// use batch::ParallelRunner;
    /// use std::ops::ControlFlow;
    ///
    /// let mut seen = Vec::new();
    /// let delivered = ParallelRunner::new(25, |job_id| Ok::<usize, String>(job_id))
    ///     .run_batched(10, |job_id, result| {
    ///         seen.push((job_id, result.is_ok()));
    ///         ControlFlow::Continue(())
    ///     });
    ///
    /// assert_eq!(delivered, 25);
    /// assert_eq!(seen[24], (24, true));
    /// ```
    pub fn run_batched<K>(self, batch_size: usize, mut sink: K) -> usize
    where
        K: FnMut(usize, Result<S, JobError>) -> ControlFlow<()>,
    {
        let batch_size = batch_size.max(1);
        let counter = AtomicUsize::new(0);
        let pool = self.build_pool();
        let mut delivered = 0;

        for batch_start in (0..self.num_jobs).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(self.num_jobs);
            log::debug!("running jobs {}..{}", batch_start, batch_end);
            let results = match &pool {
                Some(pool) => pool.install(|| self.execute(batch_start..batch_end, &counter)),
                None => self.execute(batch_start..batch_end, &counter),
            };
            for (offset, result) in results.into_iter().enumerate() {
                delivered += 1;
                if sink(batch_start + offset, result).is_break() {
                    log::warn!(
                        "stopped after job {}; {} of {} jobs not run",
                        batch_start + offset,
                        self.num_jobs - batch_end,
                        self.num_jobs
                    );
                    return delivered;
                }
            }
        }
        delivered
    }

    fn build_pool(&self) -> Option<rayon::ThreadPool> {
        let n = self.num_threads?;
        match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("could not build a {}-thread pool, using the global pool: {}", n, e);
                None
            }
        }
    }

    fn execute(&self, ids: Range<usize>, counter: &AtomicUsize) -> Vec<Result<S, JobError>> {
        ids.into_par_iter()
            .map(|job_id| {
                let result = catch_unwind(AssertUnwindSafe(|| (self.job)(job_id)));

                let completed = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(ref callback) = self.progress_callback {
                    callback(completed, self.num_jobs);
                }

                match result {
                    Ok(Ok(output)) => Ok(output),
                    Ok(Err(e)) => Err(JobError::Failed(e.to_string())),
                    Err(panic) => Err(JobError::Panicked(panic_message(panic.as_ref()))),
                }
            })
            .collect()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Progress callback that logs every `interval` completions and the last one
pub fn simple_progress_reporter(interval: usize) -> impl Fn(usize, usize) + Send + Sync {
    let interval = interval.max(1);
    move |completed, total| {
        if completed % interval == 0 || completed == total {
            log::info!("completed {}/{} jobs", completed, total);
        }
    }
}
