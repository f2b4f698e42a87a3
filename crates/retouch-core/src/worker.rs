//! Background recompute for heavy effects.
//!
//! Denoising and background removal can take long enough to stall an
//! interactive UI, so the session hands those recomputes to a single worker
//! thread. Jobs and results travel over `mpsc` channels. Every job carries
//! the generation and parameter fingerprint it was submitted with, and the
//! session discards any completion that no longer matches its current state.
//!
//! When several jobs queue up while one is running, only the newest is
//! computed. Dropping the worker raises a [`CancelFlag`] so a running denoise
//! stops at its next checkpoint instead of holding up the caller.

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::decode::Image;
use crate::error::EditError;
use crate::filters::CancelFlag;
use crate::params::{Fingerprint, ParameterSet};
use crate::pipeline::Pipeline;

/// A recompute request.
#[derive(Debug, Clone)]
pub struct Job {
    pub generation: u64,
    pub fingerprint: Fingerprint,
    pub original: Arc<Image>,
    pub params: ParameterSet,
}

/// The outcome of a [`Job`].
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub fingerprint: Fingerprint,
    pub result: Result<Image, EditError>,
}

/// Owns the recompute thread. Dropping it cancels the running job, closes
/// the job channel and joins the thread.
#[derive(Debug)]
pub struct RecomputeWorker {
    cancel: CancelFlag,
    jobs: Option<Sender<Job>>,
    completions: Receiver<Completion>,
    handle: Option<JoinHandle<()>>,
}

impl RecomputeWorker {
    /// Start a worker thread running `pipeline`.
    pub fn spawn(pipeline: Pipeline) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<Completion>();
        let cancel = CancelFlag::new();

        let flag = cancel.clone();
        let handle = thread::Builder::new()
            .name("retouch-recompute".into())
            .spawn(move || run(pipeline, flag, job_rx, done_tx))?;

        Ok(Self {
            cancel,
            jobs: Some(job_tx),
            completions: done_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job. Returns `false` if the worker thread has stopped.
    pub fn submit(&self, job: Job) -> bool {
        debug!(generation = job.generation, "Submitting recompute job");
        match &self.jobs {
            Some(jobs) => jobs.send(job).is_ok(),
            None => false,
        }
    }

    /// All completions that are ready, without blocking.
    pub fn try_completions(&self) -> Vec<Completion> {
        let mut ready = Vec::new();
        loop {
            match self.completions.try_recv() {
                Ok(completion) => ready.push(completion),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Recompute worker stopped unexpectedly");
                    break;
                }
            }
        }
        ready
    }

    /// Wait up to `timeout` for the next completion.
    pub fn wait(&self, timeout: Duration) -> Option<Completion> {
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for RecomputeWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
        // Closing the channel ends the thread's receive loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Recompute worker panicked");
            }
        }
    }
}

fn run(
    pipeline: Pipeline,
    cancel: CancelFlag,
    jobs: Receiver<Job>,
    completions: Sender<Completion>,
) {
    while let Ok(mut job) = jobs.recv() {
        if cancel.is_cancelled() {
            debug!(generation = job.generation, "Worker shutting down, job dropped");
            return;
        }
        while let Ok(next) = jobs.try_recv() {
            debug!(
                skipped = job.generation,
                newer = next.generation,
                "Skipping superseded job"
            );
            job = next;
        }

        let result = pipeline.recompute_cancellable(&job.original, &job.params, &cancel);
        let completion = Completion {
            generation: job.generation,
            fingerprint: job.fingerprint,
            result,
        };
        if completions.send(completion).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::decode::PixelFormat;
    use crate::filters::{EffectFilter, NonLocalMeans};
    use crate::params::ParameterChange;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn job(generation: u64, params: ParameterSet) -> Job {
        Job {
            generation,
            fingerprint: params.fingerprint(),
            original: Arc::new(Image::filled(8, 8, PixelFormat::Rgb8, &[50, 100, 150])),
            params,
        }
    }

    #[test]
    fn test_completes_job() {
        let worker = RecomputeWorker::spawn(Pipeline::default()).unwrap();
        let params = ParameterSet::new().with_change(ParameterChange::Invert(true));
        assert!(worker.submit(job(1, params)));

        let completion = worker.wait(TIMEOUT).unwrap();
        assert_eq!(completion.generation, 1);
        assert_eq!(completion.fingerprint, params.fingerprint());
        assert_eq!(completion.result.unwrap().pixel(0, 0), &[205, 155, 105]);
    }

    #[test]
    fn test_reports_errors() {
        let worker = RecomputeWorker::spawn(Pipeline::default()).unwrap();
        let params = ParameterSet::new().with_change(ParameterChange::Zoom(100.0));
        worker.submit(job(3, params));

        let completion = worker.wait(TIMEOUT).unwrap();
        assert!(matches!(
            completion.result,
            Err(EditError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_last_job_always_completes() {
        let worker = RecomputeWorker::spawn(Pipeline::default()).unwrap();
        let heavy = ParameterSet::new().with_change(ParameterChange::Effect(EffectFilter::Denoise));
        for generation in 1..=5 {
            worker.submit(job(generation, heavy));
        }

        // Earlier jobs may be skipped, but the newest is never dropped
        let mut last = 0;
        while last != 5 {
            let completion = worker.wait(TIMEOUT).expect("newest job never completed");
            assert!(completion.generation > last);
            last = completion.generation;
        }
    }

    #[test]
    fn test_try_completions_empty() {
        let worker = RecomputeWorker::spawn(Pipeline::default()).unwrap();
        assert!(worker.try_completions().is_empty());
    }

    #[test]
    fn test_drop_joins_thread() {
        let worker = RecomputeWorker::spawn(Pipeline::default()).unwrap();
        worker.submit(job(1, ParameterSet::new()));
        drop(worker);
    }

    #[test]
    fn test_drop_cancels_running_denoise() {
        // Thousands of search offsets over a 160x160 image: far longer than the
        // time allowed below unless cancellation stops it
        let slow = NonLocalMeans {
            search_window: 101,
            ..NonLocalMeans::default()
        };
        let worker = RecomputeWorker::spawn(Pipeline::new().with_denoiser(slow)).unwrap();
        let params = ParameterSet::new().with_change(ParameterChange::Effect(EffectFilter::Denoise));
        worker.submit(Job {
            generation: 1,
            fingerprint: params.fingerprint(),
            original: Arc::new(Image::filled(160, 160, PixelFormat::Rgb8, &[90, 120, 150])),
            params,
        });
        thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        drop(worker);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
