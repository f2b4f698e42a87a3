//! The editor session.
//!
//! An [`EditorSession`] owns everything the editor knows about the image
//! being edited: the immutable original, the current edited image, the
//! parameter set that produced it, the display area and the last display
//! frame. A GUI drives it with parameter changes, resize events, import and
//! export requests, and reads back the display frame.
//!
//! Parameter changes recompute the edited image from the original. Changes
//! that select a heavy effect are recomputed on a background worker when one
//! is available; [`EditorSession::poll`] installs the result once it arrives,
//! provided the parameters have not changed again in the meantime.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::decode::{open, Image};
use crate::display::{fit, fit_geometry, DisplayFrame};
use crate::encode::export;
use crate::error::EditError;
use crate::filters::TransformError;
use crate::params::{ParameterChange, ParameterSet};
use crate::pipeline::Pipeline;
use crate::worker::{Completion, Job, RecomputeWorker};

/// What happened to a parameter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeStatus {
    /// The edited image was recomputed and is current.
    Applied,
    /// The recompute runs in the background; poll for the result.
    Pending { generation: u64 },
}

/// State of one editing session.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    pipeline: Pipeline,
    worker: Option<RecomputeWorker>,

    original: Option<Arc<Image>>,
    edited: Option<Image>,
    aspect_ratio: Option<f64>,

    /// Parameters most recently requested.
    params: ParameterSet,
    /// Parameters that produced `edited`.
    applied: ParameterSet,
    generation: u64,
    pending: Option<u64>,

    display_area: Option<(u32, u32)>,
    frame: Option<DisplayFrame>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Create a session with the built-in filters configured by `config`.
    pub fn new(config: EditorConfig) -> Self {
        let pipeline = Pipeline::from_config(&config);
        Self::with_pipeline(config, pipeline)
    }

    /// Create a session around a custom pipeline.
    ///
    /// A worker thread is started if `config.worker.enabled`; if the thread
    /// cannot be spawned, heavy effects are computed inline.
    pub fn with_pipeline(config: EditorConfig, pipeline: Pipeline) -> Self {
        let worker = if config.worker.enabled {
            match RecomputeWorker::spawn(pipeline.clone()) {
                Ok(worker) => Some(worker),
                Err(e) => {
                    warn!(error = %e, "Could not start recompute worker, heavy effects run inline");
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            pipeline,
            worker,
            original: None,
            edited: None,
            aspect_ratio: None,
            params: ParameterSet::default(),
            applied: ParameterSet::default(),
            generation: 0,
            pending: None,
            display_area: None,
            frame: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn original(&self) -> Option<&Image> {
        self.original.as_deref()
    }

    pub fn edited(&self) -> Option<&Image> {
        self.edited.as_ref()
    }

    /// The most recent display frame, if an image is loaded and the display
    /// area is known.
    pub fn display_frame(&self) -> Option<&DisplayFrame> {
        self.frame.as_ref()
    }

    /// Aspect ratio of the original image, computed once at import.
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio
    }

    /// The parameters most recently requested.
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// The parameters the current edited image was computed with.
    pub fn applied_parameters(&self) -> &ParameterSet {
        &self.applied
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A background recompute for the current parameters is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Load `path` as the new original.
    ///
    /// Parameters are reset to their defaults and the edited image starts as
    /// a copy of the original. On failure the session is left unchanged.
    pub fn import(&mut self, path: &Path) -> Result<(), EditError> {
        let image = open(path)?;
        self.install_original(image)
    }

    /// Use an already decoded image as the new original.
    pub fn load_image(&mut self, image: Image) -> Result<(), EditError> {
        self.install_original(image)
    }

    fn install_original(&mut self, image: Image) -> Result<(), EditError> {
        if image.is_empty() {
            return Err(EditError::invalid(format!(
                "cannot edit an empty {}x{} image",
                image.width, image.height
            )));
        }
        if !image.has_consistent_buffer() {
            return Err(TransformError::InvalidDimensions {
                width: image.width,
                height: image.height,
            }
            .into());
        }

        info!(
            width = image.width,
            height = image.height,
            format = %image.format,
            "Loaded original image"
        );

        self.aspect_ratio = Some(image.aspect_ratio());
        self.edited = Some(image.clone());
        self.original = Some(Arc::new(image));
        self.params = ParameterSet::default();
        self.applied = ParameterSet::default();
        // Invalidates anything still running for the previous image
        self.generation += 1;
        self.pending = None;
        self.refresh_display()
    }

    /// Apply one parameter change and recompute.
    pub fn apply_change(&mut self, change: ParameterChange) -> Result<RecomputeStatus, EditError> {
        self.apply_changes(&[change])
    }

    /// Apply several changes at once with a single recompute.
    ///
    /// The combined parameter set is validated before anything changes; if
    /// it is rejected, the previous parameters and edited image stay in
    /// effect.
    pub fn apply_changes(
        &mut self,
        changes: &[ParameterChange],
    ) -> Result<RecomputeStatus, EditError> {
        let original = self.original.clone().ok_or(EditError::NoImage)?;

        let candidate = changes
            .iter()
            .fold(self.params, |params, change| params.with_change(*change));
        candidate.validate_for(original.width, original.height)?;

        self.params = candidate;
        self.generation += 1;

        if candidate.has_heavy_effect() {
            if let Some(worker) = &self.worker {
                let job = Job {
                    generation: self.generation,
                    fingerprint: candidate.fingerprint(),
                    original: Arc::clone(&original),
                    params: candidate,
                };
                if worker.submit(job) {
                    self.pending = Some(self.generation);
                    return Ok(RecomputeStatus::Pending {
                        generation: self.generation,
                    });
                }
                warn!("Recompute worker unavailable, recomputing inline");
            }
        }

        self.pending = None;
        let result = self.pipeline.recompute(&original, &candidate);
        self.install(candidate, result)?;
        Ok(RecomputeStatus::Applied)
    }

    /// Install finished background recomputes.
    ///
    /// Only a completion for the latest generation whose fingerprint matches
    /// the current parameters is used; older ones are discarded. Returns
    /// `true` if the edited image changed.
    pub fn poll(&mut self) -> Result<bool, EditError> {
        let completions = match &self.worker {
            Some(worker) => worker.try_completions(),
            None => return Ok(false),
        };

        let mut installed = false;
        for completion in completions {
            installed |= self.accept(completion)?;
        }
        Ok(installed)
    }

    /// Block until the outstanding background recompute finishes, or
    /// `timeout` passes. Returns `true` if the edited image changed.
    pub fn wait(&mut self, timeout: Duration) -> Result<bool, EditError> {
        let deadline = Instant::now() + timeout;

        while self.pending.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let completion = match &self.worker {
                Some(worker) => worker.wait(remaining),
                None => None,
            };
            match completion {
                Some(completion) => {
                    if self.accept(completion)? {
                        return Ok(true);
                    }
                }
                None => break,
            }
        }
        Ok(false)
    }

    fn accept(&mut self, completion: Completion) -> Result<bool, EditError> {
        let current = self.pending == Some(completion.generation)
            && completion.fingerprint == self.params.fingerprint();

        if !current {
            debug!(
                generation = completion.generation,
                latest = self.generation,
                "Discarding stale recompute"
            );
            return Ok(false);
        }

        self.pending = None;
        self.install(self.params, completion.result)?;
        Ok(true)
    }

    /// Install a recompute result, rolling the parameters back on failure.
    fn install(
        &mut self,
        params: ParameterSet,
        result: Result<Image, EditError>,
    ) -> Result<(), EditError> {
        match result {
            Ok(image) => {
                self.edited = Some(image);
                self.applied = params;
                self.refresh_display()
            }
            Err(e) => {
                warn!(error = %e, "Recompute failed, keeping previous image");
                self.params = self.applied;
                Err(e)
            }
        }
    }

    /// Set the display area and refit the edited image to it.
    pub fn resize(&mut self, area_width: u32, area_height: u32) -> Result<(), EditError> {
        // Rejects an empty area even before an image is loaded
        fit_geometry(1, 1, area_width, area_height)?;

        self.display_area = Some((area_width, area_height));
        self.refresh_display()
    }

    fn refresh_display(&mut self) -> Result<(), EditError> {
        self.frame = match (&self.edited, self.display_area) {
            (Some(edited), Some((w, h))) => Some(fit(edited, w, h, self.config.display.filter)?),
            _ => None,
        };
        Ok(())
    }

    /// Write the edited image to `<directory>/<name>.<extension>`.
    pub fn export(
        &self,
        name: &str,
        extension: &str,
        directory: &Path,
    ) -> Result<PathBuf, EditError> {
        let edited = self.edited.as_ref().ok_or(EditError::NoImage)?;
        Ok(export(edited, directory, name, extension, &self.config.export)?)
    }

    /// Drop the current image and return to the empty state.
    ///
    /// The display area and the worker are kept for the next import.
    pub fn close(&mut self) {
        info!("Closing image");
        self.original = None;
        self.edited = None;
        self.aspect_ratio = None;
        self.frame = None;
        self.params = ParameterSet::default();
        self.applied = ParameterSet::default();
        self.generation += 1;
        self.pending = None;
    }
}
