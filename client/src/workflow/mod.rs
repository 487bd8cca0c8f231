//! Prediction workflow: image selection, submission and result/error.
//!
//! The workflow is driven like a UI component. Every operation is a [`Msg`]
//! applied by [`Workflow::update`], and background work (preview rendering,
//! classifier requests) runs on spawned tasks that post their completion back
//! through the workflow's own channel. Only `update` touches the state, and
//! every transition replaces it with a new [`WorkflowState`] value.

mod handlers;

use std::sync::Arc;

use serde_json::Value;
use shared::ResolvedPrediction;
use strum_macros::{AsRefStr, Display};
use tokio::sync::mpsc;

use crate::api::Classifier;
use crate::error::{ClassifierError, ErrorInfo};
use crate::image::{ImageFile, ImageUpload, SelectedImage, render_preview};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Live,
    Simulated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    ImageSelected {
        image: SelectedImage,
    },
    Submitting {
        image: SelectedImage,
        generation: u64,
        mode: Mode,
    },
    Succeeded {
        image: SelectedImage,
        prediction: Box<ResolvedPrediction>,
    },
    Failed {
        image: SelectedImage,
        error: ErrorInfo,
    },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::ImageSelected { .. } => "ImageSelected",
            WorkflowState::Submitting { .. } => "Submitting",
            WorkflowState::Succeeded { .. } => "Succeeded",
            WorkflowState::Failed { .. } => "Failed",
        }
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        match self {
            WorkflowState::Idle => None,
            WorkflowState::ImageSelected { image }
            | WorkflowState::Submitting { image, .. }
            | WorkflowState::Succeeded { image, .. }
            | WorkflowState::Failed { image, .. } => Some(image),
        }
    }

    fn image_mut(&mut self) -> Option<&mut SelectedImage> {
        match self {
            WorkflowState::Idle => None,
            WorkflowState::ImageSelected { image }
            | WorkflowState::Submitting { image, .. }
            | WorkflowState::Succeeded { image, .. }
            | WorkflowState::Failed { image, .. } => Some(image),
        }
    }

    pub fn prediction(&self) -> Option<&ResolvedPrediction> {
        match self {
            WorkflowState::Succeeded { prediction, .. } => Some(prediction.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            WorkflowState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, WorkflowState::Submitting { .. })
    }
}

pub enum Msg {
    // Image operations
    SelectImage(Option<ImageFile>),
    PreviewReady { image_id: u64, preview: String },
    PreviewFailed { image_id: u64 },

    // Submission operations
    Submit,
    SubmissionComplete {
        generation: u64,
        outcome: Result<Value, ClassifierError>,
    },

    // Controls
    Reset,
    SetMode(Mode),
    DismissError,
}

pub struct Workflow {
    state: WorkflowState,
    mode: Mode,
    /// Bumped by every submit, selection and reset. A completion carrying an
    /// older value is stale.
    generation: u64,
    next_image_id: u64,
    pending_tasks: usize,
    live: Arc<dyn Classifier>,
    simulated: Arc<dyn Classifier>,
    link: mpsc::UnboundedSender<Msg>,
    inbox: mpsc::UnboundedReceiver<Msg>,
}

impl Workflow {
    pub fn new(live: Arc<dyn Classifier>, simulated: Arc<dyn Classifier>, mode: Mode) -> Self {
        let (link, inbox) = mpsc::unbounded_channel();
        Self {
            state: WorkflowState::Idle,
            mode,
            generation: 0,
            next_image_id: 0,
            pending_tasks: 0,
            live,
            simulated,
            link,
            inbox,
        }
    }

    /// Applies one message. Returns whether the state changed.
    pub fn update(&mut self, msg: Msg) -> bool {
        match msg {
            // Image operations
            Msg::SelectImage(file) => handlers::handle_select_image(self, file),
            Msg::PreviewReady { image_id, preview } => {
                handlers::handle_preview_ready(self, image_id, preview)
            }
            Msg::PreviewFailed { image_id } => handlers::handle_preview_failed(self, image_id),

            // Submission operations
            Msg::Submit => handlers::handle_submit(self),
            Msg::SubmissionComplete {
                generation,
                outcome,
            } => handlers::handle_submission_complete(self, generation, outcome),

            // Controls
            Msg::Reset => handlers::handle_reset(self),
            Msg::SetMode(mode) => handlers::handle_set_mode(self, mode),
            Msg::DismissError => handlers::handle_dismiss_error(self),
        }
    }

    /// Holds `file` as the current image. `None` is ignored.
    pub fn select_image(&mut self, file: Option<ImageFile>) -> bool {
        self.update(Msg::SelectImage(file))
    }

    /// Starts classifying the current image. Ignored unless an image is
    /// selected and no request is in flight.
    pub fn submit(&mut self) -> bool {
        self.update(Msg::Submit)
    }

    pub fn reset(&mut self) -> bool {
        self.update(Msg::Reset)
    }

    /// Chooses the classifier used by the next submission.
    pub fn toggle_mode(&mut self, mode: Mode) -> bool {
        self.update(Msg::SetMode(mode))
    }

    pub fn dismiss_error(&mut self) -> bool {
        self.update(Msg::DismissError)
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_work(&self) -> bool {
        self.pending_tasks > 0
    }

    /// Waits for the next message posted by a background task and applies it.
    ///
    /// Waits forever when nothing is pending; check [`Self::has_pending_work`]
    /// first or use [`Self::settle`].
    pub async fn process_next(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(msg) => self.update(msg),
            None => false,
        }
    }

    /// Applies posted messages until no background task is outstanding.
    pub async fn settle(&mut self) {
        while self.has_pending_work() {
            self.process_next().await;
        }
    }

    fn transition(&mut self, next: WorkflowState) {
        log::info!("Workflow {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn invalidate_in_flight(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn task_finished(&mut self) {
        self.pending_tasks = self.pending_tasks.saturating_sub(1);
    }

    fn spawn_preview(&mut self, image: &SelectedImage) {
        let link = self.link.clone();
        let image_id = image.id;
        let mime_type = image.mime_type().to_string();
        let bytes = Arc::clone(&image.file.bytes);
        self.pending_tasks += 1;

        tokio::spawn(async move {
            let msg = match tokio::task::spawn_blocking(move || render_preview(&mime_type, &bytes)).await {
                Ok(preview) => Msg::PreviewReady { image_id, preview },
                Err(e) => {
                    log::error!("Preview rendering for image {} failed: {}", image_id, e);
                    Msg::PreviewFailed { image_id }
                }
            };
            if link.send(msg).is_err() {
                log::debug!("Workflow dropped before preview {} was ready", image_id);
            }
        });
    }

    fn spawn_submission(&mut self, generation: u64, mode: Mode, upload: ImageUpload) {
        let classifier = match mode {
            Mode::Live => Arc::clone(&self.live),
            Mode::Simulated => Arc::clone(&self.simulated),
        };
        let link = self.link.clone();
        self.pending_tasks += 1;

        tokio::spawn(async move {
            let request = tokio::spawn(async move { classifier.classify(upload).await });
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Classifier task for request {} died: {}", generation, e);
                    Err(ClassifierError::TaskFailed(e.to_string()))
                }
            };
            if link
                .send(Msg::SubmissionComplete {
                    generation,
                    outcome,
                })
                .is_err()
            {
                log::debug!("Workflow dropped before submission {} completed", generation);
            }
        });
    }
}
