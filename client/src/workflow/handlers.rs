use serde_json::Value;

use super::{Mode, Workflow, WorkflowState};
use crate::error::{ClassifierError, ErrorInfo};
use crate::image::{ImageFile, SelectedImage};

pub fn handle_select_image(workflow: &mut Workflow, file: Option<ImageFile>) -> bool {
    let Some(file) = file else {
        log::debug!("No file selected, keeping {} state", workflow.state.name());
        return false;
    };

    workflow.invalidate_in_flight();
    workflow.next_image_id += 1;
    let image = SelectedImage::new(workflow.next_image_id, file);
    log::info!(
        "Selected {} ({} bytes, {})",
        image.name(),
        image.size(),
        image.mime_type()
    );

    workflow.spawn_preview(&image);
    workflow.transition(WorkflowState::ImageSelected { image });
    true
}

pub fn handle_preview_ready(workflow: &mut Workflow, image_id: u64, preview: String) -> bool {
    workflow.task_finished();

    match workflow.state.image_mut() {
        Some(image) if image.id == image_id => {
            image.preview = Some(preview);
            true
        }
        _ => {
            log::debug!("Discarding preview for replaced image {}", image_id);
            false
        }
    }
}

pub fn handle_preview_failed(workflow: &mut Workflow, image_id: u64) -> bool {
    workflow.task_finished();
    log::warn!("No preview for image {}", image_id);
    false
}

pub fn handle_submit(workflow: &mut Workflow) -> bool {
    let image = match &workflow.state {
        WorkflowState::ImageSelected { image } | WorkflowState::Failed { image, .. } => image.clone(),
        WorkflowState::Submitting { generation, .. } => {
            log::warn!("Submission {} still in flight, ignoring submit", generation);
            return false;
        }
        other => {
            log::warn!("Cannot submit from {} state", other.name());
            return false;
        }
    };

    let generation = workflow.invalidate_in_flight();
    let mode = workflow.mode;
    log::info!("Submitting {} as request {} ({} mode)", image.name(), generation, mode);

    workflow.spawn_submission(generation, mode, image.upload());
    workflow.transition(WorkflowState::Submitting {
        image,
        generation,
        mode,
    });
    true
}

pub fn handle_submission_complete(
    workflow: &mut Workflow,
    generation: u64,
    outcome: Result<Value, ClassifierError>,
) -> bool {
    workflow.task_finished();

    let image = match &workflow.state {
        WorkflowState::Submitting {
            image,
            generation: current,
            ..
        } if *current == generation => image.clone(),
        _ => {
            log::debug!(
                "Discarding stale response for request {} (current {})",
                generation,
                workflow.generation
            );
            return false;
        }
    };

    let next = match outcome {
        Ok(raw) => {
            let prediction = shared::process(&raw);
            log::info!(
                "Prediction for {}: {} ({}%, {} confidence)",
                image.name(),
                prediction.record.display_name,
                prediction.confidence_percent,
                prediction.confidence_tier
            );
            WorkflowState::Succeeded {
                image,
                prediction: Box::new(prediction),
            }
        }
        Err(err) => {
            log::error!("Prediction request {} failed: {}", generation, err);
            WorkflowState::Failed {
                image,
                error: ErrorInfo::from(&err),
            }
        }
    };

    workflow.transition(next);
    true
}

pub fn handle_reset(workflow: &mut Workflow) -> bool {
    workflow.invalidate_in_flight();
    workflow.transition(WorkflowState::Idle);
    true
}

pub fn handle_set_mode(workflow: &mut Workflow, mode: Mode) -> bool {
    if workflow.mode == mode {
        return false;
    }
    log::info!("Switching from {} to {} mode", workflow.mode, mode);
    workflow.mode = mode;
    true
}

pub fn handle_dismiss_error(workflow: &mut Workflow) -> bool {
    let image = match &workflow.state {
        WorkflowState::Failed { image, .. } => image.clone(),
        _ => return false,
    };
    workflow.transition(WorkflowState::ImageSelected { image });
    true
}
