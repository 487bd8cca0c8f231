pub mod api;
pub mod config;
pub mod error;
pub mod image;
pub mod summary;
pub mod workflow;

pub use crate::api::{Classifier, HttpClassifier, SimulatedClassifier};
pub use crate::config::ClientConfig;
pub use crate::error::{ClassifierError, ErrorInfo, ErrorKind};
pub use crate::image::{ImageFile, SelectedImage};
pub use crate::workflow::{Mode, Workflow, WorkflowState};
