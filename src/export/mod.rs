//! Model export and loading
//!
//! One JSON artifact carries everything serving needs: the versioned
//! feature schema, the fitted feature pipeline, the classifier and its
//! evaluation metrics.

mod artifact;

pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
