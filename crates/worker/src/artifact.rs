//! The artifact-builder collaborator interface.
//!
//! Building the tabular/archive file (CSV, XLSX, ZIP…) and storing its
//! bytes belong to an external collaborator; this crate only defines
//! the seam the compute step invokes once per successful generation.

use async_trait::async_trait;

use guichet_core::Column;
use guichet_db::models::dossier::Dossier;

/// Reference to a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub file_path: String,
}

/// Errors an artifact builder can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Builds and persists one export artifact from the resolved dataset
/// and the column layout.
#[async_trait]
pub trait ArtifactBuilder: Send + Sync {
    async fn build(
        &self,
        dossiers: &[Dossier],
        columns: &[Column],
    ) -> Result<ArtifactRef, ArtifactError>;
}
