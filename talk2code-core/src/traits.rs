//! Core trait definitions

use crate::error::Talk2CodeResult;
use crate::types::{AnalysisInput, RepoGraph};
use async_trait::async_trait;

/// Turns a repository reference or upload into a node/link graph
#[async_trait]
pub trait RepositoryAnalyzer: Send + Sync {
    async fn analyze(&self, input: AnalysisInput) -> Talk2CodeResult<RepoGraph>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}
