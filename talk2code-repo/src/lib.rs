//! Talk2Code Repository - repository analysis
//!
//! Produces the node/link graphs the front-end renders and the chat endpoint
//! consumes. The current analyzer returns sample graphs.

pub mod naming;
pub mod sample;

pub use naming::{archive_stem, repo_name_from_url, DEFAULT_REPOSITORY_NAME};
pub use sample::{archive_sample_graph, url_sample_graph, SampleAnalyzer};
pub use talk2code_core::RepositoryAnalyzer;
