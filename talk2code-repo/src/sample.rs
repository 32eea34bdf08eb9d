//! Canned repository graphs
//!
//! Analysis does not inspect repository contents yet. The graphs returned here
//! depend only on which input branch was taken.

use crate::naming::{archive_stem, repo_name_from_url};
use async_trait::async_trait;
use talk2code_core::{
    log_operation_start, log_operation_success, validation_error, AnalysisInput, ArchiveUpload,
    Link, Node, RepoGraph, RepositoryAnalyzer, Talk2CodeResult, UrlRequest,
};
use tracing::debug;

/// `(id, name, type)` in index order
type NodeSpec = (&'static str, &'static str, &'static str);

const URL_SAMPLE_NODES: &[NodeSpec] = &[
    ("1", "index.js", "file"),
    ("2", "App", "class"),
    ("3", "renderComponent", "function"),
    ("4", "utils", "module"),
    ("5", "components", "module"),
    ("6", "styles.css", "file"),
    ("7", "api.js", "file"),
    ("8", "Button", "class"),
    ("9", "fetchData", "function"),
];

/// `(source index, target index)` pairs
const URL_SAMPLE_LINKS: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (0, 3),
    (3, 8),
    (1, 4),
    (4, 7),
    (1, 5),
    (6, 8),
];

const ARCHIVE_SAMPLE_NODES: &[NodeSpec] = &[
    ("1", "main.py", "file"),
    ("2", "Application", "class"),
    ("3", "handlers", "module"),
    ("4", "load_config", "function"),
];

const ARCHIVE_SAMPLE_LINKS: &[(usize, usize)] = &[(0, 1), (1, 2), (0, 3)];

fn build_graph(name: String, nodes: &[NodeSpec], links: &[(usize, usize)]) -> RepoGraph {
    let nodes: Vec<Node> = nodes
        .iter()
        .enumerate()
        .map(|(index, (id, name, kind))| Node::new(*id, *name, *kind, index as i64))
        .collect();

    let links = links
        .iter()
        .enumerate()
        .map(|(index, (source, target))| Link {
            source: nodes[*source].clone(),
            target: nodes[*target].clone(),
            value: 1.0,
            index: index as i64,
        })
        .collect();

    RepoGraph::new(name, nodes, links)
}

/// Sample graph for a repository URL, named `Sample of {repo}`
pub fn url_sample_graph(url: &str) -> RepoGraph {
    build_graph(
        format!("Sample of {}", repo_name_from_url(url)),
        URL_SAMPLE_NODES,
        URL_SAMPLE_LINKS,
    )
}

/// Sample graph for an uploaded archive, named `Uploaded {stem}`
pub fn archive_sample_graph(file_name: &str) -> RepoGraph {
    build_graph(
        format!("Uploaded {}", archive_stem(file_name)),
        ARCHIVE_SAMPLE_NODES,
        ARCHIVE_SAMPLE_LINKS,
    )
}

/// Analyzer returning canned graphs
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleAnalyzer;

impl SampleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn analyze_url(&self, request: &UrlRequest) -> Talk2CodeResult<RepoGraph> {
        if request.url.trim().is_empty() {
            return Err(validation_error!(
                "URL is required",
                "url",
                "sample_analyzer"
            ));
        }
        Ok(url_sample_graph(&request.url))
    }

    fn analyze_archive(&self, upload: &ArchiveUpload) -> RepoGraph {
        debug!(
            file_name = %upload.file_name,
            size_bytes = upload.bytes.len(),
            "Archive contents are not inspected"
        );
        archive_sample_graph(&upload.file_name)
    }
}

#[async_trait]
impl RepositoryAnalyzer for SampleAnalyzer {
    async fn analyze(&self, input: AnalysisInput) -> Talk2CodeResult<RepoGraph> {
        log_operation_start!("analyze_repository", input = input.kind());

        let graph = match &input {
            AnalysisInput::Url(request) => self.analyze_url(request)?,
            AnalysisInput::Archive(upload) => self.analyze_archive(upload),
        };

        log_operation_success!(
            "analyze_repository",
            repository = %graph.display_name(),
            nodes = graph.node_count(),
            links = graph.link_count()
        );
        Ok(graph)
    }

    fn name(&self) -> &str {
        "sample"
    }
}
