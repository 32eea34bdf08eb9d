//! Core data type definitions
//!
//! The repository graph travels by value with every request. Nothing here is cached
//! or shared between requests.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Name used when a graph arrives without one
pub const UNKNOWN_REPOSITORY: &str = "Unknown Repository";

/// A single repository entity (file, class, function, module, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Node {
    #[cfg_attr(feature = "openapi", schema(example = "1"))]
    pub id: String,
    #[cfg_attr(feature = "openapi", schema(example = "index.js"))]
    pub name: String,
    /// Free-form classification tag
    #[serde(rename = "type")]
    #[cfg_attr(feature = "openapi", schema(example = "file"))]
    pub kind: String,
    pub index: i64,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        index: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            index,
        }
    }
}

/// Directed, weighted relationship between two embedded nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Link {
    pub source: Node,
    pub target: Node,
    #[cfg_attr(feature = "openapi", schema(example = 1.0))]
    pub value: f64,
    pub index: i64,
}

/// Node/link snapshot of a repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RepoGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(example = "Sample Repository"))]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl RepoGraph {
    pub fn new(name: impl Into<String>, nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self {
            name: Some(name.into()),
            nodes,
            links,
        }
    }

    /// Repository name, or the "Unknown Repository" sentinel when absent or blank
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNKNOWN_REPOSITORY,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

/// Inbound chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatRequest {
    #[cfg_attr(feature = "openapi", schema(example = "Which module fetches data?"))]
    pub query: String,
    pub repo_data: RepoGraph,
}

/// Outbound chat reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// JSON shape of an analyze-repo URL request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UrlRequest {
    #[cfg_attr(feature = "openapi", schema(example = "https://github.com/owner/myrepo"))]
    pub url: String,
}

/// Archive uploaded through a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Input accepted by repository analysis, decoded once at the HTTP boundary
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisInput {
    Url(UrlRequest),
    Archive(ArchiveUpload),
}

impl AnalysisInput {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisInput::Url(_) => "url",
            AnalysisInput::Archive(_) => "archive",
        }
    }
}
