//! Repository context construction
//!
//! Renders a [`RepoGraph`] into the bounded text block sent as the system message.
//! The line formats below are what the model sees; keep them stable so answers stay
//! reproducible across releases.

use talk2code_core::{ContextLimits, Link, Node, RepoGraph};

/// Renders repository graphs into prompt context
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextBuilder {
    limits: ContextLimits,
}

impl ContextBuilder {
    pub fn new(limits: ContextLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ContextLimits {
        self.limits
    }

    /// Build the context text. Only the first `max_nodes` nodes and `max_links` links
    /// are listed, in input order; the rest are summarized by an elision line.
    pub fn build(&self, graph: &RepoGraph) -> String {
        let mut out = String::new();

        out.push_str(&format!("Repository Name: {}\n", graph.display_name()));

        out.push_str(&format!("Total Nodes: {}\n", graph.node_count()));
        out.push_str("Nodes:\n");
        render_section(&mut out, &graph.nodes, self.limits.max_nodes, node_line);

        out.push('\n');

        out.push_str(&format!("Total Links: {}\n", graph.link_count()));
        out.push_str("Links:\n");
        render_section(&mut out, &graph.links, self.limits.max_links, link_line);

        out
    }
}

fn render_section<T>(out: &mut String, items: &[T], cap: usize, line: fn(&T) -> String) {
    for item in items.iter().take(cap) {
        out.push_str(&line(item));
        out.push('\n');
    }

    let omitted = items.len().saturating_sub(cap);
    if omitted > 0 {
        out.push_str(&format!("...and {} more\n", omitted));
    }
}

fn node_line(node: &Node) -> String {
    format!("- {} (Type: {})", node.name, node.kind)
}

fn link_line(link: &Link) -> String {
    format!("- {} connects to {}", link.source.name, link.target.name)
}

/// Build context with the default 20 node / 15 link limits
pub fn build_repository_context(graph: &RepoGraph) -> String {
    ContextBuilder::default().build(graph)
}
