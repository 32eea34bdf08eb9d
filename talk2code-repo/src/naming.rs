//! Display names derived from analysis inputs

use url::Url;

/// Used when no usable name can be extracted
pub const DEFAULT_REPOSITORY_NAME: &str = "Repository";

/// Repository name from a clone or browse URL: the last non-empty path segment
/// with a trailing `.git` removed.
///
/// Inputs that do not parse as URLs (`owner/repo`, scp-style `git@host:owner/repo.git`)
/// are split on `/` and `:` instead.
pub fn repo_name_from_url(url: &str) -> String {
    let last = match Url::parse(url.trim()) {
        Ok(parsed) if !parsed.cannot_be_a_base() => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        _ => url
            .trim()
            .split(['/', ':'])
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string),
    };

    last.map(|segment| segment.trim_end_matches(".git").to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_REPOSITORY_NAME.to_string())
}

/// Archive display stem: the file name without directories or a trailing `.zip`
pub fn archive_stem(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    let stem = base.strip_suffix(".zip").unwrap_or(base);
    if stem.is_empty() {
        DEFAULT_REPOSITORY_NAME.to_string()
    } else {
        stem.to_string()
    }
}
