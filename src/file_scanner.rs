use crate::error::PickError;
use ignore::WalkBuilder;
use regex::Regex;
use std::path::{Component, Path};
use tracing::{debug, warn};

/// Include/exclude/preselect pattern, matched against root-relative paths
/// written with `/` separators.
#[derive(Debug, Clone)]
pub enum MatchPattern {
    Glob(glob::Pattern),
    Regex(Regex),
}

impl MatchPattern {
    /// `re:` forces a regular expression and `glob:` forces a glob. Without a
    /// prefix, anything containing glob magic is a glob and the rest is a regex.
    pub fn parse(raw: &str) -> Result<Self, PickError> {
        let malformed = |reason: String| PickError::MalformedPattern {
            pattern: raw.to_string(),
            reason,
        };
        if let Some(expr) = raw.strip_prefix("re:") {
            return Regex::new(expr)
                .map(MatchPattern::Regex)
                .map_err(|e| malformed(e.to_string()));
        }
        if let Some(expr) = raw.strip_prefix("glob:") {
            return glob::Pattern::new(expr)
                .map(MatchPattern::Glob)
                .map_err(|e| malformed(e.to_string()));
        }
        if raw.contains(['*', '?', '[']) {
            glob::Pattern::new(raw)
                .map(MatchPattern::Glob)
                .map_err(|e| malformed(e.to_string()))
        } else {
            Regex::new(raw)
                .map(MatchPattern::Regex)
                .map_err(|e| malformed(e.to_string()))
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            MatchPattern::Glob(pattern) => pattern.matches_path(Path::new(path)),
            MatchPattern::Regex(regex) => regex.is_match(path),
        }
    }
}

pub fn compile_patterns(raw: &[String]) -> Result<Vec<MatchPattern>, PickError> {
    raw.iter().map(|p| MatchPattern::parse(p)).collect()
}

/// Finds files under `root` matching at least one `include` pattern and no
/// `exclude` pattern.
///
/// Returned paths are prefixed with `root`, use `/` separators and are sorted.
/// A missing root yields an empty list.
pub fn discover(
    root: &Path,
    include: &[MatchPattern],
    exclude: &[MatchPattern],
    include_ignored: bool,
) -> Vec<String> {
    if !root.is_dir() {
        warn!(root = %root.display(), "discovery root is not a directory");
        return Vec::new();
    }

    let mut walker = WalkBuilder::new(root);
    if include_ignored {
        walker.git_ignore(false).ignore(false);
    }

    let mut found = Vec::new();
    for result in walker.build() {
        let dirent = match result {
            Ok(v) => v,
            Err(e) => {
                warn!("skipping entry during scan: {}", e);
                continue;
            }
        };
        if !dirent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = dirent.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let relative = to_slash(relative);
        if include.iter().any(|p| p.matches(&relative))
            && !exclude.iter().any(|p| p.matches(&relative))
        {
            found.push(to_slash(path));
        }
    }

    found.sort();
    found.dedup();
    debug!(root = %root.display(), count = found.len(), "discovery finished");
    found
}

/// Renders a path with `/` separators, dropping `.` components.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::Prefix(p) => Some(p.as_os_str().to_string_lossy().into_owned()),
            Component::CurDir | Component::RootDir => None,
        })
        .collect();
    let joined = parts.join("/");
    if path.has_root() && !matches!(path.components().next(), Some(Component::Prefix(_))) {
        format!("/{joined}")
    } else {
        joined
    }
}
