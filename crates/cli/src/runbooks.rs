use anyhow::{Context as AnyhowContext, Result};
use std::path::PathBuf;

pub const DEFAULT_RUNBOOK_PATTERN: &str = "manifests/documentation/runbooks/*.md";

const SECTION_DELIMITER: &str = "\n## ";

/// Every non-empty `## ` section of every file matching `pattern`, in path order.
pub fn collect_sections(pattern: &str) -> Result<Vec<String>> {
    let mut paths = glob::glob(pattern)
        .with_context(|| format!("Invalid runbook pattern '{pattern}'"))?
        .collect::<std::result::Result<Vec<PathBuf>, _>>()
        .context("Failed to read runbook directory")?;
    paths.sort();

    let mut sections = Vec::new();
    for path in &paths {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let before = sections.len();
        sections.extend(split_sections(&content));
        log::debug!("{}: {} sections", path.display(), sections.len() - before);
    }

    log::info!(
        "Found {} document sections in {} files",
        sections.len(),
        paths.len()
    );
    Ok(sections)
}

#[must_use]
pub fn split_sections(content: &str) -> Vec<String> {
    content
        .split(SECTION_DELIMITER)
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .map(ToString::to_string)
        .collect()
}
