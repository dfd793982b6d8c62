//! Test file discovery
//!
//! Expands glob patterns into relative, forward-slash file ids.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::models::Category;

const EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

/// Default patterns for a category, one per test file extension
pub fn default_patterns(category: Category) -> Vec<String> {
    let root = match category {
        Category::E2e => "cypress/e2e",
        Category::Component => "src",
    };
    EXTENSIONS
        .iter()
        .map(|ext| format!("{root}/**/*.cy.{ext}"))
        .collect()
}

/// Find files matching `patterns` under `base`.
///
/// Results are sorted and de-duplicated. Invalid patterns are an error;
/// unreadable paths are skipped.
pub fn discover(patterns: &[String], base: &Path) -> Result<Vec<String>> {
    let mut found = BTreeSet::new();

    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            base.join(pattern).to_string_lossy().into_owned()
        };

        let paths =
            glob::glob(&full).with_context(|| format!("Invalid file pattern: {pattern}"))?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    found.insert(relative_id(&path, base));
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path: {e}"),
            }
        }
    }

    debug!("Discovered {} files from {} patterns", found.len(), patterns.len());
    Ok(found.into_iter().collect())
}

/// Id of `path` relative to `base`, with forward slashes
pub fn relative_id(path: impl AsRef<Path>, base: &Path) -> String {
    let path = path.as_ref();
    let relative = path.strip_prefix(base).unwrap_or(path);
    let id = relative.to_string_lossy().replace('\\', "/");

    let mut id = id.as_str();
    while let Some(stripped) = id.strip_prefix("./") {
        id = stripped;
    }
    id.to_string()
}
