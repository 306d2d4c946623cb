//! Discovery of attachment definition files

use anyhow::{Context, Result};
use std::path::Path;

/// Extensions accepted for attachment definitions
pub const DEFINITION_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Walk `root` for attachment definition files in file name order.
///
/// The handler gets each file and the name of the folder holding it, or
/// `None` for files directly under `root`. Unreadable folders are errors.
pub fn walk_definition_files<F>(root: &Path, mut handler: F) -> Result<()>
where
    F: FnMut(&Path, Option<&str>) -> Result<()>,
{
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk attachments folder {}", root.display()))?;
        if !entry.file_type().is_file() || !is_definition(entry.path()) {
            continue;
        }

        let slot_folder = entry
            .path()
            .parent()
            .filter(|parent| *parent != root)
            .and_then(|parent| parent.file_name())
            .and_then(|name| name.to_str());

        handler(entry.path(), slot_folder)?;
    }

    Ok(())
}

fn is_definition(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DEFINITION_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
}
