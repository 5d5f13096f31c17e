//! §6.3 / §9: one-shot legacy directory migration. "Legacy directory names
//! (from prior releases) are detected on open; if a directory under the old
//! name exists and the canonical one does not, it is moved. This migration
//! is one-shot." — never retried, and never runs if the canonical directory
//! already has data (§9: "if the new directory already contains data, no
//! migration occurs").

use std::path::Path;

use clipkeep_error::{Error, Result};

/// Returns whether a migration was performed.
pub fn migrate_if_needed(canonical: &Path, legacy: Option<&Path>) -> Result<bool> {
    let Some(legacy) = legacy else {
        return Ok(false);
    };
    if canonical.exists() || !legacy.exists() {
        return Ok(false);
    }
    if let Some(parent) = canonical.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
    }
    std::fs::rename(legacy, canonical).map_err(|e| Error::Storage(e.to_string()))?;
    tracing::info!(from = %legacy.display(), to = %canonical.display(), "migrated legacy clipkeep directory");
    Ok(true)
}
