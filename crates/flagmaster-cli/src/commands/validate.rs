//! The `flagmaster validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use flagmaster_core::dataset::validate_dataset;

use super::load_dataset;

pub fn execute(dataset_path: Option<PathBuf>) -> Result<()> {
    let set = load_dataset(dataset_path.as_deref())?;
    let source = dataset_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());

    println!("Dataset: {source} ({} countries)", set.len());
    for (tier, count) in set.tier_counts() {
        println!("  tier {tier:>2}: {count} countries");
    }

    let warnings = validate_dataset(&set).context("dataset cannot be played")?;
    for w in &warnings {
        let prefix = w
            .country
            .as_ref()
            .map(|name| format!("  [{name}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Dataset valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
