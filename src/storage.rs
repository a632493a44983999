use crate::model::PageSummary;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory for saved summaries: `<data-local-dir>/eo-pace`.
pub fn base_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("no data directory available")?;
    Ok(base.join("eo-pace"))
}

/// Write any serializable value as pretty JSON, creating parent directories.
pub fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let data = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn export_json(path: &Path, summary: &PageSummary) -> Result<()> {
    write_snapshot(path, summary)
}

fn summary_file_name(summary: &PageSummary) -> String {
    let stamp: String = summary
        .generated_at_utc
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("summary-day{}-{}.json", summary.final_days, stamp)
}

/// Save a summary under [`base_dir`] and return the written path.
pub fn save_summary(summary: &PageSummary) -> Result<PathBuf> {
    save_summary_in(&base_dir()?, summary)
}

pub fn save_summary_in(dir: &Path, summary: &PageSummary) -> Result<PathBuf> {
    let path = dir.join(summary_file_name(summary));
    write_snapshot(&path, summary)?;
    Ok(path)
}
