//! File-based export and import: `export`, `backup`, `import`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use solace_core::journal::ExportFile;

use crate::app::AppContext;

fn write_export(dir: &Path, file: &ExportFile) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Export one entry as markdown, to `out_dir` or stdout.
pub async fn run_export(ctx: &AppContext, id: i64, out_dir: Option<PathBuf>) -> Result<()> {
    let journal = ctx.journal();
    let entry = journal.get_entry(id).await?;
    let file = journal.export_entry(&entry);
    match out_dir {
        Some(dir) => {
            let path = write_export(&dir, &file)?;
            println!("Exported entry #{} to {}", id, path.display());
        }
        None => print!("{}", file.contents),
    }
    Ok(())
}

pub async fn run_backup(ctx: &AppContext, out_dir: &Path) -> Result<()> {
    let file = ctx.journal().export_all().await?;
    let path = write_export(out_dir, &file)?;
    println!("Backup written to {}", path.display());
    Ok(())
}

pub async fn run_import(ctx: &AppContext, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file: {}", path.display()))?;
    let report = ctx
        .journal()
        .import_entries(&text)
        .await
        .context("Failed to import")?;
    println!("Imported {} entries.", report.completed);
    if report.errors > 0 {
        println!("Skipped {} invalid entries.", report.errors);
    }
    Ok(())
}
