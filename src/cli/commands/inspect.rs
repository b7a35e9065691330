//! Inspect command - show a cache file or a destination's state

use crate::cache::{self, CacheFile, CACHE_DIR};
use crate::cli::args::{InspectArgs, OutputFormat};
use crate::error::{IndexCacheError, IndexCacheResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use walkdir::WalkDir;

/// Execute the inspect command
pub async fn execute(args: InspectArgs) -> IndexCacheResult<()> {
    if args.path.is_dir() {
        show_destination(&args.path);
        return Ok(());
    }

    if !args.path.exists() {
        return Err(IndexCacheError::PathNotFound(args.path));
    }

    let bytes = tokio::fs::read(&args.path)
        .await
        .map_err(|e| IndexCacheError::io(format!("reading {}", args.path.display()), e))?;
    let file = cache::decode(&bytes)?;

    match args.format {
        OutputFormat::Table => print_table(&file),
        OutputFormat::Json => print_json(&file)?,
        OutputFormat::Plain => print_plain(&file),
    }
    Ok(())
}

fn show_destination(dest: &Path) {
    let ctx = UiContext::detect();
    let populated = cache::is_populated(dest);

    ui::section(&ctx, &format!("Index cache {}", dest.display()));
    ui::key_value_status(
        &ctx,
        "Populated",
        if populated { "yes" } else { "no" },
        populated,
    );

    if let Some(updated) = cache::last_updated(dest) {
        ui::key_value(
            &ctx,
            "Last updated",
            &updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
    }

    let cache_root = dest.join(CACHE_DIR);
    let files = WalkDir::new(&cache_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count();
    ui::key_value(&ctx, "Cache files", &files.to_string());
}

fn print_table(file: &CacheFile) {
    println!("Revision: {}", file.revision);
    println!();
    println!("{:<20} {}", "VERSION", "ENTRY");
    println!("{}", "-".repeat(80));

    for record in &file.records {
        println!("{:<20} {}", record.version, record.json);
    }

    println!();
    println!("Total: {} record(s)", file.records.len());
}

fn print_json(file: &CacheFile) -> IndexCacheResult<()> {
    #[derive(serde::Serialize)]
    struct RecordJson<'a> {
        version: &'a str,
        entry: serde_json::Value,
    }

    #[derive(serde::Serialize)]
    struct FileJson<'a> {
        revision: &'a str,
        records: Vec<RecordJson<'a>>,
    }

    let records = file
        .records
        .iter()
        .map(|r| {
            Ok(RecordJson {
                version: &r.version,
                entry: serde_json::from_str(&r.json)?,
            })
        })
        .collect::<IndexCacheResult<Vec<_>>>()?;

    let out = FileJson {
        revision: &file.revision,
        records,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_plain(file: &CacheFile) {
    for record in &file.records {
        println!("{}", record.version);
    }
}
