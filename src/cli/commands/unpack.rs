//! Unpack command - build an index cache from a crateindex:// source

use crate::cli::args::UnpackArgs;
use crate::config::Config;
use crate::error::IndexCacheResult;
use crate::pipeline::{IndexCachePipeline, UnpackRequest};
use crate::snapshot::LfsOutcome;
use crate::source::{Revision, SourceLocation, SourceUrl};
use crate::ui::{self, TaskSpinner, UiContext};
use crate::vcs::GitBackend;
use tracing::debug;

/// Execute the unpack command
pub async fn execute(args: UnpackArgs, config: &Config) -> IndexCacheResult<()> {
    let ctx = UiContext::detect();

    let source = SourceUrl::parse(&args.url)?;
    let revision = args.rev.as_deref().map(Revision::parse).transpose()?;
    let downloads = args
        .downloads
        .unwrap_or_else(|| config.fetch.downloads_dir.clone());
    let location = SourceLocation::new(downloads, &source);
    debug!("Source {} uses mirror {}", source, location.clonedir().display());

    let backend =
        GitBackend::new(config.fetch.git.clone(), location.clonedir()).with_lfs(source.options.lfs);

    let request = UnpackRequest {
        source,
        location,
        unpack_root: args.dest,
        revision,
        scratch_root: args.scratch.or_else(|| config.fetch.scratch_dir.clone()),
    };

    ui::intro(&ctx, "Crate Index Cache");
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Unpacking {}", request.source.repo_url()));

    let report = match IndexCachePipeline::new(&backend).run(&request).await {
        Ok(report) => report,
        Err(e) => {
            spinner.stop_error("Unpack failed");
            return Err(e);
        }
    };
    spinner.stop(&format!("Snapshot acquired from {}", report.strategy));

    ui::key_value(&ctx, "Destination", &report.destination.display().to_string());
    ui::key_value(&ctx, "Revision", report.revision.as_str());
    ui::key_value(&ctx, "Cache files", &report.stats.files.to_string());
    ui::key_value(&ctx, "Records", &report.stats.records.to_string());
    ui::key_value_status(
        &ctx,
        "Malformed lines",
        &report.stats.malformed.to_string(),
        report.stats.malformed == 0,
    );

    if report.lfs == LfsOutcome::Skipped {
        ui::step_warn_hint(
            &ctx,
            "Repository has LFS content that was not fetched",
            "Set lfs=1 to require it",
        );
    }

    ui::outro_success(&ctx, "Index cache ready");
    Ok(())
}
