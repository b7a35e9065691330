//! Status command - check that the required tools are installed

use crate::config::Config;
use crate::error::IndexCacheResult;
use crate::ui::{self, UiContext};
use crate::vcs::GitBackend;

/// Execute the status command
pub async fn execute(config: &Config) -> IndexCacheResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Crate Index Cache Status");

    ui::section(&ctx, "Tools:");
    let git = &config.fetch.git;
    if GitBackend::is_installed(git).await {
        ui::step_ok(&ctx, &format!("{} installed", git));
    } else {
        ui::step_error_detail(&ctx, "git", "not found - install git");
    }

    if GitBackend::is_lfs_installed(git).await {
        ui::step_ok(&ctx, "git-lfs installed");
    } else {
        ui::step_warn_hint(
            &ctx,
            "git-lfs not found",
            "only needed for indexes with LFS content (lfs=1)",
        );
    }

    ui::section(&ctx, "Downloads:");
    let downloads = &config.fetch.downloads_dir;
    ui::key_value_status(
        &ctx,
        "Directory",
        &downloads.display().to_string(),
        downloads.is_dir(),
    );

    Ok(())
}

