//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, InitOutcome};
use crate::error::IndexCacheResult;
use crate::ui::{self, UiContext};

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> IndexCacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> IndexCacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> IndexCacheResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path().display().to_string();

    match manager.init(force).await? {
        InitOutcome::Written => ui::step_ok_detail(&ctx, "Configuration initialized", &path),
        InitOutcome::AlreadyExists => ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path),
            "Use --force to overwrite",
        ),
    }
    Ok(())
}
