use std::path::PathBuf;

use anyhow::Context;
use room_arranger::AppConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    log::info!(
        "Catalog: {}/{}@{} ({})",
        config.catalog.user,
        config.catalog.repo,
        config.catalog.branch,
        config.catalog.folder
    );

    room_arranger::run(config)
}
