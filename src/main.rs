// =============================================================================
// VULKAN 3D RENDERER - Context check
// =============================================================================
//
// Boots the Vulkan backend the same way the emulator does and walks it
// through one lifecycle:
//
// 1. Load config.toml and set up logging
// 2. Load the Vulkan library (once per process)
// 3. Create the context: instance, GPU selection, device, queue
// 4. init -> set_render_settings -> render_frame -> get_line -> deinit
//
// Exits with an error when no usable GPU is found.
//
// =============================================================================

use anyhow::{Context, Result};
use gpu3d_vulkan::backend::loader;
use gpu3d_vulkan::config::Config;
use gpu3d_vulkan::renderer::{Renderer3D, VulkanRenderer, SCREEN_HEIGHT};
use log::LevelFilter;
use std::fs::OpenOptions;

fn main() -> Result<()> {
    // Load configuration from config.toml; its outcome is logged once the
    // logger is up
    let (config, source) = Config::load_with_source(Config::DEFAULT_PATH);

    init_logging(&config)?;
    log::info!("Starting Vulkan renderer check");
    source.log();
    if config.log_level().is_none() {
        log::warn!(
            "Unknown log level '{}', defaulting to info",
            config.debug.log_level
        );
    }

    loader::init().context("Vulkan is not available on this system")?;

    let mut renderer = VulkanRenderer::new(config.context_config())
        .context("Failed to create Vulkan context")?;
    renderer.init().context("Renderer init failed")?;
    renderer.set_render_settings(&config.render_settings());

    renderer.render_frame();
    let blank = (0..SCREEN_HEIGHT).all(|y| renderer.get_line(y).iter().all(|&px| px == 0));
    log::info!(
        "Rendered {} frame(s), output {}",
        renderer.frames_rendered(),
        if blank { "blank" } else { "non-blank" }
    );

    renderer.deinit();
    Ok(())
}

/// Initialize logging, optionally writing to the configured log file
fn init_logging(config: &Config) -> Result<()> {
    use env_logger::{Builder, Target};

    let mut builder = Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(config.log_level().unwrap_or(LevelFilter::Info));
    }

    if config.debug.log_to_file {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.debug.log_file)
            .with_context(|| format!("Failed to open log file {:?}", config.debug.log_file))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
