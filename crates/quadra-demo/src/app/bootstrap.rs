use quadra::{Engine, EngineError};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::{config, gameplay};

pub(crate) fn build_app() -> Result<Engine, EngineError> {
    init_tracing();
    info!("=== Quadra Demo Startup ===");

    let config = config::resolve_config();
    info!(
        title = %config.window_title,
        width = config.window_width,
        height = config.window_height,
        target_fps = config.target_fps,
        assets_dir = %config.assets_dir.display(),
        "startup"
    );

    let mut engine = Engine::new(config.engine_config())?;
    gameplay::populate(&mut engine, &config);
    Ok(engine)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
